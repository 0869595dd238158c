// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the modification/event pipeline.

use layercfg::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn empty_config() -> Configuration {
    let dir = tempfile::tempdir().unwrap();
    Configuration::builder().base_dir(dir.path()).load().unwrap()
}

#[test]
fn test_two_batches_fire_two_events_with_single_key() {
    let config = empty_config();
    let seen: Arc<Mutex<Vec<BTreeSet<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    config.on_change(move |event| {
        seen_clone.lock().unwrap().push(event.modified_keys().clone());
    });

    config.set_property("k", "v1");
    config.set_property("k", "v2");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], ["k".to_string()].into());
    assert_eq!(seen[1], ["k".to_string()].into());
}

#[test]
fn test_no_op_put_fires_no_event() {
    let config = empty_config();
    config.set_property("k", "same");
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    config.on_change(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    config.set_property("k", "same");
    assert_eq!(count.load(Ordering::SeqCst), 0);

    config.set_property("k", "different");
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_remove_of_absent_key_fires_no_event() {
    let config = empty_config();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    config.on_change(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    config.clear_property("never.set");
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_batch_dedups_and_diffs_at_put_time() {
    let config = empty_config();
    config.set_property("a", "1");
    let changed = config
        .event_builder("mixed")
        .put("a", "2")
        .put("a", "1") // back to the current value: net no-op for this key
        .put("b", "9")
        .publish();
    assert_eq!(changed, ["b".to_string()].into());
    assert_eq!(config.get("a").unwrap().as_str(), "1");
    assert_eq!(config.get("b").unwrap().as_str(), "9");
}

#[test]
fn test_event_carries_name_and_configuration_view() {
    let config = empty_config();
    let observed = Arc::new(Mutex::new(Vec::new()));
    let observed_clone = Arc::clone(&observed);
    config.on_change(move |event| {
        let value = event
            .configuration()
            .get_optional("pipeline.key")
            .map(|v| v.as_string());
        observed_clone
            .lock()
            .unwrap()
            .push((event.name().to_string(), value));
    });

    config.event_builder("tuning").put("pipeline.key", "new").publish();

    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].0, "tuning");
    // the listener reads post-batch state through the event's view
    assert_eq!(observed[0].1.as_deref(), Some("new"));
}

#[test]
fn test_filtered_listener_fires_only_on_interest_keys() {
    let config = empty_config();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    config.on_change_filtered(
        move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        },
        ["watched.key"],
    );

    config.set_property("other.key", "x");
    assert_eq!(count.load(Ordering::SeqCst), 0);

    config.set_property("watched.key", "y");
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_single_key_callback_receives_new_value_and_removal() {
    let config = empty_config();
    let values: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let values_clone = Arc::clone(&values);
    config.on_change_key("tracked", move |value| {
        values_clone.lock().unwrap().push(value.map(str::to_string));
    });

    config.set_property("tracked", "a");
    config.set_property("untracked", "x");
    config.clear_property("tracked");

    let values = values.lock().unwrap();
    assert_eq!(*values, vec![Some("a".to_string()), None]);
}

#[test]
fn test_typed_callbacks_parse_before_invoking() {
    let config = empty_config();
    let ints = Arc::new(Mutex::new(Vec::new()));
    let ints_clone = Arc::clone(&ints);
    config.on_change_int("pool.size", move |n| {
        ints_clone.lock().unwrap().push(n);
    });
    let bools = Arc::new(Mutex::new(Vec::new()));
    let bools_clone = Arc::clone(&bools);
    config.on_change_bool("feature.on", move |b| {
        bools_clone.lock().unwrap().push(b);
    });

    config.set_property("pool.size", "8");
    config.set_property("pool.size", "not-a-number"); // logged, skipped
    config.set_property("pool.size", "9");
    config.set_property("feature.on", "true");
    config.set_property("feature.on", "nope");

    assert_eq!(*ints.lock().unwrap(), vec![8, 9]);
    assert_eq!(*bools.lock().unwrap(), vec![true, false]);
}

#[test]
fn test_panicking_listener_does_not_block_others() {
    let config = empty_config();
    let count = Arc::new(AtomicUsize::new(0));
    config.on_change(|_| {
        panic!("listener failure");
    });
    let count_clone = Arc::clone(&count);
    config.on_change(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    config.set_property("k", "v");
    // the second listener still ran, and the store was mutated
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(config.get("k").unwrap().as_str(), "v");
}

#[test]
fn test_concurrent_disjoint_batches_lose_nothing() {
    let config = empty_config();
    let events = Arc::new(AtomicUsize::new(0));
    let events_clone = Arc::clone(&events);
    config.on_change(move |event| {
        // each event carries exactly one batch's keys, never a mix
        let keys = event.modified_keys();
        let all_a = keys.iter().all(|k| k.starts_with("a."));
        let all_b = keys.iter().all(|k| k.starts_with("b."));
        assert!(all_a || all_b);
        events_clone.fetch_add(1, Ordering::SeqCst);
    });

    let config_a = config.clone();
    let config_b = config.clone();
    let t_a = std::thread::spawn(move || {
        let mut builder = config_a.event_builder("batch-a");
        for i in 0..50 {
            builder = builder.put(format!("a.{i}"), i.to_string());
        }
        builder.publish();
    });
    let t_b = std::thread::spawn(move || {
        let mut builder = config_b.event_builder("batch-b");
        for i in 0..50 {
            builder = builder.put(format!("b.{i}"), i.to_string());
        }
        builder.publish();
    });
    t_a.join().unwrap();
    t_b.join().unwrap();

    assert_eq!(events.load(Ordering::SeqCst), 2);
    for i in 0..50 {
        assert_eq!(config.get(&format!("a.{i}")).unwrap().as_str(), i.to_string());
        assert_eq!(config.get(&format!("b.{i}")).unwrap().as_str(), i.to_string());
    }
}

#[test]
fn test_empty_batch_publish_is_silent() {
    let config = empty_config();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    config.on_change(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    let changed = config.event_builder("empty").publish();
    assert!(changed.is_empty());
    assert_eq!(count.load(Ordering::SeqCst), 0);
}
