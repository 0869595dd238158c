// SPDX-License-Identifier: MIT OR Apache-2.0

//! The entry store: the single source of truth for configuration state.
//!
//! The store maps configuration keys to [`Entry`] records. It is a plain
//! ordered map; the owning [`Configuration`](crate::service::Configuration)
//! wraps it in a `RwLock` for concurrent reads and serialized writes.

use crate::domain::config_key::ConfigKey;
use crate::domain::entry::{Entry, SOURCE_DEFAULT_VALUE, SOURCE_ENV, SOURCE_SYSTEM_PROPERTY};
use crate::domain::system_props;
use std::collections::{BTreeMap, BTreeSet};
use std::env;

/// One pending change inside a modification batch.
///
/// A `value` of `None` is the removal marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    /// The new value, or `None` to remove the key.
    pub value: Option<String>,
    /// Provenance tag to record on the mutated entry.
    pub source: String,
}

/// Mapping from configuration key to entry record.
///
/// Keys are unique and kept in lexical order so that
/// [`as_flat_map`](EntryStore::as_flat_map) yields a deterministic view.
///
/// # Examples
///
/// ```
/// use layercfg::domain::store::EntryStore;
/// use layercfg::domain::entry::Entry;
///
/// let mut store = EntryStore::new();
/// store.put("app.name", Entry::new("shop", "file:application.yaml"));
/// assert_eq!(store.get("app.name").unwrap().value(), Some("shop"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct EntryStore {
    entries: BTreeMap<String, Entry>,
}

impl EntryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        EntryStore {
            entries: BTreeMap::new(),
        }
    }

    /// Plain lookup with no side effects.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Inserts or replaces an entry, returning the previous one if any.
    pub fn put(&mut self, key: impl Into<String>, entry: Entry) -> Option<Entry> {
        self.entries.insert(key.into(), entry)
    }

    /// Number of entries, including null sentinels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up `key`, memoizing a synthesized entry when it is absent.
    ///
    /// On a miss the runtime overrides are consulted first: the
    /// system-property table, then the environment under the exact key, then
    /// the environment under the canonical transform (uppercase, dots to
    /// underscores, hyphens removed). If none hit, the supplied default is
    /// memoized with source `DefaultValue`; with no default the null sentinel
    /// is memoized so the miss itself is remembered.
    ///
    /// A present-but-null entry is upgraded in place when a default is
    /// supplied. Once a real value is memoized it sticks: a later call with a
    /// *different* default still returns the first one. This first-default-wins
    /// behavior is a documented contract, not an accident.
    pub fn get_or_default(&mut self, key: &str, default: Option<&str>) -> Entry {
        if let Some(existing) = self.entries.get(key) {
            if !existing.is_null() {
                return existing.clone();
            }
            if let Some(d) = default {
                let upgraded = Entry::new(d, SOURCE_DEFAULT_VALUE);
                self.entries.insert(key.to_string(), upgraded.clone());
                return upgraded;
            }
            return existing.clone();
        }
        let entry = match runtime_override(key) {
            Some((value, source)) => Entry::new(value, source),
            None => match default {
                Some(d) => Entry::new(d, SOURCE_DEFAULT_VALUE),
                None => Entry::null_sentinel(),
            },
        };
        self.entries.insert(key.to_string(), entry.clone());
        entry
    }

    /// Applies a modification batch, returning the keys whose effective value
    /// actually changed.
    ///
    /// Each change is compared against the current entry: a put equal to the
    /// current value and a removal of an absent (or already null) key are
    /// skipped and excluded from the returned set. Removal replaces a live
    /// entry with the null sentinel so the key stays memoized.
    pub fn apply_batch(&mut self, batch: &BTreeMap<String, Change>) -> BTreeSet<String> {
        let mut changed = BTreeSet::new();
        for (key, change) in batch {
            let current = self.entries.get(key).and_then(|e| e.value());
            if current == change.value.as_deref() {
                continue;
            }
            match &change.value {
                Some(value) => {
                    self.entries
                        .insert(key.clone(), Entry::new(value.clone(), change.source.clone()));
                }
                // the diff above already skipped removals of absent/null keys
                None => {
                    self.entries
                        .insert(key.clone(), Entry::of(None, change.source.clone()));
                }
            }
            changed.insert(key.clone());
        }
        changed
    }

    /// Returns the live key/value pairs in key order, excluding null
    /// sentinels.
    pub fn as_flat_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .filter_map(|(k, e)| e.value().map(|v| (k.clone(), v.to_string())))
            .collect()
    }

    /// Builds a snapshot sub-store for a dotted prefix.
    ///
    /// A key exactly equal to `prefix` is remapped to the empty key, so a node
    /// can carry both a scalar value and children. Keys starting with
    /// `prefix + "."` have that segment stripped. The result is a copy, not a
    /// live view: later mutations of this store are not reflected in it.
    pub fn for_prefix(&self, prefix: &str) -> EntryStore {
        let child_prefix = format!("{prefix}.");
        let mut sub = EntryStore::new();
        for (key, entry) in &self.entries {
            if key == prefix {
                sub.entries.insert(String::new(), entry.clone());
            } else if let Some(stripped) = key.strip_prefix(&child_prefix) {
                sub.entries.insert(stripped.to_string(), entry.clone());
            }
        }
        sub
    }
}

/// Runtime override lookup: system property, then environment.
///
/// The environment is checked under the exact key first, then under the
/// canonical environment name when that differs.
pub fn runtime_override(key: &str) -> Option<(String, &'static str)> {
    if let Some(value) = system_props::get(key) {
        return Some((value, SOURCE_SYSTEM_PROPERTY));
    }
    if let Ok(value) = env::var(key) {
        return Some((value, SOURCE_ENV));
    }
    let canonical = ConfigKey::from(key).as_env_key();
    if canonical != key {
        if let Ok(value) = env::var(&canonical) {
            return Some((value, SOURCE_ENV));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(value: &str, source: &str) -> Change {
        Change {
            value: Some(value.to_string()),
            source: source.to_string(),
        }
    }

    fn removal(source: &str) -> Change {
        Change {
            value: None,
            source: source.to_string(),
        }
    }

    #[test]
    fn test_get_absent() {
        let store = EntryStore::new();
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_put_and_get() {
        let mut store = EntryStore::new();
        store.put("k", Entry::new("v", "x"));
        assert_eq!(store.get("k").unwrap().value(), Some("v"));
    }

    #[test]
    fn test_get_or_default_memoizes_default() {
        let mut store = EntryStore::new();
        let entry = store.get_or_default("store.test.z", Some("A"));
        assert_eq!(entry.value(), Some("A"));
        assert_eq!(entry.source(), SOURCE_DEFAULT_VALUE);
        // first default wins, even with a different later default
        let entry = store.get_or_default("store.test.z", Some("B"));
        assert_eq!(entry.value(), Some("A"));
    }

    #[test]
    fn test_get_or_default_memoizes_miss_as_sentinel() {
        let mut store = EntryStore::new();
        let entry = store.get_or_default("store.test.miss", None);
        assert!(entry.is_null());
        assert!(store.get("store.test.miss").unwrap().is_null());
    }

    #[test]
    fn test_get_or_default_upgrades_null_sentinel() {
        let mut store = EntryStore::new();
        store.get_or_default("store.test.up", None);
        let entry = store.get_or_default("store.test.up", Some("now"));
        assert_eq!(entry.value(), Some("now"));
        assert_eq!(entry.source(), SOURCE_DEFAULT_VALUE);
    }

    #[test]
    fn test_get_or_default_prefers_system_property() {
        system_props::set("store.test.sys", "from-sys");
        let mut store = EntryStore::new();
        let entry = store.get_or_default("store.test.sys", Some("default"));
        assert_eq!(entry.value(), Some("from-sys"));
        assert_eq!(entry.source(), SOURCE_SYSTEM_PROPERTY);
        system_props::remove("store.test.sys");
        // memoized: removing the override does not change the stored entry
        let entry = store.get_or_default("store.test.sys", Some("default"));
        assert_eq!(entry.value(), Some("from-sys"));
    }

    #[test]
    fn test_get_or_default_finds_canonical_env() {
        // canonical transform: uppercase, dots to underscores, hyphens removed
        std::env::set_var("STORE_TESTCANON", "from-env");
        let mut store = EntryStore::new();
        let entry = store.get_or_default("store.test-canon", Some("default"));
        assert_eq!(entry.value(), Some("from-env"));
        assert_eq!(entry.source(), SOURCE_ENV);
        std::env::remove_var("STORE_TESTCANON");
    }

    #[test]
    fn test_apply_batch_returns_changed_keys() {
        let mut store = EntryStore::new();
        store.put("a", Entry::new("1", "x"));
        let mut batch = BTreeMap::new();
        batch.insert("a".to_string(), change("2", "event:t"));
        batch.insert("b".to_string(), change("3", "event:t"));
        let changed = store.apply_batch(&batch);
        assert_eq!(changed, ["a".to_string(), "b".to_string()].into());
        assert_eq!(store.get("a").unwrap().value(), Some("2"));
        assert_eq!(store.get("b").unwrap().value(), Some("3"));
    }

    #[test]
    fn test_apply_batch_skips_no_op_put() {
        let mut store = EntryStore::new();
        store.put("a", Entry::new("same", "x"));
        let mut batch = BTreeMap::new();
        batch.insert("a".to_string(), change("same", "event:t"));
        assert!(store.apply_batch(&batch).is_empty());
        // untouched entry keeps its original source tag
        assert_eq!(store.get("a").unwrap().source(), "x");
    }

    #[test]
    fn test_apply_batch_skips_removal_of_absent_key() {
        let mut store = EntryStore::new();
        let mut batch = BTreeMap::new();
        batch.insert("ghost".to_string(), removal("event:t"));
        assert!(store.apply_batch(&batch).is_empty());
    }

    #[test]
    fn test_apply_batch_removal_leaves_sentinel() {
        let mut store = EntryStore::new();
        store.put("a", Entry::new("1", "x"));
        let mut batch = BTreeMap::new();
        batch.insert("a".to_string(), removal("event:t"));
        let changed = store.apply_batch(&batch);
        assert_eq!(changed, ["a".to_string()].into());
        assert!(store.get("a").unwrap().is_null());
    }

    #[test]
    fn test_apply_batch_null_to_value_is_a_change() {
        let mut store = EntryStore::new();
        store.get_or_default("a", None);
        let mut batch = BTreeMap::new();
        batch.insert("a".to_string(), change("now", "event:t"));
        let changed = store.apply_batch(&batch);
        assert_eq!(changed, ["a".to_string()].into());
    }

    #[test]
    fn test_as_flat_map_excludes_sentinels() {
        let mut store = EntryStore::new();
        store.put("real", Entry::new("v", "x"));
        store.get_or_default("ghost", None);
        let flat = store.as_flat_map();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get("real"), Some(&"v".to_string()));
    }

    #[test]
    fn test_for_prefix_strips_and_remaps() {
        let mut store = EntryStore::new();
        store.put("foo", Entry::new("spud", "x"));
        store.put("foo.bar", Entry::new("42", "x"));
        store.put("other", Entry::new("n", "x"));
        let sub = store.for_prefix("foo");
        assert_eq!(sub.get("").unwrap().value(), Some("spud"));
        assert_eq!(sub.get("bar").unwrap().value(), Some("42"));
        assert!(sub.get("other").is_none());
        assert_eq!(sub.len(), 2);
    }

    #[test]
    fn test_for_prefix_is_snapshot() {
        let mut store = EntryStore::new();
        store.put("foo.bar", Entry::new("old", "x"));
        let sub = store.for_prefix("foo");
        store.put("foo.bar", Entry::new("new", "x"));
        assert_eq!(sub.get("bar").unwrap().value(), Some("old"));
    }

    #[test]
    fn test_for_prefix_does_not_match_partial_segment() {
        let mut store = EntryStore::new();
        store.put("foobar.x", Entry::new("1", "x"));
        let sub = store.for_prefix("foo");
        assert!(sub.is_empty());
    }
}
