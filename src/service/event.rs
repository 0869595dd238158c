// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modification batches and change events.
//!
//! All mutation of a live configuration flows through this pipeline: a caller
//! builds a batch of puts/removes against a snapshot of the entry store,
//! publishes it, and listeners are notified once per batch with the set of
//! keys whose effective value actually changed. Batches with no net change
//! are silently discarded.

use crate::domain::store::Change;
use crate::service::Configuration;
use std::collections::{BTreeMap, BTreeSet};

/// An immutable change notification delivered to listeners.
///
/// The event exists only for the duration of dispatch; it carries the batch
/// name, the set of keys that actually changed, and a reference to the
/// configuration view so listeners can read the new state.
pub struct ChangeEvent<'a> {
    name: &'a str,
    modified_keys: &'a BTreeSet<String>,
    config: &'a Configuration,
}

impl<'a> ChangeEvent<'a> {
    pub(crate) fn new(
        name: &'a str,
        modified_keys: &'a BTreeSet<String>,
        config: &'a Configuration,
    ) -> Self {
        ChangeEvent {
            name,
            modified_keys,
            config,
        }
    }

    /// The name the batch was published under, e.g. `"reload"`.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The keys whose effective value changed in this batch.
    pub fn modified_keys(&self) -> &BTreeSet<String> {
        self.modified_keys
    }

    /// The configuration the batch was applied to.
    pub fn configuration(&self) -> &Configuration {
        self.config
    }
}

/// Registered listener, dispatched uniformly from the event pipeline.
pub(crate) enum Listener {
    /// Bulk listener, optionally filtered to an interest key set.
    Bulk {
        keys: Vec<String>,
        callback: Box<dyn Fn(&ChangeEvent<'_>) + Send + Sync>,
    },
    /// Legacy single-key callback receiving the new value.
    SingleKey {
        key: String,
        callback: Box<dyn Fn(Option<&str>) + Send + Sync>,
    },
}

/// Builder for one atomic modification batch.
///
/// Puts and removes are diffed against the entry store at call time: a put of
/// a value equal to the current value, or a remove of an absent key, never
/// enters the change set. Publishing an empty batch is a no-op that fires no
/// event.
///
/// # Examples
///
/// ```rust,no_run
/// use layercfg::prelude::*;
///
/// # fn main() -> layercfg::domain::Result<()> {
/// let config = Configuration::builder().load()?;
/// config
///     .event_builder("tuning")
///     .put("pool.size", "20")
///     .remove("pool.legacy")
///     .publish();
/// # Ok(())
/// # }
/// ```
#[must_use = "a batch does nothing until publish() is called"]
pub struct EventBuilder<'c> {
    config: &'c Configuration,
    name: String,
    changes: BTreeMap<String, Change>,
}

impl<'c> EventBuilder<'c> {
    pub(crate) fn new(config: &'c Configuration, name: impl Into<String>) -> Self {
        EventBuilder {
            config,
            name: name.into(),
            changes: BTreeMap::new(),
        }
    }

    /// Stages a put; the provenance tag defaults to `event:<name>`.
    pub fn put(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let source = format!("event:{}", self.name);
        self.put_sourced(key, value, source)
    }

    /// Stages a put with an explicit provenance tag.
    pub(crate) fn put_sourced(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let value = value.into();
        if self.config.current_value(&key).as_deref() == Some(value.as_str()) {
            // no net change; also clears any earlier staged change for the key
            self.changes.remove(&key);
            return self;
        }
        self.changes.insert(
            key,
            Change {
                value: Some(value),
                source: source.into(),
            },
        );
        self
    }

    /// Stages a put for every pair in the map.
    pub fn put_all<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in entries {
            self = self.put(key, value);
        }
        self
    }

    /// Stages a removal; absent keys are ignored.
    pub fn remove(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if self.config.current_value(&key).is_none() {
            self.changes.remove(&key);
            return self;
        }
        self.changes.insert(
            key,
            Change {
                value: None,
                source: format!("event:{}", self.name),
            },
        );
        self
    }

    /// True when no staged change survived the snapshot diff.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Applies the batch atomically and notifies listeners.
    ///
    /// Returns the keys whose effective value actually changed; an empty
    /// batch returns an empty set without firing any event. Publication is
    /// serialized: concurrent publishers never interleave their keys into one
    /// event.
    pub fn publish(self) -> BTreeSet<String> {
        if self.changes.is_empty() {
            return BTreeSet::new();
        }
        self.config.publish_batch(&self.name, self.changes)
    }
}
