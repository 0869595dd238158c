// SPDX-License-Identifier: MIT OR Apache-2.0

//! The live configuration service.
//!
//! This module provides [`Configuration`], which owns the entry store and
//! orchestrates reads, typed access, the modification/event pipeline, the
//! background scheduler and the file watch loop. Instances are built through
//! [`ConfigurationBuilder`], which runs the initial load sequence.

use crate::adapters::{DirResourceLoader, PropertiesParser};
use crate::domain::entry::{Entry, SOURCE_SET_PROPERTY};
use crate::domain::store::{runtime_override, Change};
use crate::domain::{ConfigError, ConfigValue, EntryStore, Result};
use crate::ports::{ConfigParser, ConfigSourcePlugin, ResourceLoader};
use crate::service::event::{ChangeEvent, EventBuilder, Listener};
use crate::service::loader::{
    self, LoadOptions, LoadResult, KEY_WATCH_DELAY, KEY_WATCH_ENABLED, KEY_WATCH_PERIOD,
};
use crate::service::schedule::Scheduler;
use crate::service::watch;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

/// Shared state behind a configuration handle.
pub(crate) struct Core {
    /// Dotted prefix for sub-views; empty at the root. Only used to report
    /// full keys in error messages.
    prefix: String,
    store: RwLock<EntryStore>,
    listeners: RwLock<Vec<Arc<Listener>>>,
    /// Serializes apply+notify so events never interleave.
    publish_lock: Mutex<()>,
    pub(crate) scheduler: Scheduler,
    parsers: Vec<Box<dyn ConfigParser>>,
    sources: RwLock<Vec<Box<dyn ConfigSourcePlugin>>>,
}

/// A live configuration instance.
///
/// `Configuration` is a cheaply cloneable handle over shared state. Reads are
/// concurrent; mutations flow through the modification pipeline and notify
/// registered listeners once per published batch.
///
/// # Examples
///
/// ```rust,no_run
/// use layercfg::prelude::*;
///
/// # fn main() -> layercfg::domain::Result<()> {
/// let config = Configuration::builder().load()?;
/// let name = config.get_or_default("app.name", "unnamed");
/// let timeout = config.get_duration("server.read.timeout")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Configuration {
    core: Arc<Core>,
}

impl Configuration {
    /// Creates a builder running the full layered load sequence.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    pub(crate) fn from_core(core: Arc<Core>) -> Self {
        Configuration { core }
    }

    pub(crate) fn core_arc(&self) -> &Arc<Core> {
        &self.core
    }

    pub(crate) fn parser_for(&self, ext: &str) -> Option<&dyn ConfigParser> {
        self.core
            .parsers
            .iter()
            .find(|p| p.supported_extensions().contains(&ext))
            .map(|b| b.as_ref())
    }

    fn full_key(&self, key: &str) -> String {
        if self.core.prefix.is_empty() {
            key.to_string()
        } else if key.is_empty() {
            self.core.prefix.clone()
        } else {
            format!("{}.{}", self.core.prefix, key)
        }
    }

    /// Entry lookup with default memoization.
    ///
    /// The fast path is a shared read; only a miss (or a null entry being
    /// upgraded by a default) takes the write lock to memoize.
    fn entry(&self, key: &str, default: Option<&str>) -> Entry {
        {
            let store = self.core.store.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = store.get(key) {
                if !entry.is_null() || default.is_none() {
                    return entry.clone();
                }
            }
        }
        let mut store = self.core.store.write().unwrap_or_else(PoisonError::into_inner);
        store.get_or_default(key, default)
    }

    pub(crate) fn current_value(&self, key: &str) -> Option<String> {
        let store = self.core.store.read().unwrap_or_else(PoisonError::into_inner);
        store.get(key).and_then(|e| e.value().map(str::to_string))
    }

    // ---- read surface -------------------------------------------------

    /// Returns the value for a required key.
    ///
    /// Fails immediately with the full dotted key (including any `for_path`
    /// prefix) when the key has no value; a required value is never silently
    /// defaulted.
    pub fn get(&self, key: &str) -> Result<ConfigValue> {
        let entry = self.entry(key, None);
        match entry.value() {
            Some(v) => Ok(ConfigValue::from(v)),
            None => Err(ConfigError::RequiredKeyMissing {
                key: self.full_key(key),
            }),
        }
    }

    /// Returns the value for a key, or `None` when absent.
    ///
    /// The miss is memoized, so repeated probes of an absent key do not
    /// re-consult the runtime overrides.
    pub fn get_optional(&self, key: &str) -> Option<ConfigValue> {
        let entry = self.entry(key, None);
        entry.value().map(ConfigValue::from)
    }

    /// Returns the value for a key, memoizing `default` when absent.
    ///
    /// On first access with no configured value the runtime overrides are
    /// consulted (system property, then environment), otherwise the default
    /// is stored. The memoized value sticks: a later call with a *different*
    /// default still returns the first one, until the key is explicitly set.
    pub fn get_or_default(&self, key: &str, default: &str) -> ConfigValue {
        let entry = self.entry(key, Some(default));
        ConfigValue::from(entry.value().unwrap_or(default))
    }

    /// True when the key currently has a non-null value. Does not memoize.
    pub fn has(&self, key: &str) -> bool {
        let store = self.core.store.read().unwrap_or_else(PoisonError::into_inner);
        store.get(key).map(|e| !e.is_null()).unwrap_or(false)
    }

    /// Returns the memoized boolean interpretation of a required key.
    ///
    /// Uses the per-entry boolean cache: any value other than `"true"`
    /// (case-insensitive) reads as `false`.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let entry = self.entry(key, None);
        if entry.is_null() {
            return Err(ConfigError::RequiredKeyMissing {
                key: self.full_key(key),
            });
        }
        Ok(entry.bool_value())
    }

    /// Boolean read with a memoized default.
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        let default_str = if default { "true" } else { "false" };
        self.entry(key, Some(default_str)).bool_value()
    }

    /// Returns a required key parsed as `i32`.
    pub fn get_int(&self, key: &str) -> Result<i32> {
        self.get(key)?.as_i32(&self.full_key(key))
    }

    /// Integer read with a memoized default.
    pub fn get_int_or(&self, key: &str, default: i32) -> Result<i32> {
        let default_str = default.to_string();
        let entry = self.entry(key, Some(&default_str));
        ConfigValue::from(entry.value().unwrap_or(&default_str)).as_i32(&self.full_key(key))
    }

    /// Returns a required key parsed as `i64`.
    pub fn get_long(&self, key: &str) -> Result<i64> {
        self.get(key)?.as_i64(&self.full_key(key))
    }

    /// Long read with a memoized default.
    pub fn get_long_or(&self, key: &str, default: i64) -> Result<i64> {
        let default_str = default.to_string();
        let entry = self.entry(key, Some(&default_str));
        ConfigValue::from(entry.value().unwrap_or(&default_str)).as_i64(&self.full_key(key))
    }

    /// Returns a required key parsed as `f64`.
    pub fn get_decimal(&self, key: &str) -> Result<f64> {
        self.get(key)?.as_f64(&self.full_key(key))
    }

    /// Returns a required key parsed as a `Duration` (humantime syntax or
    /// bare seconds).
    pub fn get_duration(&self, key: &str) -> Result<Duration> {
        self.get(key)?.as_duration(&self.full_key(key))
    }

    /// Returns a required key parsed into any `FromStr` type: URIs,
    /// addresses, enums.
    pub fn get_as<T>(&self, key: &str) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.get(key)?.parse(&self.full_key(key))
    }

    /// Comma-split list value; empty when the key is absent.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get_optional(key).map(|v| v.as_list()).unwrap_or_default()
    }

    /// Comma-split list with typed elements; empty when the key is absent.
    pub fn list_as<T>(&self, key: &str) -> Result<Vec<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get_optional(key) {
            Some(v) => v.as_list_of(&self.full_key(key)),
            None => Ok(Vec::new()),
        }
    }

    /// Comma-split set value; empty when the key is absent.
    pub fn set_of(&self, key: &str) -> BTreeSet<String> {
        self.get_optional(key).map(|v| v.as_set()).unwrap_or_default()
    }

    /// Ordered snapshot of all live key/value pairs.
    pub fn as_flat_map(&self) -> BTreeMap<String, String> {
        let store = self.core.store.read().unwrap_or_else(PoisonError::into_inner);
        store.as_flat_map()
    }

    /// Builds a read-only sub-view scoped to a dotted prefix.
    ///
    /// The sub-view owns a snapshot built once by prefix-filtering: a key
    /// exactly equal to the prefix appears under the empty key, child keys
    /// have the prefix stripped. Mutations of this configuration after the
    /// sub-view is created are NOT reflected in it. Error messages from the
    /// sub-view report full dotted keys.
    pub fn for_path(&self, prefix: &str) -> Configuration {
        let sub_store = {
            let store = self.core.store.read().unwrap_or_else(PoisonError::into_inner);
            store.for_prefix(prefix)
        };
        Configuration {
            core: Arc::new(Core {
                prefix: self.full_key(prefix),
                store: RwLock::new(sub_store),
                listeners: RwLock::new(Vec::new()),
                publish_lock: Mutex::new(()),
                scheduler: Scheduler::new(),
                parsers: Vec::new(),
                sources: RwLock::new(Vec::new()),
            }),
        }
    }

    // ---- modification & events ----------------------------------------

    /// Starts a modification batch published under `name`.
    pub fn event_builder(&self, name: impl Into<String>) -> EventBuilder<'_> {
        EventBuilder::new(self, name)
    }

    /// Sets one property, publishing a `SetProperty` batch.
    ///
    /// Setting a key to its current value is a no-op that fires no event.
    pub fn set_property(&self, key: impl Into<String>, value: impl Into<String>) {
        self.event_builder("SetProperty")
            .put_sourced(key, value, SOURCE_SET_PROPERTY)
            .publish();
    }

    /// Removes one property, publishing a `SetProperty` batch.
    pub fn clear_property(&self, key: &str) {
        self.event_builder("SetProperty").remove(key).publish();
    }

    /// Bulk put, published as one `putAll` batch with a single event.
    pub fn put_all<I, K, V>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut builder = self.event_builder("putAll");
        for (key, value) in entries {
            builder = builder.put_sourced(key, value, SOURCE_SET_PROPERTY);
        }
        builder.publish();
    }

    fn add_listener(&self, listener: Listener) {
        let mut listeners = self
            .core
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.push(Arc::new(listener));
    }

    /// Registers a bulk listener fired once per published batch.
    pub fn on_change(&self, callback: impl Fn(&ChangeEvent<'_>) + Send + Sync + 'static) {
        self.add_listener(Listener::Bulk {
            keys: Vec::new(),
            callback: Box::new(callback),
        });
    }

    /// Registers a bulk listener that only fires when its interest keys
    /// intersect the batch's changed keys.
    pub fn on_change_filtered<I, K>(
        &self,
        callback: impl Fn(&ChangeEvent<'_>) + Send + Sync + 'static,
        interest_keys: I,
    ) where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.add_listener(Listener::Bulk {
            keys: interest_keys.into_iter().map(Into::into).collect(),
            callback: Box::new(callback),
        });
    }

    /// Registers a callback for one key, receiving the new value (`None` on
    /// removal).
    pub fn on_change_key(
        &self,
        key: impl Into<String>,
        callback: impl Fn(Option<&str>) + Send + Sync + 'static,
    ) {
        self.add_listener(Listener::SingleKey {
            key: key.into(),
            callback: Box::new(callback),
        });
    }

    /// Registers a callback for one key, parsing the new value as `i32`.
    /// Unparseable or removed values are logged and skipped.
    pub fn on_change_int(
        &self,
        key: impl Into<String>,
        callback: impl Fn(i32) + Send + Sync + 'static,
    ) {
        let key = key.into();
        let log_key = key.clone();
        self.add_listener(Listener::SingleKey {
            key,
            callback: Box::new(move |value| {
                if let Some(v) = value {
                    match v.parse::<i32>() {
                        Ok(n) => callback(n),
                        Err(e) => {
                            tracing::error!("Ignoring change for '{}', not an int: {}", log_key, e)
                        }
                    }
                }
            }),
        });
    }

    /// Registers a callback for one key, parsing the new value as `i64`.
    pub fn on_change_long(
        &self,
        key: impl Into<String>,
        callback: impl Fn(i64) + Send + Sync + 'static,
    ) {
        let key = key.into();
        let log_key = key.clone();
        self.add_listener(Listener::SingleKey {
            key,
            callback: Box::new(move |value| {
                if let Some(v) = value {
                    match v.parse::<i64>() {
                        Ok(n) => callback(n),
                        Err(e) => {
                            tracing::error!("Ignoring change for '{}', not a long: {}", log_key, e)
                        }
                    }
                }
            }),
        });
    }

    /// Registers a callback for one key, interpreting the new value as a
    /// boolean (`"true"`, case-insensitive).
    pub fn on_change_bool(
        &self,
        key: impl Into<String>,
        callback: impl Fn(bool) + Send + Sync + 'static,
    ) {
        self.add_listener(Listener::SingleKey {
            key: key.into(),
            callback: Box::new(move |value| {
                if let Some(v) = value {
                    callback(v.eq_ignore_ascii_case("true"));
                }
            }),
        });
    }

    /// Applies a batch and dispatches the resulting event.
    ///
    /// One mutual-exclusion region covers apply and notify, so publishes are
    /// totally ordered and listeners observe coherent batches. The listener
    /// list is snapshotted before dispatch; a panicking listener is caught,
    /// logged, and never blocks delivery to the others. Listeners must be
    /// fast and must not publish from within a callback.
    pub(crate) fn publish_batch(
        &self,
        name: &str,
        changes: BTreeMap<String, Change>,
    ) -> BTreeSet<String> {
        let _guard = self
            .core
            .publish_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let changed = {
            let mut store = self.core.store.write().unwrap_or_else(PoisonError::into_inner);
            store.apply_batch(&changes)
        };
        if changed.is_empty() {
            return changed;
        }
        let listeners: Vec<Arc<Listener>> = {
            let listeners = self
                .core
                .listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            listeners.clone()
        };
        let event = ChangeEvent::new(name, &changed, self);
        for listener in &listeners {
            if let Listener::Bulk { keys, callback } = listener.as_ref() {
                if keys.is_empty() || keys.iter().any(|k| changed.contains(k)) {
                    if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                        tracing::error!("Configuration listener panicked during '{}' event", name);
                    }
                }
            }
        }
        for key in &changed {
            let new_value = self.current_value(key);
            for listener in &listeners {
                if let Listener::SingleKey { key: k, callback } = listener.as_ref() {
                    if k == key
                        && catch_unwind(AssertUnwindSafe(|| callback(new_value.as_deref())))
                            .is_err()
                    {
                        tracing::error!("Configuration listener for '{}' panicked", key);
                    }
                }
            }
        }
        changed
    }

    // ---- scheduling & lifecycle ---------------------------------------

    /// Registers a periodic task on this configuration's scheduler: first run
    /// after `delay`, then every `period`.
    ///
    /// A task that captures a clone of this configuration keeps it alive;
    /// call [`shutdown`](Configuration::shutdown) explicitly in that case.
    pub fn schedule(
        &self,
        delay: Duration,
        period: Duration,
        task: impl Fn() + Send + Sync + 'static,
    ) {
        self.core
            .scheduler
            .schedule("scheduled", delay, period, Arc::new(task));
    }

    /// Invokes the `refresh` hook of every registered source plugin.
    pub fn refresh_sources(&self) {
        let sources = self
            .core
            .sources
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for source in sources.iter() {
            if let Err(e) = source.refresh() {
                tracing::warn!("Refresh of source '{}' failed: {}", source.name(), e);
            }
        }
    }

    /// Stops the background scheduler and with it the file watch loop.
    ///
    /// Also runs automatically when the last handle to this configuration is
    /// dropped.
    pub fn shutdown(&self) {
        self.core.scheduler.shutdown();
    }
}

fn effective_value(store: &EntryStore, key: &str) -> Option<String> {
    store
        .get(key)
        .and_then(|e| e.value().map(str::to_string))
        .or_else(|| runtime_override(key).map(|(v, _)| v))
}

fn effective_bool(store: &EntryStore, key: &str) -> bool {
    effective_value(store, key)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn effective_duration(store: &EntryStore, key: &str, default_secs: u64) -> Duration {
    effective_value(store, key)
        .and_then(|v| ConfigValue::from(v).as_duration(key).ok())
        .unwrap_or(Duration::from_secs(default_secs))
}

/// Builder assembling the parser registry, source plugins and load inputs.
///
/// # Examples
///
/// ```rust,no_run
/// use layercfg::prelude::*;
///
/// # fn main() -> layercfg::domain::Result<()> {
/// let config = Configuration::builder()
///     .base_dir("/etc/myapp")
///     .put("app.name", "myapp")
///     .load()?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigurationBuilder {
    parsers: Vec<Box<dyn ConfigParser>>,
    resource_loader: Option<Box<dyn ResourceLoader>>,
    sources: Vec<Box<dyn ConfigSourcePlugin>>,
    base_dir: PathBuf,
    command_line: Vec<PathBuf>,
    seed: BTreeMap<String, String>,
}

impl ConfigurationBuilder {
    /// Creates a builder with the feature-enabled parsers registered.
    pub fn new() -> Self {
        let mut parsers: Vec<Box<dyn ConfigParser>> = vec![Box::new(PropertiesParser::new())];
        #[cfg(feature = "yaml")]
        parsers.push(Box::new(crate::adapters::YamlParser::new()));
        #[cfg(feature = "json")]
        parsers.push(Box::new(crate::adapters::JsonParser::new()));
        #[cfg(feature = "toml")]
        parsers.push(Box::new(crate::adapters::TomlParser::new()));
        ConfigurationBuilder {
            parsers,
            resource_loader: None,
            sources: Vec::new(),
            base_dir: PathBuf::from("."),
            command_line: Vec::new(),
            seed: BTreeMap::new(),
        }
    }

    /// Registers an additional format parser.
    pub fn with_parser(mut self, parser: Box<dyn ConfigParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Replaces the bundled-resource lookup strategy.
    pub fn with_resource_loader(mut self, loader: Box<dyn ResourceLoader>) -> Self {
        self.resource_loader = Some(loader);
        self
    }

    /// Registers a source plugin, applied after the initial load.
    pub fn with_source(mut self, source: Box<dyn ConfigSourcePlugin>) -> Self {
        self.sources.push(source);
        self
    }

    /// Sets the directory probed for local configuration files (and, unless
    /// a resource loader is injected, its `resources/` child for bundled
    /// resources). Defaults to the current directory.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Supplies command-line file paths, the highest-precedence layer.
    pub fn load_args<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.command_line.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Seeds an explicit property below every loaded layer.
    pub fn put(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.seed.insert(key.into(), value.into());
        self
    }

    /// Runs the layered load sequence and returns the live configuration.
    pub fn load(self) -> Result<Configuration> {
        let resource_loader: Box<dyn ResourceLoader> = match self.resource_loader {
            Some(loader) => loader,
            None => Box::new(DirResourceLoader::new([
                self.base_dir.join("resources"),
                self.base_dir.clone(),
            ])),
        };
        let file_dirs = vec![self.base_dir.clone()];
        let LoadResult {
            store,
            watch_candidates,
        } = loader::run(LoadOptions {
            parsers: &self.parsers,
            resource_loader: resource_loader.as_ref(),
            file_dirs: &file_dirs,
            command_line: &self.command_line,
            seed: &self.seed,
        })?;

        let watch_enabled = effective_bool(&store, KEY_WATCH_ENABLED);
        let delay = effective_duration(&store, KEY_WATCH_DELAY, 60);
        let period = effective_duration(&store, KEY_WATCH_PERIOD, 10);

        let config = Configuration {
            core: Arc::new(Core {
                prefix: String::new(),
                store: RwLock::new(store),
                listeners: RwLock::new(Vec::new()),
                publish_lock: Mutex::new(()),
                scheduler: Scheduler::new(),
                parsers: self.parsers,
                sources: RwLock::new(Vec::new()),
            }),
        };

        for source in self.sources {
            source.apply(&config)?;
            config
                .core
                .sources
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .push(source);
        }

        if watch_enabled && !watch_candidates.is_empty() {
            watch::start(&config, watch_candidates, delay, period);
        }
        Ok(config)
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn empty_config() -> Configuration {
        let dir = tempfile::tempdir().unwrap();
        Configuration::builder().base_dir(dir.path()).load().unwrap()
    }

    #[test]
    fn test_get_missing_key_is_error() {
        let config = empty_config();
        let err = config.get("missing.key").unwrap_err();
        assert!(matches!(err, ConfigError::RequiredKeyMissing { .. }));
        assert!(err.to_string().contains("missing.key"));
    }

    #[test]
    fn test_get_or_default_first_default_wins() {
        let config = empty_config();
        assert_eq!(config.get_or_default("z", "A").as_str(), "A");
        assert_eq!(config.get_or_default("z", "B").as_str(), "A");
        config.set_property("z", "C");
        assert_eq!(config.get_or_default("z", "B").as_str(), "C");
    }

    #[test]
    fn test_set_and_clear_property() {
        let config = empty_config();
        config.set_property("k", "v");
        assert_eq!(config.get("k").unwrap().as_str(), "v");
        config.clear_property("k");
        assert!(config.get("k").is_err());
    }

    #[test]
    fn test_typed_getters() {
        let config = empty_config();
        config.set_property("n", "42");
        config.set_property("b", "true");
        config.set_property("d", "2s");
        assert_eq!(config.get_int("n").unwrap(), 42);
        assert_eq!(config.get_long("n").unwrap(), 42);
        assert!(config.get_bool("b").unwrap());
        assert_eq!(config.get_duration("d").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn test_get_bool_uses_entry_cache_semantics() {
        let config = empty_config();
        config.set_property("flag", "TRUE");
        assert!(config.get_bool("flag").unwrap());
        // anything that is not "true" reads as false through the cache
        config.set_property("flag", "yes");
        assert!(!config.get_bool("flag").unwrap());
    }

    #[test]
    fn test_list_and_set() {
        let config = empty_config();
        config.set_property("hosts", "a, b ,c");
        assert_eq!(config.list("hosts"), vec!["a", "b", "c"]);
        assert_eq!(config.list("absent"), Vec::<String>::new());
        assert_eq!(config.list_as::<i32>("absent").unwrap(), Vec::<i32>::new());
        assert_eq!(config.set_of("hosts").len(), 3);
    }

    #[test]
    fn test_for_path_error_reports_full_key() {
        let config = empty_config();
        config.set_property("server.port", "8080");
        let server = config.for_path("server");
        let err = server.get("missing").unwrap_err();
        assert!(err.to_string().contains("server.missing"));
    }

    #[test]
    fn test_for_path_scalar_and_children() {
        let config = empty_config();
        config.set_property("foo", "spud");
        config.set_property("foo.bar", "42");
        let sub = config.for_path("foo");
        assert_eq!(sub.get("").unwrap().as_str(), "spud");
        assert_eq!(sub.get("bar").unwrap().as_str(), "42");
    }

    #[test]
    fn test_for_path_is_not_live() {
        let config = empty_config();
        config.set_property("foo.bar", "before");
        let sub = config.for_path("foo");
        config.set_property("foo.bar", "after");
        assert_eq!(sub.get("bar").unwrap().as_str(), "before");
    }

    #[test]
    fn test_put_all_single_event() {
        let config = empty_config();
        let events = Arc::new(AtomicUsize::new(0));
        let events_clone = Arc::clone(&events);
        config.on_change(move |event| {
            assert_eq!(event.modified_keys().len(), 2);
            events_clone.fetch_add(1, Ordering::SeqCst);
        });
        config.put_all([("a", "1"), ("b", "2")]);
        assert_eq!(events.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_builder_load_args_override_files(){
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("application.properties"), "who=file\n").unwrap();
        let extra = dir.path().join("cli.properties");
        fs::write(&extra, "who=cli\n").unwrap();
        let config = Configuration::builder()
            .base_dir(dir.path())
            .load_args([extra])
            .load()
            .unwrap();
        assert_eq!(config.get("who").unwrap().as_str(), "cli");
    }

    #[test]
    fn test_builder_seed_is_lowest_precedence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("application.properties"), "who=file\n").unwrap();
        let config = Configuration::builder()
            .base_dir(dir.path())
            .put("who", "seed")
            .put("only.seed", "yes")
            .load()
            .unwrap();
        assert_eq!(config.get("who").unwrap().as_str(), "file");
        assert_eq!(config.get("only.seed").unwrap().as_str(), "yes");
    }

    #[test]
    fn test_has_does_not_memoize() {
        let config = empty_config();
        assert!(!config.has("probe.key"));
        config.set_property("probe.key", "v");
        assert!(config.has("probe.key"));
    }
}
