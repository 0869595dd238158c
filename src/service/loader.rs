// SPDX-License-Identifier: MIT OR Apache-2.0

//! Initial load sequencer.
//!
//! Orchestrates the ordered reading of all bootstrap layers into the entry
//! store before the configuration goes live. Later steps override earlier
//! ones, since every step feeds the same accumulating store:
//!
//! 1. environment-derived bootstrap keys (pod metadata)
//! 2. bundled `application.*` resources
//! 3. `config.profiles` resources
//! 4. local `application.*` files
//! 5. profile files
//! 6. the external file named by `props.file` / `PROPS_FILE`
//! 7. indirect includes via the `load.properties` key
//! 8. `application-test.*` resources, else the `~/.localdev` override
//! 9. command-line supplied file paths
//!
//! After all steps every value is run through the expression evaluator until
//! stable, and files read from disk are recorded as watch candidates.

use crate::domain::entry::{Entry, SOURCE_ENV};
use crate::domain::expr::{Evaluator, MAX_PASSES};
use crate::domain::store::runtime_override;
use crate::domain::system_props;
use crate::domain::{ConfigError, EntryStore, Result};
use crate::ports::{ConfigParser, ResourceLoader};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Base name for the main configuration resources and files.
const MAIN_BASE_NAME: &str = "application";

/// Reserved key listing additional profiles to load.
pub const KEY_PROFILES: &str = "config.profiles";
/// Reserved key naming further files to include, evaluated before use.
pub const KEY_LOAD_PROPERTIES: &str = "load.properties";
/// Reserved key enabling the file watch loop.
pub const KEY_WATCH_ENABLED: &str = "config.watch.enabled";
/// Reserved key for the watch loop's initial delay.
pub const KEY_WATCH_DELAY: &str = "config.watch.delay";
/// Reserved key for the watch loop's tick period.
pub const KEY_WATCH_PERIOD: &str = "config.watch.period";
/// Reserved key exporting the loaded map into the system-property table.
pub const KEY_LOAD_SYSTEM_PROPERTIES: &str = "config.load.systemProperties";

/// Conventional key carrying the discovered application name.
const KEY_APP_NAME: &str = "app.name";

/// A file read from disk during loading, eligible for watching.
#[derive(Clone, Debug)]
pub(crate) struct WatchCandidate {
    /// Concrete path that was loaded.
    pub path: PathBuf,
    /// Extension the file was parsed under.
    pub ext: String,
}

/// Everything the loader hands to the live configuration.
pub(crate) struct LoadResult {
    pub store: EntryStore,
    pub watch_candidates: Vec<WatchCandidate>,
}

/// Inputs to one load run, assembled by the builder.
pub(crate) struct LoadOptions<'a> {
    pub parsers: &'a [Box<dyn ConfigParser>],
    pub resource_loader: &'a dyn ResourceLoader,
    pub file_dirs: &'a [PathBuf],
    pub command_line: &'a [PathBuf],
    pub seed: &'a BTreeMap<String, String>,
}

/// Runs the full load sequence.
pub(crate) fn run(options: LoadOptions<'_>) -> Result<LoadResult> {
    let extensions: Vec<String> = {
        let mut seen = HashSet::new();
        options
            .parsers
            .iter()
            .flat_map(|p| p.supported_extensions())
            .filter(|e| seen.insert(e.to_string()))
            .map(|e| e.to_string())
            .collect()
    };
    let mut loader = InitialLoader {
        options,
        extensions,
        store: EntryStore::new(),
        watch_candidates: Vec::new(),
    };
    loader.load()
}

struct InitialLoader<'a> {
    options: LoadOptions<'a>,
    extensions: Vec<String>,
    store: EntryStore,
    watch_candidates: Vec<WatchCandidate>,
}

impl InitialLoader<'_> {
    fn load(mut self) -> Result<LoadResult> {
        self.load_seed();
        self.load_environment_bootstrap();
        self.load_main_resources()?;
        self.load_profile_resources()?;
        self.load_main_files()?;
        self.load_profile_files()?;
        self.load_external_file()?;
        self.load_includes()?;
        self.load_test_overrides()?;
        self.load_command_line()?;
        self.resolve_expressions();
        self.export_system_properties();
        Ok(LoadResult {
            store: self.store,
            watch_candidates: self.watch_candidates,
        })
    }

    fn load_seed(&mut self) {
        for (key, value) in self.options.seed {
            self.store.put(key.clone(), Entry::new(value.clone(), "initial"));
        }
    }

    /// Step 1: platform-provided pod/instance metadata, mapped to
    /// conventional keys. Skipped per key when a system-property override
    /// exists.
    fn load_environment_bootstrap(&mut self) {
        const MAPPINGS: [(&str, &str); 3] = [
            ("POD_NAME", "app.instanceId"),
            ("POD_NAMESPACE", "app.namespace"),
            ("APP_ENV", "app.environment"),
        ];
        for (env_name, key) in MAPPINGS {
            if system_props::contains(key) {
                continue;
            }
            if let Ok(value) = env::var(env_name) {
                self.store.put(key, Entry::new(value, SOURCE_ENV));
            }
        }
        if self.value(KEY_APP_NAME).is_none() && !system_props::contains(KEY_APP_NAME) {
            if let Some(name) = env::var("POD_NAME").ok().as_deref().and_then(pod_app_name) {
                self.store.put(KEY_APP_NAME, Entry::new(name, SOURCE_ENV));
            }
        }
    }

    /// Step 2: bundled main resources for every known extension.
    fn load_main_resources(&mut self) -> Result<()> {
        for ext in &self.extensions.clone() {
            self.load_resource(&format!("{MAIN_BASE_NAME}.{ext}"))?;
        }
        Ok(())
    }

    /// Step 3: profile resources in listed order.
    fn load_profile_resources(&mut self) -> Result<()> {
        for profile in self.profiles() {
            for ext in &self.extensions.clone() {
                self.load_resource(&format!("{MAIN_BASE_NAME}-{profile}.{ext}"))?;
            }
        }
        Ok(())
    }

    /// Step 4: local files with the main base names.
    fn load_main_files(&mut self) -> Result<()> {
        for dir in self.options.file_dirs.to_vec() {
            for ext in self.extensions.clone() {
                self.load_file(&dir.join(format!("{MAIN_BASE_NAME}.{ext}")), false)?;
            }
        }
        Ok(())
    }

    /// Step 5: profile files, mirroring step 3.
    fn load_profile_files(&mut self) -> Result<()> {
        for profile in self.profiles() {
            for dir in self.options.file_dirs.to_vec() {
                for ext in self.extensions.clone() {
                    self.load_file(&dir.join(format!("{MAIN_BASE_NAME}-{profile}.{ext}")), false)?;
                }
            }
        }
        Ok(())
    }

    /// Step 6: the single external override file.
    fn load_external_file(&mut self) -> Result<()> {
        let named = system_props::get("props.file").or_else(|| env::var("PROPS_FILE").ok());
        if let Some(path) = named {
            self.load_file(Path::new(&path), true)?;
        }
        Ok(())
    }

    /// Step 7: indirect includes named by the `load.properties` key, each
    /// evaluated for embedded expressions before being treated as a path.
    fn load_includes(&mut self) -> Result<()> {
        let mut processed: HashSet<String> = HashSet::new();
        for _ in 0..5 {
            let raw = match self.value(KEY_LOAD_PROPERTIES) {
                Some(v) => v,
                None => return Ok(()),
            };
            let mut loaded_new = false;
            let tokens: Vec<String> = raw
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(|t| t.to_string())
                .collect();
            for token in tokens {
                let path = self.eval_in_progress(&token);
                if !processed.insert(path.clone()) {
                    continue;
                }
                if self.load_file(Path::new(&path), true)? {
                    loaded_new = true;
                }
            }
            if !loaded_new {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Step 8: test resources when packaged, else the local developer
    /// override directory keyed by the discovered application name.
    fn load_test_overrides(&mut self) -> Result<()> {
        let mut found_test_resource = false;
        for ext in &self.extensions.clone() {
            if self.load_resource(&format!("{MAIN_BASE_NAME}-test.{ext}"))? {
                found_test_resource = true;
            }
        }
        if found_test_resource {
            return Ok(());
        }
        let app_name = match self.value(KEY_APP_NAME) {
            Some(name) => name,
            None => return Ok(()),
        };
        if let Some(base) = directories::BaseDirs::new() {
            let localdev = base.home_dir().join(".localdev");
            for ext in self.extensions.clone() {
                self.load_file(&localdev.join(format!("{app_name}.{ext}")), false)?;
            }
        }
        Ok(())
    }

    /// Step 9: command-line supplied file paths, highest precedence.
    fn load_command_line(&mut self) -> Result<()> {
        for path in self.options.command_line.to_vec() {
            self.load_file(&path, true)?;
        }
        Ok(())
    }

    /// Runs the accumulated map to an expression fixed point, preserving each
    /// entry's source tag.
    fn resolve_expressions(&mut self) {
        for _ in 0..MAX_PASSES {
            let flat = self.store.as_flat_map();
            let eval = Evaluator::new(|key| flat.get(key).cloned());
            let mut updates: Vec<(String, String)> = Vec::new();
            for (key, value) in &flat {
                if value.contains("${") {
                    let resolved = eval.eval_str(value);
                    if &resolved != value {
                        updates.push((key.clone(), resolved));
                    }
                }
            }
            if updates.is_empty() {
                break;
            }
            for (key, resolved) in updates {
                let source = self
                    .store
                    .get(&key)
                    .map(|e| e.source().to_string())
                    .unwrap_or_default();
                self.store.put(key, Entry::new(resolved, source));
            }
        }
    }

    fn export_system_properties(&self) {
        let enabled = self
            .value(KEY_LOAD_SYSTEM_PROPERTIES)
            .or_else(|| runtime_override(KEY_LOAD_SYSTEM_PROPERTIES).map(|(v, _)| v))
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if !enabled {
            return;
        }
        let flat = self.store.as_flat_map();
        system_props::export(flat.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    /// Current raw value of a key in the in-progress store.
    fn value(&self, key: &str) -> Option<String> {
        self.store.get(key).and_then(|e| e.value().map(str::to_string))
    }

    fn profiles(&self) -> Vec<String> {
        let raw = system_props::get(KEY_PROFILES)
            .or_else(|| env::var("CONFIG_PROFILES").ok())
            .or_else(|| self.value(KEY_PROFILES));
        match raw {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    fn eval_in_progress(&self, raw: &str) -> String {
        let flat = self.store.as_flat_map();
        let eval = Evaluator::new(|key| flat.get(key).cloned());
        eval.eval_stable(raw)
    }

    fn parser_for(&self, ext: &str) -> Option<&dyn ConfigParser> {
        self.options
            .parsers
            .iter()
            .find(|p| p.supported_extensions().contains(&ext))
            .map(|b| b.as_ref())
    }

    /// Probes one bundled resource; returns true when it contributed.
    ///
    /// A missing resource contributes nothing, but a present resource the
    /// parser rejects is a fatal startup error.
    fn load_resource(&mut self, name: &str) -> Result<bool> {
        let content = match self.options.resource_loader.read(name) {
            Some(c) => c,
            None => return Ok(false),
        };
        let ext = match name.rsplit('.').next() {
            Some(e) => e.to_string(),
            None => return Ok(false),
        };
        let parser = match self.parser_for(&ext) {
            Some(p) => p,
            None => return Ok(false),
        };
        let map = parser.parse(&content)?;
        self.merge(map, &format!("resource:{name}"));
        Ok(true)
    }

    /// Loads one file from disk. Explicit requests fail on an unregistered
    /// extension; probes skip quietly. Missing files never contribute.
    fn load_file(&mut self, path: &Path, explicit: bool) -> Result<bool> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string)
            .unwrap_or_default();
        let parser = match self.parser_for(&ext) {
            Some(p) => p,
            None => {
                if explicit {
                    return Err(ConfigError::UnknownExtension {
                        path: path.display().to_string(),
                    });
                }
                return Ok(false);
            }
        };
        if !path.is_file() {
            tracing::debug!("Configuration file not present: {}", path.display());
            return Ok(false);
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Unable to read '{}': {}", path.display(), e);
                return Ok(false);
            }
        };
        let map = parser.parse(&content)?;
        self.merge(map, &format!("file:{}", path.display()));
        self.watch_candidates.push(WatchCandidate {
            path: path.to_path_buf(),
            ext,
        });
        Ok(true)
    }

    fn merge(&mut self, map: HashMap<String, String>, source: &str) {
        for (key, value) in map {
            self.store.put(key, Entry::new(value, source));
        }
    }
}

/// Derives an application name from a pod name by dropping the trailing
/// replica-set and pod hash segments, e.g. `shop-web-7f9d8c5b7-x2x4v` becomes
/// `shop-web`.
fn pod_app_name(pod_name: &str) -> Option<String> {
    let parts: Vec<&str> = pod_name.split('-').collect();
    if parts.len() > 2 {
        Some(parts[..parts.len() - 2].join("-"))
    } else {
        None
    }
}
