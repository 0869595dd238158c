// SPDX-License-Identifier: MIT OR Apache-2.0

//! File watch loop.
//!
//! A scheduled polling task that detects changed or touched files among those
//! read from disk during the initial load, re-parses them, and republishes
//! the result through the modification pipeline as a single batch named
//! `reload`. Enabled only by `config.watch.enabled`.

use crate::service::config::Core;
use crate::service::loader::WatchCandidate;
use crate::service::Configuration;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::{Duration, SystemTime};

/// Stat snapshot of one watched file.
///
/// A file is considered changed when either its modified time or its length
/// differs from the last observed values.
pub(crate) struct WatchedFile {
    path: PathBuf,
    ext: String,
    last_modified: Option<SystemTime>,
    length: u64,
}

impl WatchedFile {
    pub(crate) fn new(candidate: WatchCandidate) -> Self {
        let (last_modified, length) = stat(&candidate.path);
        WatchedFile {
            path: candidate.path,
            ext: candidate.ext,
            last_modified,
            length,
        }
    }

    /// Re-stats the file, recording and reporting any difference.
    fn poll(&mut self) -> bool {
        let (modified, length) = stat(&self.path);
        if modified.is_none() {
            // unreadable or deleted this tick; keep the old stats
            return false;
        }
        let changed = modified != self.last_modified || length != self.length;
        if changed {
            self.last_modified = modified;
            self.length = length;
        }
        changed
    }
}

fn stat(path: &Path) -> (Option<SystemTime>, u64) {
    match fs::metadata(path) {
        Ok(meta) => (meta.modified().ok(), meta.len()),
        Err(_) => (None, 0),
    }
}

/// Registers the watch tick on the configuration's scheduler.
pub(crate) fn start(
    config: &Configuration,
    candidates: Vec<WatchCandidate>,
    delay: Duration,
    period: Duration,
) {
    let files: Vec<WatchedFile> = candidates.into_iter().map(WatchedFile::new).collect();
    let files = Mutex::new(files);
    let weak: Weak<Core> = Arc::downgrade(config.core_arc());
    // a weak reference: the watch task must not keep its own configuration alive
    config.core_arc().scheduler.schedule(
        "file-watch",
        delay,
        period,
        Arc::new(move || {
            if let Some(core) = weak.upgrade() {
                tick(&core, &files);
            }
        }),
    );
}

/// One poll pass: fold every changed file's fresh parse into one `reload`
/// batch and publish it. Files that fail to read or parse are skipped for
/// this tick without aborting the others.
fn tick(core: &Arc<Core>, files: &Mutex<Vec<WatchedFile>>) {
    let config = Configuration::from_core(Arc::clone(core));
    let mut builder = config.event_builder("reload");
    {
        let mut files = files.lock().unwrap_or_else(PoisonError::into_inner);
        for file in files.iter_mut() {
            if !file.poll() {
                continue;
            }
            let parser = match config.parser_for(&file.ext) {
                Some(p) => p,
                None => continue,
            };
            let content = match fs::read_to_string(&file.path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("Reload skipped, cannot read '{}': {}", file.path.display(), e);
                    continue;
                }
            };
            let map = match parser.parse(&content) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("Reload skipped, cannot parse '{}': {}", file.path.display(), e);
                    continue;
                }
            };
            let source = format!("file:{}", file.path.display());
            for (key, value) in map {
                builder = builder.put_sourced(key, value, source.clone());
            }
        }
    }
    // empty builders publish nothing; an idle tick stays silent
    builder.publish();
}
