// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default filesystem resource loader.
//!
//! This module provides the default [`ResourceLoader`] implementation, which
//! maps logical resource names onto files under one or more base directories.
//! It is the filesystem stand-in for a bundled-resource (classpath-style)
//! lookup.

use crate::ports::ResourceLoader;
use std::fs;
use std::path::PathBuf;

/// Resource loader backed by a list of base directories.
///
/// Directories are probed in order; the first readable match wins. Missing
/// files are not an error, they simply contribute nothing.
///
/// # Examples
///
/// ```rust,no_run
/// use layercfg::adapters::DirResourceLoader;
/// use layercfg::ports::ResourceLoader;
///
/// let loader = DirResourceLoader::new(["resources", "."]);
/// let content = loader.read("application.yaml");
/// ```
#[derive(Debug, Clone)]
pub struct DirResourceLoader {
    dirs: Vec<PathBuf>,
}

impl DirResourceLoader {
    /// Creates a loader probing the given directories in order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        DirResourceLoader {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }
}

impl ResourceLoader for DirResourceLoader {
    fn read(&self, resource_name: &str) -> Option<String> {
        for dir in &self.dirs {
            let candidate = dir.join(resource_name);
            if !candidate.is_file() {
                continue;
            }
            match fs::read_to_string(&candidate) {
                Ok(content) => return Some(content),
                Err(e) => {
                    tracing::debug!(
                        "Unable to read resource '{}': {}",
                        candidate.display(),
                        e
                    );
                }
            }
        }
        None
    }
}
