// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide default configuration instance.
//!
//! A lazily-initialized, thread-safe holder for one shared [`Configuration`].
//! The instance-based API stays fully independent: the facade only wraps a
//! configuration built by the default builder (or one injected explicitly
//! before first use).

use crate::domain::{ConfigError, Result};
use crate::service::Configuration;
use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock};

static GLOBAL: Lazy<RwLock<Option<Configuration>>> = Lazy::new(|| RwLock::new(None));

/// Returns the shared configuration, loading it with the default builder on
/// first use.
///
/// # Panics
///
/// Panics when the lazy initial load fails; use [`try_instance`] to handle
/// load errors explicitly.
pub fn instance() -> Configuration {
    match try_instance() {
        Ok(config) => config,
        Err(e) => panic!("failed to load default configuration: {e}"),
    }
}

/// Returns the shared configuration, loading it on first use.
pub fn try_instance() -> Result<Configuration> {
    {
        let global = GLOBAL.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(config) = global.as_ref() {
            return Ok(config.clone());
        }
    }
    let mut global = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(config) = global.as_ref() {
        return Ok(config.clone());
    }
    let config = Configuration::builder().load()?;
    *global = Some(config.clone());
    Ok(config)
}

/// Installs an explicitly built configuration as the shared instance.
///
/// Fails when a shared instance already exists (whether injected or lazily
/// loaded); the facade never silently swaps a live configuration.
pub fn try_init_with(config: Configuration) -> Result<()> {
    let mut global = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if global.is_some() {
        return Err(ConfigError::Source {
            source_name: "global".to_string(),
            message: "default configuration is already initialized".to_string(),
            source: None,
        });
    }
    *global = Some(config);
    Ok(())
}

/// True when the shared instance has been created.
pub fn is_initialized() -> bool {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}
