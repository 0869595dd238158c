// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer: the live configuration and its collaborators.
//!
//! This module contains the [`Configuration`] service, the builder that runs
//! the initial load sequence, the modification/event pipeline, the background
//! scheduler, the file watch loop, and the process-wide facade.

pub mod config;
pub mod event;
pub mod global;
mod loader;
pub mod schedule;
mod watch;

// Re-export commonly used types
pub use config::{Configuration, ConfigurationBuilder};
pub use event::{ChangeEvent, EventBuilder};
pub use loader::{
    KEY_LOAD_PROPERTIES, KEY_LOAD_SYSTEM_PROPERTIES, KEY_PROFILES, KEY_WATCH_DELAY,
    KEY_WATCH_ENABLED, KEY_WATCH_PERIOD,
};
pub use schedule::Scheduler;
