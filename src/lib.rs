// SPDX-License-Identifier: MIT OR Apache-2.0

//! A layered runtime configuration engine.
//!
//! This crate gathers key/value settings from multiple layered sources
//! (bundled resources, local files, environment variables, system properties,
//! command-line supplied files, and pluggable external sources), resolves
//! embedded `${...}` expressions, exposes typed accessors, and supports live
//! mutation with change notification and optional file-based auto-reload.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types and business logic (`ConfigKey`,
//!   `ConfigValue`, `Entry`, the entry store, the expression evaluator)
//! - **Ports**: Trait definitions that define interfaces (`ConfigParser`,
//!   `ResourceLoader`, `ConfigSourcePlugin`)
//! - **Adapters**: Format parsers (properties, YAML, JSON, TOML) and the
//!   default filesystem resource loader
//! - **Service**: The live [`Configuration`](service::Configuration) that
//!   orchestrates loading, events, scheduling and file watching
//!
//! # Layered loading
//!
//! [`Configuration::builder`](service::Configuration::builder) runs a fixed,
//! documented load order where later steps override earlier ones: environment
//! bootstrap keys, bundled `application.*` resources, profile resources,
//! local files with the same base names, profile files, an external file named
//! by `props.file`/`PROPS_FILE`, indirect includes via the `load.properties`
//! key, test/localdev overrides, and finally explicit command-line file paths.
//! After loading, every value is run through the expression evaluator until it
//! stabilizes.
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML file support (default)
//! - `json`: Enable JSON file support (default)
//! - `toml`: Enable TOML file support (default)
//! - `full`: Enable all formats
//!
//! The properties format is always available.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use layercfg::prelude::*;
//!
//! # fn main() -> layercfg::domain::Result<()> {
//! let config = Configuration::builder().load()?;
//! let port = config.get_int("server.port")?;
//! config.on_change(|event| {
//!     println!("changed: {:?}", event.modified_keys());
//! });
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for
/// convenient access.
pub mod prelude {
    pub use crate::domain::{ConfigError, ConfigKey, ConfigValue, Entry, Result};
    pub use crate::ports::{ConfigParser, ConfigSourcePlugin, ResourceLoader};
    pub use crate::service::{ChangeEvent, Configuration, ConfigurationBuilder};

    pub use crate::adapters::PropertiesParser;
    #[cfg(feature = "json")]
    pub use crate::adapters::JsonParser;
    #[cfg(feature = "toml")]
    pub use crate::adapters::TomlParser;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::YamlParser;
}
