// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing parser and resource loader implementations.
//!
//! This module contains concrete implementations of the ports defined in the
//! ports layer: one parser per supported file format and the default
//! filesystem resource loader.

pub mod parsers;
pub mod resource;

// Re-export adapters based on feature flags
#[cfg(feature = "json")]
pub use parsers::JsonParser;
pub use parsers::PropertiesParser;
#[cfg(feature = "toml")]
pub use parsers::TomlParser;
#[cfg(feature = "yaml")]
pub use parsers::YamlParser;
pub use resource::DirResourceLoader;
