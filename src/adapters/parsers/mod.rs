// SPDX-License-Identifier: MIT OR Apache-2.0

//! Format parser implementations.
//!
//! Each parser is a pure function from raw text to a flat dotted-key map,
//! registered with the loader by file extension. The properties format is
//! always available; the structured formats sit behind feature flags.

#[cfg(feature = "json")]
pub mod json;
pub mod properties;
#[cfg(feature = "toml")]
pub mod toml;
#[cfg(feature = "yaml")]
pub mod yaml;

#[cfg(feature = "json")]
pub use self::json::JsonParser;
pub use self::properties::PropertiesParser;
#[cfg(feature = "toml")]
pub use self::toml::TomlParser;
#[cfg(feature = "yaml")]
pub use self::yaml::YamlParser;
