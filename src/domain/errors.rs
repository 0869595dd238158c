// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! This module defines the error types that can occur when loading, parsing,
//! or accessing configuration values. All errors use `thiserror` for proper
//! error handling and conversion.

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// The main error type for configuration operations.
///
/// This enum represents all possible errors that can occur when loading,
/// parsing, or accessing configuration values. It is marked as
/// `#[non_exhaustive]` to allow for future additions without breaking
/// backwards compatibility.
///
/// # Examples
///
/// ```
/// use layercfg::domain::errors::ConfigError;
///
/// fn get_config_value() -> Result<String, ConfigError> {
///     Err(ConfigError::RequiredKeyMissing {
///         key: "database.host".to_string(),
///     })
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required configuration key has no value in any layer.
    ///
    /// The key is the full dotted key, including any `for_path` prefix the
    /// sub-view was created with.
    #[error("Required configuration key is missing: {key}")]
    RequiredKeyMissing {
        /// The full dotted key that was not found
        key: String,
    },

    /// Failed to convert a configuration value to the requested type.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversion {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse a configuration file or value.
    #[error("Failed to parse configuration: {message}")]
    Parse {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An explicitly requested file has an extension with no registered parser.
    #[error("No parser registered for configuration file: {path}")]
    UnknownExtension {
        /// The path that could not be interpreted
        path: String,
    },

    /// An error occurred in a configuration source plugin.
    #[error("Configuration source '{source_name}' error: {message}")]
    Source {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error occurred in the file watch loop or scheduler.
    #[error("Configuration watch error: {message}")]
    Watch {
        /// The error message
        message: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a `TypeConversion` error from a `ParseIntError`.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        ConfigError::TypeConversion {
            key,
            target_type: "integer".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a `TypeConversion` error from a `ParseFloatError`.
    pub fn from_parse_float_error(key: String, err: ParseFloatError) -> Self {
        ConfigError::TypeConversion {
            key,
            target_type: "float".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a `TypeConversion` error for an unrecognized boolean value.
    pub fn invalid_bool(key: String, value: &str) -> Self {
        ConfigError::TypeConversion {
            key,
            target_type: "boolean".to_string(),
            source: format!("unrecognized boolean value '{value}'").into(),
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
