// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration key newtype for type-safe key handling.
//!
//! This module provides the `ConfigKey` type, a newtype wrapper around
//! `String` that provides type safety for configuration keys, plus the
//! canonical environment-variable mapping used for runtime override lookup.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A type-safe wrapper for configuration keys.
///
/// `ConfigKey` is a newtype that wraps a `String` to provide type safety when
/// working with configuration keys. Keys use dot notation for nested
/// structure, e.g. `database.host`.
///
/// # Examples
///
/// ```
/// use layercfg::domain::config_key::ConfigKey;
///
/// let key = ConfigKey::from("database.host");
/// assert_eq!(key.as_str(), "database.host");
/// assert_eq!(key.as_env_key(), "DATABASE_HOST");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the conventional environment-variable name for this key.
    ///
    /// The mapping is: uppercase, dots become underscores, hyphens are
    /// removed. This is the transform used when looking up runtime overrides
    /// for a key that has no explicitly configured value.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::config_key::ConfigKey;
    ///
    /// let key = ConfigKey::from("my-app.fetch.timeout");
    /// assert_eq!(key.as_env_key(), "MYAPP_FETCH_TIMEOUT");
    /// ```
    pub fn as_env_key(&self) -> String {
        self.0
            .chars()
            .filter(|c| *c != '-')
            .map(|c| if c == '.' { '_' } else { c.to_ascii_uppercase() })
            .collect()
    }
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Hash for ConfigKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
