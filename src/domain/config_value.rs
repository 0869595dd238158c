// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration value type with type-safe conversions.
//!
//! This module provides the `ConfigValue` type, which wraps configuration
//! values and provides type-safe conversion methods to various Rust types.

use crate::domain::errors::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A type-safe wrapper for configuration values.
///
/// `ConfigValue` stores configuration values as strings internally and
/// provides type-safe conversion methods to common Rust types. This allows
/// every configuration layer to contribute a uniform type while still
/// providing type safety at the point of use.
///
/// # Examples
///
/// ```
/// use layercfg::domain::config_value::ConfigValue;
///
/// let value = ConfigValue::new("42".to_string());
/// assert_eq!(value.as_str(), "42");
/// assert_eq!(value.as_i32("test.key").unwrap(), 42);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue(String);

impl ConfigValue {
    /// Creates a new `ConfigValue` from a `String`.
    pub fn new(value: String) -> Self {
        ConfigValue(value)
    }

    /// Returns the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the value into a `String`.
    pub fn as_string(&self) -> String {
        self.0.clone()
    }

    /// Converts the value to a boolean.
    ///
    /// Recognizes the following values (case-insensitive):
    /// - `true`: "true", "yes", "1", "on"
    /// - `false`: "false", "no", "0", "off"
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::config_value::ConfigValue;
    ///
    /// let value = ConfigValue::from("yes");
    /// assert_eq!(value.as_bool("test.key").unwrap(), true);
    /// ```
    pub fn as_bool(&self, key: &str) -> Result<bool> {
        match self.0.to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(ConfigError::invalid_bool(key.to_string(), &self.0)),
        }
    }

    /// Converts the value to an `i32`.
    pub fn as_i32(&self, key: &str) -> Result<i32> {
        self.0
            .parse::<i32>()
            .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to an `i64`.
    pub fn as_i64(&self, key: &str) -> Result<i64> {
        self.0
            .parse::<i64>()
            .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to a `u32`.
    pub fn as_u32(&self, key: &str) -> Result<u32> {
        self.0
            .parse::<u32>()
            .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to a `u64`.
    pub fn as_u64(&self, key: &str) -> Result<u64> {
        self.0
            .parse::<u64>()
            .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to an `f64`.
    pub fn as_f64(&self, key: &str) -> Result<f64> {
        self.0
            .parse::<f64>()
            .map_err(|e| ConfigError::from_parse_float_error(key.to_string(), e))
    }

    /// Converts the value to a `Duration`.
    ///
    /// Accepts humantime syntax such as `"5s"`, `"100ms"`, `"2m 30s"`, plus a
    /// bare integer which is interpreted as whole seconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::config_value::ConfigValue;
    /// use std::time::Duration;
    ///
    /// let value = ConfigValue::from("2m 30s");
    /// assert_eq!(value.as_duration("test.key").unwrap(), Duration::from_secs(150));
    ///
    /// let value = ConfigValue::from("30");
    /// assert_eq!(value.as_duration("test.key").unwrap(), Duration::from_secs(30));
    /// ```
    pub fn as_duration(&self, key: &str) -> Result<Duration> {
        if let Ok(secs) = self.0.parse::<u64>() {
            return Ok(Duration::from_secs(secs));
        }
        humantime::parse_duration(&self.0).map_err(|e| ConfigError::TypeConversion {
            key: key.to_string(),
            target_type: "duration".to_string(),
            source: Box::new(e),
        })
    }

    /// Parses the value into any type that implements `FromStr`.
    ///
    /// This covers URI types, IP addresses, enums with a `FromStr` impl, and
    /// any other parseable type.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::config_value::ConfigValue;
    /// use std::net::IpAddr;
    ///
    /// let value = ConfigValue::from("127.0.0.1");
    /// let ip: IpAddr = value.parse("test.key").unwrap();
    /// assert_eq!(ip.to_string(), "127.0.0.1");
    /// ```
    pub fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.0.parse::<T>().map_err(|e| ConfigError::TypeConversion {
            key: key.to_string(),
            target_type: std::any::type_name::<T>().to_string(),
            source: Box::new(e),
        })
    }

    /// Splits the value on commas into a list of trimmed, non-empty strings.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::config_value::ConfigValue;
    ///
    /// let value = ConfigValue::from("a, b ,, c");
    /// assert_eq!(value.as_list(), vec!["a", "b", "c"]);
    /// ```
    pub fn as_list(&self) -> Vec<String> {
        self.0
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Splits the value on commas and parses each element.
    pub fn as_list_of<T>(&self, key: &str) -> Result<Vec<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.as_list()
            .iter()
            .map(|s| {
                s.parse::<T>().map_err(|e| ConfigError::TypeConversion {
                    key: key.to_string(),
                    target_type: std::any::type_name::<T>().to_string(),
                    source: Box::new(e),
                })
            })
            .collect()
    }

    /// Splits the value on commas into an ordered set of unique strings.
    pub fn as_set(&self) -> BTreeSet<String> {
        self.as_list().into_iter().collect()
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue(s.to_string())
    }
}

impl From<ConfigValue> for String {
    fn from(value: ConfigValue) -> Self {
        value.0
    }
}

impl AsRef<str> for ConfigValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
