// SPDX-License-Identifier: MIT OR Apache-2.0

//! TOML format parser.

use crate::domain::errors::{ConfigError, Result};
use crate::ports::ConfigParser;
use std::collections::HashMap;

/// Parser that converts TOML documents into flat dotted-key maps.
///
/// Tables collapse to `parent.child` keys; arrays of plain scalars become a
/// single comma-joined value, arrays of tables use indexed keys.
///
/// # Examples
///
/// ```
/// use layercfg::adapters::TomlParser;
/// use layercfg::ports::ConfigParser;
///
/// let parser = TomlParser::new();
/// let result = parser.parse("[database]\nhost = \"localhost\"\n").unwrap();
/// assert_eq!(result.get("database.host"), Some(&"localhost".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TomlParser;

impl TomlParser {
    /// Creates a new TOML parser.
    pub fn new() -> Self {
        TomlParser
    }

    fn flatten(value: &toml::Value, prefix: &str, result: &mut HashMap<String, String>) {
        match value {
            toml::Value::Table(map) => {
                for (key, val) in map {
                    let child = join_key(prefix, key);
                    Self::flatten(val, &child, result);
                }
            }
            toml::Value::Array(arr) => {
                if let Some(joined) = join_scalars(arr) {
                    result.insert(prefix.to_string(), joined);
                } else {
                    for (i, val) in arr.iter().enumerate() {
                        let child = join_key(prefix, &i.to_string());
                        Self::flatten(val, &child, result);
                    }
                }
            }
            toml::Value::String(s) => {
                result.insert(prefix.to_string(), s.clone());
            }
            toml::Value::Integer(n) => {
                result.insert(prefix.to_string(), n.to_string());
            }
            toml::Value::Float(f) => {
                result.insert(prefix.to_string(), f.to_string());
            }
            toml::Value::Boolean(b) => {
                result.insert(prefix.to_string(), b.to_string());
            }
            toml::Value::Datetime(d) => {
                result.insert(prefix.to_string(), d.to_string());
            }
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn join_scalars(arr: &[toml::Value]) -> Option<String> {
    let mut parts = Vec::with_capacity(arr.len());
    for val in arr {
        let part = match val {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(n) => n.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            _ => return None,
        };
        parts.push(part);
    }
    Some(parts.join(","))
}

impl ConfigParser for TomlParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let value: toml::Value = content.parse().map_err(|e: toml::de::Error| {
            ConfigError::Parse {
                message: format!("Failed to parse TOML: {}", e),
                source: Some(Box::new(e)),
            }
        })?;

        let mut result = HashMap::new();
        Self::flatten(&value, "", &mut result);
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["toml"]
    }
}
