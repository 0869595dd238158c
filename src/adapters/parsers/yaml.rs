// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML format parser.

use crate::domain::errors::{ConfigError, Result};
use crate::ports::ConfigParser;
use std::collections::HashMap;

/// Parser that converts YAML documents into flat dotted-key maps.
///
/// Nested mappings collapse to `parent.child` keys. Sequences of plain
/// scalars become a single comma-joined value (which the typed view layer
/// splits back apart); sequences holding nested structure fall back to
/// indexed keys (`parent.0.child`).
///
/// # Examples
///
/// ```
/// use layercfg::adapters::YamlParser;
/// use layercfg::ports::ConfigParser;
///
/// let parser = YamlParser::new();
/// let result = parser.parse("database:\n  host: localhost\n  port: 5432").unwrap();
/// assert_eq!(result.get("database.host"), Some(&"localhost".to_string()));
/// assert_eq!(result.get("database.port"), Some(&"5432".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    fn flatten(value: &serde_yaml::Value, prefix: &str, result: &mut HashMap<String, String>) {
        match value {
            serde_yaml::Value::Mapping(map) => {
                for (key, val) in map {
                    if let Some(key_str) = key.as_str() {
                        let child = join_key(prefix, key_str);
                        Self::flatten(val, &child, result);
                    }
                }
            }
            serde_yaml::Value::Sequence(seq) => {
                if let Some(joined) = join_scalars(seq) {
                    result.insert(prefix.to_string(), joined);
                } else {
                    for (i, val) in seq.iter().enumerate() {
                        let child = join_key(prefix, &i.to_string());
                        Self::flatten(val, &child, result);
                    }
                }
            }
            serde_yaml::Value::String(s) => {
                result.insert(prefix.to_string(), s.clone());
            }
            serde_yaml::Value::Number(n) => {
                result.insert(prefix.to_string(), n.to_string());
            }
            serde_yaml::Value::Bool(b) => {
                result.insert(prefix.to_string(), b.to_string());
            }
            serde_yaml::Value::Null => {
                result.insert(prefix.to_string(), String::new());
            }
            _ => {}
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

/// Comma-joins a sequence when every element is a plain scalar.
fn join_scalars(seq: &[serde_yaml::Value]) -> Option<String> {
    let mut parts = Vec::with_capacity(seq.len());
    for val in seq {
        let part = match val {
            serde_yaml::Value::String(s) => s.clone(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        parts.push(part);
    }
    Some(parts.join(","))
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;

        let mut result = HashMap::new();
        Self::flatten(&value, "", &mut result);
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}
