// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON format parser.

use crate::domain::errors::{ConfigError, Result};
use crate::ports::ConfigParser;
use std::collections::HashMap;

/// Parser that converts JSON documents into flat dotted-key maps.
///
/// Nested objects collapse to `parent.child` keys; arrays of plain scalars
/// become a single comma-joined value, arrays with nested structure use
/// indexed keys.
///
/// # Examples
///
/// ```
/// use layercfg::adapters::JsonParser;
/// use layercfg::ports::ConfigParser;
///
/// let parser = JsonParser::new();
/// let result = parser.parse(r#"{"database": {"host": "localhost"}}"#).unwrap();
/// assert_eq!(result.get("database.host"), Some(&"localhost".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonParser;

impl JsonParser {
    /// Creates a new JSON parser.
    pub fn new() -> Self {
        JsonParser
    }

    fn flatten(value: &serde_json::Value, prefix: &str, result: &mut HashMap<String, String>) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map {
                    let child = join_key(prefix, key);
                    Self::flatten(val, &child, result);
                }
            }
            serde_json::Value::Array(arr) => {
                if let Some(joined) = join_scalars(arr) {
                    result.insert(prefix.to_string(), joined);
                } else {
                    for (i, val) in arr.iter().enumerate() {
                        let child = join_key(prefix, &i.to_string());
                        Self::flatten(val, &child, result);
                    }
                }
            }
            serde_json::Value::String(s) => {
                result.insert(prefix.to_string(), s.clone());
            }
            serde_json::Value::Number(n) => {
                result.insert(prefix.to_string(), n.to_string());
            }
            serde_json::Value::Bool(b) => {
                result.insert(prefix.to_string(), b.to_string());
            }
            serde_json::Value::Null => {
                result.insert(prefix.to_string(), String::new());
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

fn join_scalars(arr: &[serde_json::Value]) -> Option<String> {
    let mut parts = Vec::with_capacity(arr.len());
    for val in arr {
        let part = match val {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        parts.push(part);
    }
    Some(parts.join(","))
}

impl ConfigParser for JsonParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse {
                message: format!("Failed to parse JSON: {}", e),
                source: Some(Box::new(e)),
            })?;

        let mut result = HashMap::new();
        Self::flatten(&value, "", &mut result);
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}
