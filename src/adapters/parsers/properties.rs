// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties format parser.
//!
//! The default key/value format: one `key=value` (or `key: value`) pair per
//! line, `#`/`!` comments, and trailing-backslash line continuations.

use crate::domain::Result;
use crate::ports::ConfigParser;
use std::collections::HashMap;

/// Parser for the plain properties format.
///
/// # Examples
///
/// ```
/// use layercfg::adapters::PropertiesParser;
/// use layercfg::ports::ConfigParser;
///
/// let parser = PropertiesParser::new();
/// let result = parser.parse("app.name=shop\napp.port=8080\n").unwrap();
/// assert_eq!(result.get("app.name"), Some(&"shop".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertiesParser;

impl PropertiesParser {
    /// Creates a new properties parser.
    pub fn new() -> Self {
        PropertiesParser
    }
}

impl ConfigParser for PropertiesParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let mut result = HashMap::new();
        let mut pending = String::new();

        for raw_line in content.lines() {
            let line = raw_line.trim_start();
            if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }
            // trailing backslash joins the next line into one logical line
            if let Some(stripped) = line.strip_suffix('\\') {
                pending.push_str(stripped);
                continue;
            }
            pending.push_str(line);
            let logical = std::mem::take(&mut pending);

            let split = logical
                .char_indices()
                .find(|(_, c)| *c == '=' || *c == ':')
                .map(|(i, _)| i);
            if let Some(i) = split {
                let key = logical[..i].trim();
                let value = logical[i + 1..].trim();
                if !key.is_empty() {
                    result.insert(key.to_string(), value.to_string());
                }
            }
        }
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_pairs() {
        let parser = PropertiesParser::new();
        let result = parser.parse("a=1\nb=2\n").unwrap();
        assert_eq!(result.get("a"), Some(&"1".to_string()));
        assert_eq!(result.get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn test_parse_colon_separator() {
        let parser = PropertiesParser::new();
        let result = parser.parse("app.name: shop\n").unwrap();
        assert_eq!(result.get("app.name"), Some(&"shop".to_string()));
    }

    #[test]
    fn test_parse_first_separator_wins() {
        let parser = PropertiesParser::new();
        let result = parser.parse("url=http://host:8080/x\n").unwrap();
        assert_eq!(result.get("url"), Some(&"http://host:8080/x".to_string()));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let parser = PropertiesParser::new();
        let result = parser.parse("# comment\n! also comment\n\nkey=value\n").unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let parser = PropertiesParser::new();
        let result = parser.parse("  key  =  value  \n").unwrap();
        assert_eq!(result.get("key"), Some(&"value".to_string()));
    }

    #[test]
    fn test_parse_line_continuation() {
        let parser = PropertiesParser::new();
        let result = parser.parse("list=a,\\\nb,\\\nc\n").unwrap();
        assert_eq!(result.get("list"), Some(&"a,b,c".to_string()));
    }

    #[test]
    fn test_parse_empty_value() {
        let parser = PropertiesParser::new();
        let result = parser.parse("empty=\n").unwrap();
        assert_eq!(result.get("empty"), Some(&String::new()));
    }

    #[test]
    fn test_parse_line_without_separator_ignored() {
        let parser = PropertiesParser::new();
        let result = parser.parse("just some text\n").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_supported_extensions() {
        assert_eq!(PropertiesParser::new().supported_extensions(), &["properties"]);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let parser = PropertiesParser::new();
        let result = parser.parse("k=first\nk=second\n").unwrap();
        assert_eq!(result.get("k"), Some(&"second".to_string()));
    }
}
