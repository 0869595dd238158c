// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration parser trait definition.
//!
//! This module defines the `ConfigParser` trait, which provides an interface
//! for parsing configuration content in different formats (properties, YAML,
//! JSON, TOML, ...).

use crate::domain::Result;
use std::collections::HashMap;

/// A trait for parsing configuration content.
///
/// A parser is a pure function from raw text to a flat key-value map.
/// Flattening nested structure into dotted keys is the parser's
/// responsibility: a YAML document
///
/// ```yaml
/// database:
///   host: localhost
///   port: 5432
/// ```
///
/// parses into `database.host` -> `"localhost"` and `database.port` ->
/// `"5432"`. The loader selects a parser by file extension and treats the
/// returned map as already flat.
///
/// # Examples
///
/// ```rust
/// use layercfg::ports::ConfigParser;
/// use layercfg::domain::Result;
/// use std::collections::HashMap;
///
/// struct MyParser;
///
/// impl ConfigParser for MyParser {
///     fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
///         Ok(HashMap::new())
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["myformat"]
///     }
/// }
/// ```
pub trait ConfigParser: Send + Sync {
    /// Parses configuration content into a flat key-value map.
    ///
    /// Structural problems the format itself rejects surface as
    /// [`ConfigError::Parse`](crate::domain::ConfigError::Parse) and are fatal
    /// at load time.
    fn parse(&self, content: &str) -> Result<HashMap<String, String>>;

    /// Returns the file extensions (without the leading dot) this parser
    /// handles.
    fn supported_extensions(&self) -> &[&str];
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestParser;

    impl ConfigParser for TestParser {
        fn parse(&self, _content: &str) -> Result<HashMap<String, String>> {
            let mut map = HashMap::new();
            map.insert("test.key".to_string(), "test.value".to_string());
            Ok(map)
        }

        fn supported_extensions(&self) -> &[&str] {
            &["test", "tst"]
        }
    }

    #[test]
    fn test_parser_parse() {
        let parser = TestParser;
        let result = parser.parse("dummy content").unwrap();
        assert_eq!(result.get("test.key"), Some(&"test.value".to_string()));
    }

    #[test]
    fn test_parser_supported_extensions() {
        let parser = TestParser;
        assert_eq!(parser.supported_extensions(), &["test", "tst"]);
    }

    #[test]
    fn test_parser_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<Box<dyn ConfigParser>>();
    }
}
