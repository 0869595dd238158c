// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide system-property table.
//!
//! Applications and tests can set properties here that override configuration
//! values at runtime. The table sits above environment variables in the
//! override lookup order and is the export target when
//! `config.load.systemProperties` is enabled.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

static TABLE: Lazy<RwLock<HashMap<String, String>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Returns the system property for `key`, if set.
pub fn get(key: &str) -> Option<String> {
    TABLE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
}

/// Sets a system property, returning the previous value if any.
pub fn set(key: impl Into<String>, value: impl Into<String>) -> Option<String> {
    TABLE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key.into(), value.into())
}

/// Removes a system property, returning the removed value if any.
pub fn remove(key: &str) -> Option<String> {
    TABLE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(key)
}

/// True when a system property is set for `key`.
pub fn contains(key: &str) -> bool {
    TABLE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(key)
}

/// Bulk-exports entries into the table, without overwriting existing
/// properties.
///
/// Used by the initial loader when `config.load.systemProperties` is true:
/// explicitly set properties keep priority over loaded configuration.
pub fn export<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) {
    let mut table = TABLE.write().unwrap_or_else(PoisonError::into_inner);
    for (key, value) in entries {
        table
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // keys are namespaced per test; the table is process-global

    #[test]
    fn test_set_get_remove() {
        assert_eq!(get("sysprops.test.a"), None);
        set("sysprops.test.a", "1");
        assert_eq!(get("sysprops.test.a"), Some("1".to_string()));
        assert!(contains("sysprops.test.a"));
        assert_eq!(remove("sysprops.test.a"), Some("1".to_string()));
        assert_eq!(get("sysprops.test.a"), None);
    }

    #[test]
    fn test_set_returns_previous() {
        set("sysprops.test.b", "old");
        assert_eq!(set("sysprops.test.b", "new"), Some("old".to_string()));
        assert_eq!(get("sysprops.test.b"), Some("new".to_string()));
        remove("sysprops.test.b");
    }

    #[test]
    fn test_export_does_not_overwrite() {
        set("sysprops.test.c", "explicit");
        export([("sysprops.test.c", "loaded"), ("sysprops.test.d", "loaded")]);
        assert_eq!(get("sysprops.test.c"), Some("explicit".to_string()));
        assert_eq!(get("sysprops.test.d"), Some("loaded".to_string()));
        remove("sysprops.test.c");
        remove("sysprops.test.d");
    }
}
