// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource loading trait definition.
//!
//! This module defines the `ResourceLoader` trait, the injectable strategy
//! that maps a logical resource name (e.g. `application.yaml`) to its
//! contents. It is the bundled-resource analog of a classpath lookup; the
//! core never hardcodes where resources come from.

/// A strategy for resolving logical resource names to their contents.
///
/// The initial loader probes conventional resource names through this trait.
/// A missing resource is simply `None`; it is never an error, because most of
/// the probed candidate names will not exist.
///
/// # Examples
///
/// ```rust
/// use layercfg::ports::ResourceLoader;
///
/// struct StaticResources;
///
/// impl ResourceLoader for StaticResources {
///     fn read(&self, resource_name: &str) -> Option<String> {
///         (resource_name == "application.properties")
///             .then(|| "app.name=embedded".to_string())
///     }
/// }
/// ```
pub trait ResourceLoader: Send + Sync {
    /// Returns the contents of the named resource, or `None` when it does not
    /// exist or cannot be read.
    fn read(&self, resource_name: &str) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestLoader;

    impl ResourceLoader for TestLoader {
        fn read(&self, resource_name: &str) -> Option<String> {
            (resource_name == "present").then(|| "content".to_string())
        }
    }

    #[test]
    fn test_read_present() {
        assert_eq!(TestLoader.read("present"), Some("content".to_string()));
    }

    #[test]
    fn test_read_missing_is_none() {
        assert_eq!(TestLoader.read("absent"), None);
    }

    #[test]
    fn test_loader_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<Box<dyn ResourceLoader>>();
    }
}
