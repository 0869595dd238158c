// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration source plugin trait definition.
//!
//! This module defines the `ConfigSourcePlugin` trait for external sources
//! that contribute configuration after the initial load: a plugin receives
//! the live configuration view and may put, bulk-put or remove values through
//! the modification pipeline, and may register periodic work on the owning
//! configuration's scheduler.

use crate::domain::Result;
use crate::service::Configuration;

/// An external configuration source wired in through the builder registry.
///
/// Plugins are applied once, after the initial load completes, in
/// registration order. A plugin that polls a remote system would typically
/// push its first snapshot from [`apply`](ConfigSourcePlugin::apply) and call
/// [`Configuration::schedule`] to keep itself refreshed.
///
/// # Examples
///
/// ```rust
/// use layercfg::ports::ConfigSourcePlugin;
/// use layercfg::service::Configuration;
/// use layercfg::domain::Result;
///
/// struct SeedSource;
///
/// impl ConfigSourcePlugin for SeedSource {
///     fn name(&self) -> &str {
///         "seed"
///     }
///
///     fn apply(&self, config: &Configuration) -> Result<()> {
///         config.event_builder("seed").put("seed.key", "1").publish();
///         Ok(())
///     }
/// }
/// ```
pub trait ConfigSourcePlugin: Send + Sync {
    /// Short identifier used in provenance tags, logs and error messages.
    fn name(&self) -> &str;

    /// Called once with the live configuration after the initial load.
    fn apply(&self, config: &Configuration) -> Result<()>;

    /// On-demand refresh hook, invoked via
    /// [`Configuration::refresh_sources`]. The default does nothing.
    fn refresh(&self) -> Result<()> {
        Ok(())
    }
}
