//! Ready-made value generators for `modelsmith-core`.
//!
//! [`default_builder`] returns a configuration builder with the sequence and
//! default type creators plus every generator in [`generators`]. Callers add
//! their own blueprints and rules on top and build as usual.

pub mod generators;

use modelsmith_core::{ConfigurationBuilder, creators};

/// Configuration builder with all bundled creators and generators.
pub fn default_builder() -> ConfigurationBuilder {
    tracing::debug!("registering bundled type creators and value generators");
    creators::register(generators::register(ConfigurationBuilder::new()))
}
