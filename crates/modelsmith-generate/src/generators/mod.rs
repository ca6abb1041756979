//! Value generators for common property and parameter types.
//!
//! Primitive generators match on type alone. Semantic generators also look
//! at the reference name and run at a higher priority, so a `String`
//! property called `email` gets an address instead of a random word.

pub mod primitives;
pub mod semantic;

use modelsmith_core::{BuildError, ConfigurationBuilder};

/// Priority of generators that match on type only.
pub const PRIMITIVE_PRIORITY: i32 = 0;
/// Priority of generators that match on type and reference name.
pub const SEMANTIC_PRIORITY: i32 = 100;

/// Adds every primitive and semantic generator.
pub fn register(builder: ConfigurationBuilder) -> ConfigurationBuilder {
    let builder = primitives::register(builder);
    semantic::register(builder)
}

pub(crate) fn generator_error(id: &str, message: impl Into<String>) -> BuildError {
    BuildError::Generator {
        id: id.to_string(),
        message: message.into(),
    }
}

/// Lowercase ASCII letters and digits of `value`.
pub(crate) fn slugify(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .flat_map(|ch| ch.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_keeps_ascii_alphanumerics() {
        assert_eq!(slugify("O'Conner"), "oconner");
        assert_eq!(slugify("Mary Ann 2"), "maryann2");
    }
}
