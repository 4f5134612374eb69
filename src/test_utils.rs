//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::variant::VariantRegistry;

    /// Generate a `X.Y.Z` PHP version string, optionally `php-` prefixed
    pub fn php_version() -> impl Strategy<Value = String> {
        (5u32..9, 0u32..7, 0u32..40, any::<bool>()).prop_map(|(major, minor, patch, prefixed)| {
            let v = format!("{major}.{minor}.{patch}");
            if prefixed {
                format!("php-{v}")
            } else {
                v
            }
        })
    }

    /// Generate a variant name known to the built-in registry
    pub fn known_variant() -> impl Strategy<Value = String> {
        let names: Vec<String> = VariantRegistry::builtin()
            .variants()
            .iter()
            .map(|v| v.name.to_string())
            .collect();
        prop::sample::select(names)
    }

    /// Generate a single `+name`, `+name=value` or `-name` token
    pub fn directive_token() -> impl Strategy<Value = String> {
        (
            known_variant(),
            any::<bool>(),
            prop::option::of("[a-z0-9/]{1,12}"),
        )
            .prop_map(|(name, enable, value)| match (enable, value) {
                (true, Some(v)) => format!("+{name}={v}"),
                (true, None) => format!("+{name}"),
                (false, _) => format!("-{name}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::core::version::PhpVersion;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_php_version_generator(version in php_version()) {
            prop_assert!(PhpVersion::parse(&version).is_ok());
        }

        #[test]
        fn test_directive_token_generator(token in directive_token()) {
            prop_assert!(token.starts_with('+') || token.starts_with('-'));
            prop_assert!(token.len() > 1);
        }
    }
}
