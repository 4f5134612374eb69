//! Variant directives
//!
//! A directive is what one invocation asks for: variants to enable,
//! variants to negate, and raw configure options. It is produced from
//! command-line tokens or from a persisted record and consumed by the
//! resolver.

use std::collections::BTreeSet;

use crate::core::variant::{VariantMap, VariantRegistry, VariantValue};
use crate::error::VariantError;

/// Requested variant changes for one build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantDirective {
    /// Variants to turn on, possibly with a value
    pub enabled: VariantMap,
    /// Variants explicitly negated
    pub disabled: BTreeSet<String>,
    /// Raw configure flags passed through verbatim
    pub extra_options: Vec<String>,
}

impl VariantDirective {
    /// Create an empty directive
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `+name`, `+name=value`, `-name` tokens
    ///
    /// A single token may chain several directives (`+pdo+mysql-xml`).
    /// Virtual variants known to `registry` expand to their members;
    /// negating a virtual variant negates every member.
    ///
    /// # Examples
    /// ```
    /// use phpbuild::core::directive::VariantDirective;
    /// use phpbuild::core::variant::VariantRegistry;
    ///
    /// let d = VariantDirective::parse(
    ///     &["+pdo+openssl=yes", "-xml"],
    ///     &["--without-pear".to_string()],
    ///     &VariantRegistry::builtin(),
    /// )
    /// .unwrap();
    /// assert!(d.enabled.contains_key("openssl"));
    /// assert!(d.disabled.contains("xml"));
    /// ```
    pub fn parse<S: AsRef<str>>(
        tokens: &[S],
        extra_options: &[String],
        registry: &VariantRegistry,
    ) -> Result<Self, VariantError> {
        let mut directive = Self::new();

        for token in tokens {
            let token = token.as_ref();
            for (enable, body) in split_token(token)? {
                let (name, value) = match body.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (body, None),
                };

                if name.is_empty() {
                    return Err(VariantError::EmptyName {
                        token: token.to_string(),
                    });
                }

                if !enable && value.is_some() {
                    return Err(VariantError::ValueOnDisabled {
                        token: token.to_string(),
                    });
                }

                let names: Vec<&str> = match registry.virtual_variant(name) {
                    Some(group) if value.is_none() => group.members.to_vec(),
                    _ => vec![name],
                };

                for name in names {
                    if enable {
                        directive.enable(name, value.map(str::to_string));
                    } else {
                        directive.disable(name);
                    }
                }
            }
        }

        directive.extra_options = extra_options.to_vec();
        Ok(directive)
    }

    /// Turn a variant on; a later `disable` for the same name is undone
    pub fn enable(&mut self, name: &str, value: Option<String>) {
        self.disabled.remove(name);
        let value = value.map_or(VariantValue::Flag(true), VariantValue::Value);
        self.enabled.insert(name.to_string(), value);
    }

    /// Negate a variant; an earlier `enable` for the same name is undone
    pub fn disable(&mut self, name: &str) {
        self.enabled.remove(name);
        self.disabled.insert(name.to_string());
    }

    /// Whether no variant is enabled
    pub fn has_no_enabled(&self) -> bool {
        self.enabled.values().all(|v| !v.is_enabled())
    }

    /// Whether `option` was passed verbatim
    pub fn has_extra_option(&self, option: &str) -> bool {
        self.extra_options.iter().any(|o| o == option)
    }
}

/// Split `+a+b=1-c` into `[(true, "a"), (true, "b=1"), (false, "c")]`
fn split_token(token: &str) -> Result<Vec<(bool, &str)>, VariantError> {
    let mut parts = Vec::new();
    let mut rest = token.trim();

    if rest.is_empty() {
        return Err(VariantError::InvalidToken {
            token: token.to_string(),
        });
    }

    while !rest.is_empty() {
        let enable = match rest.as_bytes()[0] {
            b'+' => true,
            b'-' => false,
            _ => {
                return Err(VariantError::InvalidToken {
                    token: token.to_string(),
                })
            }
        };
        rest = &rest[1..];

        // A value may itself contain '-' (paths, versions), so once '=' is
        // seen the remainder up to the next '+' belongs to the value.
        let end = {
            let next_plus = rest.find('+');
            let eq = rest.find('=');
            let next_minus = rest.find('-');
            match (eq, next_minus) {
                (Some(e), Some(m)) if e < m => next_plus,
                (_, Some(m)) => Some(next_plus.map_or(m, |p| p.min(m))),
                _ => next_plus,
            }
        }
        .unwrap_or(rest.len());

        parts.push((enable, &rest[..end]));
        rest = &rest[end..];
    }

    Ok(parts)
}
