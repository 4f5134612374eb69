//! Variant resolution
//!
//! Merges a base variant map, variants inherited from an earlier build,
//! and the variants requested on this invocation into one map. Ties are
//! settled only by the fixed precedence below, never by iteration order:
//!
//! 1. implicit defaults, when the requested directive enables nothing
//! 2. version-mandatory variants
//! 3. the project-wide default variant, unless its opt-out option is given
//! 4. inherited variants
//! 5. requested variants
//! 6. requested negations, recorded in [`Resolution::removed`]
//!
//! Steps 1 and 3 only fill a fresh map. A non-empty base is an earlier
//! resolution and already reflects them, which makes resolution a fixed
//! point when no new directives are supplied.

use semver::VersionReq;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::defaults;
use crate::core::directive::VariantDirective;
use crate::core::variant::{VariantAdvice, VariantMap, VariantRegistry, VariantValue};
use crate::core::version::{parse_range, PhpVersion};
use crate::error::VersionError;

/// Who wins when a user negates a version-mandatory variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MandatoryPrecedence {
    /// The mandatory variant stays enabled; the negation is reported
    #[default]
    Enforce,
    /// The user's negation removes the mandatory variant
    User,
}

/// A variant that must be enabled for a version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MandatoryRule {
    /// Versions the rule applies to
    pub range: VersionReq,
    /// Variant to enable
    pub variant: String,
    /// Shown to the user when the rule fires
    pub reason: String,
}

impl MandatoryRule {
    /// Create a rule from a range string
    pub fn new(range: &str, variant: &str, reason: &str) -> Result<Self, VersionError> {
        Ok(Self {
            range: parse_range(range)?,
            variant: variant.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// Policy inputs to resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverPolicy {
    /// Baseline set applied when nothing is requested
    pub implicit_defaults: VariantMap,
    /// Version-mandatory variants
    pub mandatory: Vec<MandatoryRule>,
    /// Variant enabled everywhere, and the raw option that opts out of it
    pub project_default: Option<(String, String)>,
    /// Mandatory-vs-negation precedence
    pub mandatory_precedence: MandatoryPrecedence,
}

impl ResolverPolicy {
    /// The stock PHP policy
    pub fn builtin() -> Self {
        let implicit_defaults = defaults::DEFAULT_VARIANTS
            .iter()
            .map(|(name, value)| {
                let value = value.map_or(VariantValue::Flag(true), |v| VariantValue::Value(v.to_string()));
                ((*name).to_string(), value)
            })
            .collect();

        // The range literal is fixed, so the parse cannot fail.
        let mandatory = MandatoryRule::new(">=5.3.0, <5.4.0", "intl", "PHP 5.3 requires +intl")
            .into_iter()
            .collect();

        Self {
            implicit_defaults,
            mandatory,
            project_default: Some((
                defaults::PROJECT_DEFAULT_VARIANT.to_string(),
                defaults::PROJECT_DEFAULT_OPT_OUT.to_string(),
            )),
            mandatory_precedence: MandatoryPrecedence::Enforce,
        }
    }

    /// Replace the implicit default set
    #[must_use]
    pub fn with_implicit_defaults(mut self, defaults: VariantMap) -> Self {
        self.implicit_defaults = defaults;
        self
    }

    /// Set mandatory-vs-negation precedence
    #[must_use]
    pub fn with_mandatory_precedence(mut self, precedence: MandatoryPrecedence) -> Self {
        self.mandatory_precedence = precedence;
        self
    }
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}

/// User-visible finding produced during resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Implicit defaults were applied
    DefaultsApplied { variants: Vec<String> },
    /// A version-mandatory variant was enabled
    MandatoryEnabled { variant: String, reason: String },
    /// A negation of a mandatory variant was overridden
    MandatoryKept { variant: String, reason: String },
    /// Registry advice (unknown names, conflicts, requirements)
    Advice(VariantAdvice),
}

impl Notice {
    /// Whether the notice deserves warning level
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::MandatoryKept { .. } | Self::Advice(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultsApplied { variants } => write!(
                f,
                "No '+' variant was given. A default set will be installed: [{}]",
                variants.join(", ")
            ),
            Self::MandatoryEnabled { variant, reason } => write!(f, "{reason}, enabled +{variant}"),
            Self::MandatoryKept { variant, reason } => {
                write!(f, "{reason}, ignoring -{variant}")
            }
            Self::Advice(advice) => fmt::Display::fmt(advice, f),
        }
    }
}

/// Outcome of resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Final variant map
    pub variants: VariantMap,
    /// Variants removed by explicit negation
    pub removed: BTreeSet<String>,
    /// Raw configure options: inherited first, then requested, without repeats
    pub extra_options: Vec<String>,
    /// Notices to show the user
    pub notices: Vec<Notice>,
}

/// Merges variant sources according to a policy
#[derive(Debug, Clone, Copy)]
pub struct VariantResolver<'a> {
    registry: &'a VariantRegistry,
    policy: &'a ResolverPolicy,
}

impl<'a> VariantResolver<'a> {
    /// Create a resolver over a registry and policy
    pub fn new(registry: &'a VariantRegistry, policy: &'a ResolverPolicy) -> Self {
        Self { registry, policy }
    }

    /// Resolve the variant set for `version`
    pub fn resolve(
        &self,
        version: &PhpVersion,
        base: &VariantMap,
        inherited: Option<&VariantDirective>,
        requested: &VariantDirective,
    ) -> Resolution {
        let mut variants = base.clone();
        let mut notices = Vec::new();
        let fresh = base.is_empty();

        // 1. implicit defaults
        if fresh && requested.has_no_enabled() {
            for (name, value) in &self.policy.implicit_defaults {
                variants.insert(name.clone(), value.clone());
            }
            notices.push(Notice::DefaultsApplied {
                variants: self.policy.implicit_defaults.keys().cloned().collect(),
            });
        }

        // 2. version-mandatory variants
        let mandatory: Vec<&MandatoryRule> = self
            .policy
            .mandatory
            .iter()
            .filter(|rule| version.matches(&rule.range))
            .collect();
        for rule in &mandatory {
            if !variants.get(&rule.variant).is_some_and(VariantValue::is_enabled) {
                variants.insert(rule.variant.clone(), VariantValue::Flag(true));
            }
            notices.push(Notice::MandatoryEnabled {
                variant: rule.variant.clone(),
                reason: rule.reason.clone(),
            });
        }

        // 3. project-wide default
        if let Some((variant, opt_out)) = &self.policy.project_default {
            let opted_out = requested.has_extra_option(opt_out)
                || inherited.is_some_and(|d| d.has_extra_option(opt_out));
            if fresh && !opted_out {
                variants
                    .entry(variant.clone())
                    .or_insert(VariantValue::Flag(true));
            }
        }

        let enforced = |name: &str| {
            self.policy.mandatory_precedence == MandatoryPrecedence::Enforce
                && mandatory.iter().any(|r| r.variant == name)
        };

        // 4. inherited
        if let Some(inherited) = inherited {
            for (name, value) in &inherited.enabled {
                variants.insert(name.clone(), value.clone());
            }
            for name in inherited.disabled.iter().filter(|n| !enforced(n.as_str())) {
                variants.remove(name);
            }
        }

        // 5. requested; an explicit `false` counts as a negation
        let mut negations: BTreeSet<String> = requested.disabled.clone();
        for (name, value) in &requested.enabled {
            if value.is_enabled() {
                variants.insert(name.clone(), value.clone());
            } else {
                negations.insert(name.clone());
            }
        }

        // 6. negations
        let mut removed = BTreeSet::new();
        for name in negations {
            match mandatory.iter().find(|r| r.variant == name) {
                Some(rule) if enforced(&name) => {
                    notices.push(Notice::MandatoryKept {
                        variant: name,
                        reason: rule.reason.clone(),
                    });
                }
                _ => {
                    variants.remove(&name);
                    removed.insert(name);
                }
            }
        }

        notices.extend(self.registry.check(&variants).into_iter().map(Notice::Advice));

        Resolution {
            variants,
            removed,
            extra_options: merge_options(inherited, requested),
            notices,
        }
    }
}

fn merge_options(inherited: Option<&VariantDirective>, requested: &VariantDirective) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    let sources = inherited
        .map(|d| d.extra_options.as_slice())
        .unwrap_or_default()
        .iter()
        .chain(&requested.extra_options);
    for option in sources {
        if !options.contains(option) {
            options.push(option.clone());
        }
    }
    options
}
