//! Global configuration management
//!
//! Reads settings from `config.toml` in the config directory. Every key
//! is optional; a missing file yields the built-in behavior.

use crate::config::urls::PHP_DISTRIBUTIONS;
use crate::core::config_patch::IniDefaults;
use crate::core::resolver::{MandatoryPrecedence, ResolverPolicy};
use crate::core::variant::{VariantMap, VariantValue};
use crate::infra::dirs::PhpbuildDirs;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for phpbuild
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalConfig {
    /// Default build options
    #[serde(default)]
    pub build: BuildConfig,

    /// Variant policy
    #[serde(default)]
    pub variants: VariantsConfig,

    /// php.ini defaults
    #[serde(default)]
    pub php: PhpConfig,

    /// Download settings
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Default build options
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildConfig {
    /// Default number of parallel jobs
    pub jobs: Option<usize>,

    /// Default scheduling priority for compiling
    pub nice: Option<i32>,

    /// Use the production php.ini by default
    pub production: Option<bool>,
}

/// Variant policy settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantsConfig {
    /// Replacement for the implicit default set (`name` or `name=value`)
    pub defaults: Option<Vec<String>>,

    /// Whether a negation may remove a version-mandatory variant
    pub mandatory_precedence: Option<MandatoryPrecedence>,
}

/// php.ini settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhpConfig {
    /// `date.timezone`; falls back to `$TZ`
    pub timezone: Option<String>,

    /// `phar.readonly`; off unless set
    pub phar_readonly: Option<bool>,
}

/// Download settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadConfig {
    /// Distribution mirror base URL
    pub mirror: Option<String>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// If the config file doesn't exist, returns default configuration.
    /// If the config file exists but is invalid, returns an error.
    pub fn load(dirs: &PhpbuildDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Get the effective distribution mirror
    #[must_use]
    pub fn mirror(&self) -> &str {
        self.download.mirror.as_deref().unwrap_or(PHP_DISTRIBUTIONS)
    }

    /// Resolver policy with config overrides applied
    #[must_use]
    pub fn resolver_policy(&self) -> ResolverPolicy {
        let mut policy = ResolverPolicy::builtin();
        if let Some(ref defaults) = self.variants.defaults {
            policy = policy.with_implicit_defaults(parse_variant_list(defaults));
        }
        if let Some(precedence) = self.variants.mandatory_precedence {
            policy = policy.with_mandatory_precedence(precedence);
        }
        policy
    }

    /// php.ini defaults, with `$TZ` as the timezone fallback
    #[must_use]
    pub fn ini_defaults(&self) -> IniDefaults {
        let timezone = self
            .php
            .timezone
            .clone()
            .or_else(|| std::env::var("TZ").ok())
            .filter(|tz| !tz.trim().is_empty());
        IniDefaults {
            timezone,
            phar_readonly: self.php.phar_readonly.unwrap_or(false),
        }
    }
}

/// Parse `["json", "openssl=yes"]` into a variant map
fn parse_variant_list(entries: &[String]) -> VariantMap {
    entries
        .iter()
        .map(|entry| {
            let entry = entry.trim().trim_start_matches('+');
            match entry.split_once('=') {
                Some((name, value)) => (name.to_string(), VariantValue::Value(value.to_string())),
                None => (entry.to_string(), VariantValue::Flag(true)),
            }
        })
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert!(config.build.jobs.is_none());
        assert!(config.variants.defaults.is_none());
        assert_eq!(config.mirror(), PHP_DISTRIBUTIONS);
        assert_eq!(
            config.resolver_policy().mandatory_precedence,
            MandatoryPrecedence::Enforce
        );
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config = GlobalConfig::load_from_path(&config_path).unwrap();
        assert!(config.download.mirror.is_none());
    }

    #[test]
    fn test_load_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let content = r#"
[build]
jobs = 6

[variants]
defaults = ["json", "+openssl=yes"]
mandatory_precedence = "user"

[php]
timezone = "Europe/Berlin"

[download]
mirror = "https://mirror.example.com/php/"
"#;
        fs::write(&config_path, content).unwrap();

        let config = GlobalConfig::load_from_path(&config_path).unwrap();
        assert_eq!(config.build.jobs, Some(6));
        assert_eq!(config.mirror(), "https://mirror.example.com/php/");

        let policy = config.resolver_policy();
        assert_eq!(policy.mandatory_precedence, MandatoryPrecedence::User);
        assert_eq!(policy.implicit_defaults.len(), 2);
        assert_eq!(
            policy.implicit_defaults.get("openssl"),
            Some(&VariantValue::Value("yes".into()))
        );

        let ini = config.ini_defaults();
        assert_eq!(ini.timezone.as_deref(), Some("Europe/Berlin"));
        assert!(!ini.phar_readonly);
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(&config_path, "invalid toml [[[").unwrap();

        let result = GlobalConfig::load_from_path(&config_path);
        assert!(matches!(result, Err(GlobalConfigError::ParseError { .. })));
    }

    #[test]
    fn test_unknown_precedence_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[variants]\nmandatory_precedence = \"always\"\n").unwrap();

        assert!(GlobalConfig::load_from_path(&config_path).is_err());
    }

    #[test]
    fn test_load_every_section() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[build]
jobs = 8
nice = 10
production = true

[variants]
defaults = ["xml"]
mandatory_precedence = "user"

[php]
timezone = "UTC"
phar_readonly = true
"#,
        )
        .unwrap();

        let loaded = GlobalConfig::load_from_path(&config_path).unwrap();

        assert_eq!(loaded.build.jobs, Some(8));
        assert_eq!(loaded.build.nice, Some(10));
        assert_eq!(loaded.build.production, Some(true));
        assert_eq!(loaded.variants.defaults, Some(vec!["xml".to_string()]));
        assert_eq!(
            loaded.variants.mandatory_precedence,
            Some(MandatoryPrecedence::User)
        );
        assert!(loaded.ini_defaults().phar_readonly);
        assert_eq!(loaded.mirror(), PHP_DISTRIBUTIONS);
    }
}
