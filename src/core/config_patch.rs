//! Config file templating
//!
//! Installs a config file from a template and rewrites `key = value`
//! lines in it. An existing target is always left alone: it may carry
//! user edits.

use regex::{NoExpand, Regex};
use std::path::Path;

use crate::error::StageError;
use crate::infra::filesystem;

/// Result of applying a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Target was created from the template
    Created,
    /// Target already existed and was not touched
    Kept,
}

/// Copies a template to a target and applies line substitutions
#[derive(Debug, Clone, Default)]
pub struct ConfigFilePatcher {
    substitutions: Vec<(String, String)>,
}

impl ConfigFilePatcher {
    /// Patcher with no substitutions (plain copy)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value` in the installed file
    ///
    /// Matches the first-column `key = ...` line, commented out with `;`
    /// or not, and replaces it with `key = value`.
    #[must_use]
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.substitutions.push((key.to_string(), value.to_string()));
        self
    }

    /// Keys this patcher rewrites
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.substitutions.iter().map(|(k, _)| k.as_str())
    }

    /// Rewrite `content` with every substitution
    pub fn render(&self, content: &str) -> Result<String, StageError> {
        let mut content = content.to_string();
        for (key, value) in &self.substitutions {
            let pattern = format!(r"(?mi)^;?[ \t]*{}[ \t]*=.*$", regex::escape(key));
            let re = Regex::new(&pattern).map_err(|e| StageError::InvalidSubstitution {
                key: key.clone(),
                error: e.to_string(),
            })?;
            let line = format!("{key} = {value}");
            content = re.replace_all(&content, NoExpand(&line)).into_owned();
        }
        Ok(content)
    }

    /// Install `template` at `target` unless `target` exists
    pub fn apply(&self, template: &Path, target: &Path) -> Result<PatchOutcome, StageError> {
        if target.exists() {
            tracing::info!("Found existing {}, leaving it untouched", target.display());
            return Ok(PatchOutcome::Kept);
        }
        if !template.is_file() {
            return Err(StageError::MissingTemplate {
                path: template.to_path_buf(),
            });
        }

        let content = self.render(&filesystem::read_file(template)?)?;
        filesystem::write_file_atomic_as(target, &content, template)?;
        Ok(PatchOutcome::Created)
    }
}

/// php.ini defaults applied when php.ini is first created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDefaults {
    /// `date.timezone` value
    pub timezone: Option<String>,
    /// `phar.readonly` value
    pub phar_readonly: bool,
}

impl IniDefaults {
    /// Patcher writing these defaults
    pub fn patcher(&self) -> ConfigFilePatcher {
        let mut patcher = ConfigFilePatcher::new();
        if let Some(ref tz) = self.timezone {
            patcher = patcher.set("date.timezone", tz);
        }
        patcher.set("phar.readonly", if self.phar_readonly { "1" } else { "0" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INI: &str = "[Date]\n;date.timezone =\n\n[Phar]\n; phar.readonly = On\nphar.require_hash = On\n";

    #[test]
    fn test_render_uncomments_and_sets() {
        let patcher = ConfigFilePatcher::new()
            .set("date.timezone", "Europe/Paris")
            .set("phar.readonly", "0");
        let out = patcher.render(INI).unwrap();

        assert!(out.contains("\ndate.timezone = Europe/Paris\n"));
        assert!(out.contains("\nphar.readonly = 0\n"));
        assert!(out.contains("phar.require_hash = On"));
        assert!(!out.contains(";date.timezone"));
    }

    #[test]
    fn test_render_value_is_literal() {
        let out = ConfigFilePatcher::new()
            .set("date.timezone", "$1")
            .render(INI)
            .unwrap();
        assert!(out.contains("date.timezone = $1"));
    }

    #[test]
    fn test_apply_creates_missing_target() {
        let tmp = TempDir::new().unwrap();
        let template = tmp.path().join("php.ini-development");
        let target = tmp.path().join("etc/php.ini");
        std::fs::write(&template, INI).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::Permissions::from_mode(0o644);
            std::fs::set_permissions(&template, mode).unwrap();
        }

        let outcome = ConfigFilePatcher::new()
            .set("date.timezone", "UTC")
            .apply(&template, &target)
            .unwrap();

        assert_eq!(outcome, PatchOutcome::Created);
        let content = std::fs::read_to_string(&target).unwrap();
        assert!(content.contains("date.timezone = UTC"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&target).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }

    #[test]
    fn test_apply_never_overwrites() {
        let tmp = TempDir::new().unwrap();
        let template = tmp.path().join("php.ini-development");
        let target = tmp.path().join("php.ini");
        std::fs::write(&template, INI).unwrap();
        std::fs::write(&target, "custom\n").unwrap();

        let outcome = ConfigFilePatcher::new()
            .set("date.timezone", "UTC")
            .apply(&template, &target)
            .unwrap();

        assert_eq!(outcome, PatchOutcome::Kept);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "custom\n");
    }

    #[test]
    fn test_apply_missing_template() {
        let tmp = TempDir::new().unwrap();
        let err = ConfigFilePatcher::new()
            .apply(&tmp.path().join("nope"), &tmp.path().join("php.ini"))
            .unwrap_err();
        assert!(matches!(err, StageError::MissingTemplate { .. }));
    }

    #[test]
    fn test_ini_defaults_patcher() {
        let defaults = IniDefaults {
            timezone: Some("Asia/Tokyo".into()),
            phar_readonly: false,
        };
        let patcher = defaults.patcher();
        let keys: Vec<&str> = patcher.keys().collect();
        assert_eq!(keys, vec!["date.timezone", "phar.readonly"]);

        let out = patcher.render(INI).unwrap();
        assert!(out.contains("date.timezone = Asia/Tokyo"));
        assert!(out.contains("phar.readonly = 0"));
    }
}
