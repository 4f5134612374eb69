//! Platform-specific directory management
//!
//! Provides the phpbuild home layout and the config directory.
//!
//! Environment variables can override default directories:
//! - `PHPBUILD_HOME` - Override the home root (builds, installs, downloads)
//! - `PHPBUILD_CONFIG_DIR` - Override config directory

use std::env;
use std::path::PathBuf;

/// Environment variable names for directory overrides
pub const ENV_HOME: &str = "PHPBUILD_HOME";
pub const ENV_CONFIG_DIR: &str = "PHPBUILD_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "phpbuild";

/// Subdirectory names
const BUILD_SUBDIR: &str = "build";
const INSTALL_SUBDIR: &str = "php";
const DISTFILES_SUBDIR: &str = "distfiles";

/// Directory provider for phpbuild
///
/// Every install prefix lives under `<home>/php/<alias>`, every source
/// tree under `<home>/build`, and downloaded archives under
/// `<home>/distfiles`.
#[derive(Debug, Clone)]
pub struct PhpbuildDirs {
    home: PathBuf,
    config_dir: PathBuf,
}

impl PhpbuildDirs {
    /// Create a new `PhpbuildDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            home: Self::resolve_home(),
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Create an instance rooted at explicit paths
    #[must_use]
    pub fn with_paths(home: PathBuf, config_dir: PathBuf) -> Self {
        Self { home, config_dir }
    }

    /// Get the home root
    #[must_use]
    pub fn home(&self) -> PathBuf {
        self.home.clone()
    }

    /// Get the config directory path
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Default parent of extracted source trees
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.home.join(BUILD_SUBDIR)
    }

    /// Parent of all install prefixes
    #[must_use]
    pub fn install_root(&self) -> PathBuf {
        self.home.join(INSTALL_SUBDIR)
    }

    /// Install prefix for a named build
    #[must_use]
    pub fn install_prefix(&self, alias: &str) -> PathBuf {
        self.install_root().join(alias)
    }

    /// Shared download cache
    #[must_use]
    pub fn distfiles_dir(&self) -> PathBuf {
        self.home.join(DISTFILES_SUBDIR)
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    fn resolve_home() -> PathBuf {
        if let Ok(path) = env::var(ENV_HOME) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| h.join(format!(".{APP_NAME}")))
            .unwrap_or_else(|| PathBuf::from(".").join(format!(".{APP_NAME}")))
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for PhpbuildDirs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_new_creates_instance() {
        let dirs = PhpbuildDirs::new();
        assert!(!dirs.home().as_os_str().is_empty());
        assert!(!dirs.config_dir().as_os_str().is_empty());
    }

    #[test]
    fn test_layout_is_under_home() {
        let dirs = PhpbuildDirs::with_paths(PathBuf::from("/h"), PathBuf::from("/c"));
        assert_eq!(dirs.build_dir(), PathBuf::from("/h/build"));
        assert_eq!(dirs.install_root(), PathBuf::from("/h/php"));
        assert_eq!(dirs.distfiles_dir(), PathBuf::from("/h/distfiles"));
    }

    #[test]
    fn test_install_prefix_uses_alias() {
        let dirs = PhpbuildDirs::with_paths(PathBuf::from("/h"), PathBuf::from("/c"));
        assert_eq!(dirs.install_prefix("5.4-dev"), PathBuf::from("/h/php/5.4-dev"));
    }

    #[test]
    fn test_global_config_path_is_under_config_dir() {
        let dirs = PhpbuildDirs::new();
        assert!(dirs.global_config_path().starts_with(dirs.config_dir()));
        assert!(dirs.global_config_path().ends_with("config.toml"));
    }
}
