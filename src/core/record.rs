//! Persisted variant record
//!
//! Each install prefix holds a `phpbuild.variants` file recording the
//! resolved variants, the negated ones and the raw configure options.
//! A later `install --like <build>` reads it back as an inherited
//! directive. The record is advisory: a missing or unreadable file means
//! "nothing to inherit", never a failed install.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::defaults::VARIANT_RECORD_FILE;
use crate::core::descriptor::validate_build_name;
use crate::core::directive::VariantDirective;
use crate::core::variant::VariantMap;
use crate::error::RecordError;
use crate::infra::filesystem;

/// On-disk form of a build's variant configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Variants enabled in the build
    #[serde(default)]
    pub enabled_variants: VariantMap,
    /// Variants negated when the build was resolved
    #[serde(default)]
    pub disabled_variants: BTreeSet<String>,
    /// Raw configure options
    #[serde(default)]
    pub extra_options: Vec<String>,
}

impl VariantRecord {
    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl From<VariantRecord> for VariantDirective {
    fn from(record: VariantRecord) -> Self {
        Self {
            enabled: record.enabled_variants,
            disabled: record.disabled_variants,
            extra_options: record.extra_options,
        }
    }
}

/// Lookup of variant configurations by build name
pub trait VariantStore {
    /// Load the record of a named build, `None` if absent or unreadable
    fn load(&self, build_name: &str) -> Option<VariantDirective>;

    /// Persist the record for the build installed at `prefix`
    fn save(&self, prefix: &Path, record: &VariantRecord) -> Result<(), RecordError>;
}

/// Store reading records from install prefixes under one root
#[derive(Debug, Clone)]
pub struct FileVariantStore {
    install_root: PathBuf,
}

impl FileVariantStore {
    /// Create a store over `install_root` (`<home>/php`)
    pub fn new(install_root: PathBuf) -> Self {
        Self { install_root }
    }

    /// Record path inside an install prefix
    pub fn record_path(prefix: &Path) -> PathBuf {
        prefix.join(VARIANT_RECORD_FILE)
    }

    /// Read the record of a named build, surfacing errors
    pub fn read(&self, build_name: &str) -> Result<Option<VariantRecord>, RecordError> {
        validate_build_name(build_name)?;
        let path = Self::record_path(&self.install_root.join(build_name));
        if !path.is_file() {
            return Ok(None);
        }

        let content = filesystem::read_file(&path).map_err(|e| RecordError::Read {
            path: path.clone(),
            error: e.to_string(),
        })?;

        VariantRecord::from_toml(&content)
            .map(Some)
            .map_err(|e| RecordError::Parse {
                path,
                error: e.to_string(),
            })
    }
}

impl VariantStore for FileVariantStore {
    fn load(&self, build_name: &str) -> Option<VariantDirective> {
        match self.read(build_name) {
            Ok(Some(record)) => Some(record.into()),
            Ok(None) => {
                tracing::warn!("No variant record for build '{build_name}', nothing to inherit");
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring variant record of '{build_name}': {e}");
                None
            }
        }
    }

    fn save(&self, prefix: &Path, record: &VariantRecord) -> Result<(), RecordError> {
        let path = Self::record_path(prefix);
        let content = record.to_toml().map_err(|e| RecordError::Serialize {
            error: e.to_string(),
        })?;

        tracing::debug!("Writing variant info to {}", path.display());
        filesystem::write_file_atomic(&path, &content).map_err(|e| RecordError::Write {
            path,
            error: e.to_string(),
        })
    }
}
