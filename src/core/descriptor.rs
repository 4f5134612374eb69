//! Build descriptor
//!
//! Describes one build: target version, install prefix, source tree,
//! build log and the resolved variant configuration. Paths are bound once
//! and never rebound; every stage reads them through the accessors here.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::record::VariantRecord;
use crate::core::resolver::Resolution;
use crate::core::variant::{VariantMap, VariantRegistry};
use crate::core::version::PhpVersion;
use crate::error::DescriptorError;

/// Resolved description of one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescriptor {
    version: PhpVersion,
    alias: String,
    install_prefix: Option<PathBuf>,
    source_directory: Option<PathBuf>,
    build_log_path: Option<PathBuf>,
    variants: VariantMap,
    disabled_variants: BTreeSet<String>,
    extra_configure_options: Vec<String>,
}

impl BuildDescriptor {
    /// Create a descriptor; the alias defaults to the canonical version
    pub fn new(version: PhpVersion, alias: Option<&str>) -> Self {
        let alias = alias.map_or_else(|| version.to_string(), str::to_string);
        Self {
            version,
            alias,
            install_prefix: None,
            source_directory: None,
            build_log_path: None,
            variants: VariantMap::new(),
            disabled_variants: BTreeSet::new(),
            extra_configure_options: Vec::new(),
        }
    }

    /// Target version
    pub fn version(&self) -> &PhpVersion {
        &self.version
    }

    /// Build name used for the prefix and for `--like` lookups
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Take variants and options from a resolution
    pub fn apply_resolution(&mut self, resolution: &Resolution) {
        self.variants = resolution.variants.clone();
        self.disabled_variants = resolution.removed.clone();
        self.extra_configure_options.clear();
        for option in &resolution.extra_options {
            self.push_configure_option(option);
        }
    }

    /// Append a raw configure option; repeats are ignored
    pub fn push_configure_option(&mut self, option: &str) {
        if !self.extra_configure_options.iter().any(|o| o == option) {
            self.extra_configure_options.push(option.to_string());
        }
    }

    /// Resolved variants
    pub fn variants(&self) -> &VariantMap {
        &self.variants
    }

    /// Variants removed by negation
    pub fn disabled_variants(&self) -> &BTreeSet<String> {
        &self.disabled_variants
    }

    /// Raw configure options
    pub fn extra_configure_options(&self) -> &[String] {
        &self.extra_configure_options
    }

    /// Bind the install prefix
    pub fn set_install_prefix(&mut self, path: PathBuf) -> Result<(), DescriptorError> {
        bind_once(&mut self.install_prefix, "install prefix", path)
    }

    /// Bind the extracted source tree
    pub fn bind_source_directory(&mut self, path: PathBuf) -> Result<(), DescriptorError> {
        bind_once(&mut self.source_directory, "source directory", path)
    }

    /// Bind the build log file
    pub fn set_build_log_path(&mut self, path: PathBuf) -> Result<(), DescriptorError> {
        bind_once(&mut self.build_log_path, "build log path", path)
    }

    /// Install prefix
    pub fn install_prefix(&self) -> Result<&Path, DescriptorError> {
        bound(self.install_prefix.as_deref(), "install prefix")
    }

    /// Source tree
    pub fn source_directory(&self) -> Result<&Path, DescriptorError> {
        bound(self.source_directory.as_deref(), "source directory")
    }

    /// Build log file, once bound
    pub fn build_log_path(&self) -> Option<&Path> {
        self.build_log_path.as_deref()
    }

    /// `<prefix>/etc`, where php.ini lives
    pub fn etc_directory(&self) -> Result<PathBuf, DescriptorError> {
        Ok(self.install_prefix()?.join("etc"))
    }

    /// `<prefix>/var/db`, scanned for extra ini files
    pub fn scan_directory(&self) -> Result<PathBuf, DescriptorError> {
        Ok(self.install_prefix()?.join("var").join("db"))
    }

    /// Full `./configure` argument list
    ///
    /// Baseline flags first, then variant flags in name order, then the
    /// raw options exactly as given.
    pub fn configure_args(&self, registry: &VariantRegistry) -> Result<Vec<String>, DescriptorError> {
        let prefix = self.install_prefix()?;
        let mut args = vec![
            format!("--prefix={}", prefix.display()),
            format!("--with-config-file-path={}", self.etc_directory()?.display()),
            format!(
                "--with-config-file-scan-dir={}",
                self.scan_directory()?.display()
            ),
            "--disable-all".to_string(),
        ];
        args.extend(registry.configure_flags(&self.variants));
        args.extend(self.extra_configure_options.iter().cloned());
        Ok(args)
    }

    /// Snapshot for the persisted variant record
    pub fn record(&self) -> VariantRecord {
        VariantRecord {
            enabled_variants: self.variants.clone(),
            disabled_variants: self.disabled_variants.clone(),
            extra_options: self.extra_configure_options.clone(),
        }
    }
}

/// Check that `name` names one directory directly under the install root
///
/// Rejects empty names, `.`, `..`, absolute paths and anything holding a
/// path separator.
pub fn validate_build_name(name: &str) -> Result<(), DescriptorError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !Path::new(name).is_absolute();
    if plain {
        Ok(())
    } else {
        Err(DescriptorError::InvalidBuildName {
            name: name.to_string(),
        })
    }
}

fn bind_once(
    slot: &mut Option<PathBuf>,
    field: &'static str,
    path: PathBuf,
) -> Result<(), DescriptorError> {
    if let Some(current) = slot {
        return Err(DescriptorError::AlreadyBound {
            field,
            current: current.clone(),
        });
    }
    if !path.is_absolute() {
        return Err(DescriptorError::RelativePath { field, path });
    }
    *slot = Some(path);
    Ok(())
}

fn bound<'a>(slot: Option<&'a Path>, field: &'static str) -> Result<&'a Path, DescriptorError> {
    slot.ok_or(DescriptorError::NotBound { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variant::VariantValue;

    fn descriptor() -> BuildDescriptor {
        BuildDescriptor::new(PhpVersion::parse("5.4.1").unwrap(), None)
    }

    #[test]
    fn test_alias_defaults_to_version() {
        assert_eq!(descriptor().alias(), "5.4.1");
        let d = BuildDescriptor::new(PhpVersion::parse("php-5.4.1").unwrap(), Some("work"));
        assert_eq!(d.alias(), "work");
    }

    #[test]
    fn test_paths_bind_once() {
        let mut d = descriptor();
        d.set_install_prefix(PathBuf::from("/opt/php/5.4.1")).unwrap();

        let err = d
            .set_install_prefix(PathBuf::from("/opt/php/other"))
            .unwrap_err();
        assert!(matches!(err, DescriptorError::AlreadyBound { .. }));
        assert_eq!(d.install_prefix().unwrap(), Path::new("/opt/php/5.4.1"));
    }

    #[test]
    fn test_relative_paths_rejected() {
        let mut d = descriptor();
        assert!(matches!(
            d.bind_source_directory(PathBuf::from("build/php-5.4.1")),
            Err(DescriptorError::RelativePath { .. })
        ));
        assert!(matches!(
            d.source_directory(),
            Err(DescriptorError::NotBound { .. })
        ));
    }

    #[test]
    fn test_derived_directories() {
        let mut d = descriptor();
        assert!(d.etc_directory().is_err());
        d.set_install_prefix(PathBuf::from("/opt/php/5.4.1")).unwrap();
        assert_eq!(d.etc_directory().unwrap(), PathBuf::from("/opt/php/5.4.1/etc"));
        assert_eq!(
            d.scan_directory().unwrap(),
            PathBuf::from("/opt/php/5.4.1/var/db")
        );
        assert!(d.build_log_path().is_none());
    }

    #[test]
    fn test_configure_args_order() {
        let mut d = descriptor();
        d.set_install_prefix(PathBuf::from("/opt/php/5.4.1")).unwrap();

        let mut resolution = Resolution::default();
        resolution
            .variants
            .insert("openssl".into(), VariantValue::Value("/usr".into()));
        resolution.variants.insert("bcmath".into(), VariantValue::Flag(true));
        resolution.variants.insert("nosuch".into(), VariantValue::Flag(true));
        resolution.extra_options = vec!["--with-libdir=lib64".into()];
        d.apply_resolution(&resolution);

        let args = d.configure_args(&VariantRegistry::builtin()).unwrap();
        assert_eq!(args[0], "--prefix=/opt/php/5.4.1");
        assert_eq!(args[1], "--with-config-file-path=/opt/php/5.4.1/etc");
        assert_eq!(args[2], "--with-config-file-scan-dir=/opt/php/5.4.1/var/db");
        assert_eq!(args[3], "--disable-all");

        let bcmath = args.iter().position(|a| a == "--enable-bcmath").unwrap();
        let openssl = args.iter().position(|a| a == "--with-openssl=/usr").unwrap();
        assert!(bcmath < openssl);
        assert_eq!(args.last().map(String::as_str), Some("--with-libdir=lib64"));
        assert!(!args.iter().any(|a| a.contains("nosuch")));
    }

    #[test]
    fn test_configure_options_append_without_repeats() {
        let mut d = descriptor();
        d.push_configure_option("--without-pear");
        d.push_configure_option("--with-libdir=lib64");
        d.push_configure_option("--without-pear");
        assert_eq!(
            d.extra_configure_options(),
            &["--without-pear".to_string(), "--with-libdir=lib64".to_string()]
        );
    }

    #[test]
    fn test_build_name_validation() {
        for name in ["5.4.1", "work", "php-7.0.0RC1", "..hidden"] {
            assert!(validate_build_name(name).is_ok(), "{name} should be accepted");
        }
        for name in ["", ".", "..", "/usr", "../../x", "a/b", "a\\b"] {
            assert!(
                matches!(
                    validate_build_name(name),
                    Err(DescriptorError::InvalidBuildName { .. })
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_record_snapshot() {
        let mut d = descriptor();
        let mut resolution = Resolution::default();
        resolution.variants.insert("xml".into(), VariantValue::Flag(true));
        resolution.removed.insert("json".into());
        d.apply_resolution(&resolution);

        let record = d.record();
        assert!(record.enabled_variants.contains_key("xml"));
        assert!(record.disabled_variants.contains("json"));
    }
}
