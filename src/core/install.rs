//! Install orchestration
//!
//! Turns an install request into a bound [`BuildDescriptor`], persists its
//! variant record and drives the pipeline. Fetching the source tree is
//! left to the caller, between [`Installer::describe`] and
//! [`Installer::build`].

use std::path::PathBuf;

use crate::core::descriptor::{validate_build_name, BuildDescriptor};
use crate::core::directive::VariantDirective;
use crate::core::pipeline::{Pipeline, PipelineReport, StageContext};
use crate::core::record::VariantStore;
use crate::core::resolver::{Resolution, ResolverPolicy, VariantResolver};
use crate::core::variant::{VariantMap, VariantRegistry};
use crate::core::version::PhpVersion;
use crate::error::{DescriptorError, PipelineError};

/// What the user asked to install
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Target version
    pub version: PhpVersion,
    /// Build name; defaults to the version
    pub alias: Option<String>,
    /// Build to inherit variants from
    pub like: Option<String>,
    /// Variants and raw options from the command line
    pub directive: VariantDirective,
}

/// Plans and runs installs
pub struct Installer<'a> {
    registry: &'a VariantRegistry,
    policy: &'a ResolverPolicy,
    store: &'a dyn VariantStore,
    install_root: PathBuf,
}

impl<'a> Installer<'a> {
    /// Create an installer placing prefixes under `install_root`
    pub fn new(
        registry: &'a VariantRegistry,
        policy: &'a ResolverPolicy,
        store: &'a dyn VariantStore,
        install_root: PathBuf,
    ) -> Self {
        Self {
            registry,
            policy,
            store,
            install_root,
        }
    }

    /// Resolve variants and bind the install prefix
    pub fn describe(&self, request: &InstallRequest) -> Result<BuildDescriptor, DescriptorError> {
        if let Some(ref alias) = request.alias {
            validate_build_name(alias)?;
        }
        if let Some(ref like) = request.like {
            validate_build_name(like)?;
        }

        let inherited = request.like.as_deref().and_then(|name| {
            let directive = self.store.load(name);
            if directive.is_some() {
                tracing::info!("Inheriting variants from build '{name}'");
            }
            directive
        });

        let resolution = VariantResolver::new(self.registry, self.policy).resolve(
            &request.version,
            &VariantMap::new(),
            inherited.as_ref(),
            &request.directive,
        );
        report_notices(&resolution);

        let mut descriptor = BuildDescriptor::new(request.version.clone(), request.alias.as_deref());
        descriptor.set_install_prefix(self.install_root.join(descriptor.alias()))?;
        descriptor.apply_resolution(&resolution);
        Ok(descriptor)
    }

    /// Write the variant record; a failure only warns
    pub fn persist(&self, descriptor: &BuildDescriptor, dry_run: bool) {
        let Ok(prefix) = descriptor.install_prefix() else {
            tracing::warn!("Install prefix not bound, variant info not stored");
            return;
        };
        if dry_run {
            tracing::info!("(dry-run) would write variant info into {}", prefix.display());
            return;
        }
        if let Err(e) = self.store.save(prefix, &descriptor.record()) {
            tracing::warn!("Can't store variant info: {e}");
        }
    }

    /// Persist the record, then run the pipeline
    pub fn build(
        &self,
        descriptor: &mut BuildDescriptor,
        ctx: &StageContext<'_>,
    ) -> Result<PipelineReport, PipelineError> {
        self.persist(descriptor, ctx.options.dry_run);
        Pipeline::for_options(ctx.options).run(descriptor, ctx)
    }
}

fn report_notices(resolution: &Resolution) {
    for notice in &resolution.notices {
        if notice.is_warning() {
            tracing::warn!("{notice}");
        } else {
            tracing::info!("{notice}");
        }
    }
    if !resolution.removed.is_empty() {
        tracing::debug!(
            "Removed variants: {}",
            resolution
                .removed
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(",")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{FileVariantStore, VariantRecord};
    use crate::core::variant::VariantValue;
    use tempfile::TempDir;

    fn request(tokens: &[&str], like: Option<&str>) -> InstallRequest {
        InstallRequest {
            version: PhpVersion::parse("5.4.1").unwrap(),
            alias: None,
            like: like.map(str::to_string),
            directive: VariantDirective::parse(tokens, &[], &VariantRegistry::builtin()).unwrap(),
        }
    }

    #[test]
    fn test_describe_binds_prefix_and_variants() {
        let tmp = TempDir::new().unwrap();
        let registry = VariantRegistry::builtin();
        let policy = ResolverPolicy::builtin();
        let store = FileVariantStore::new(tmp.path().to_path_buf());
        let installer = Installer::new(&registry, &policy, &store, tmp.path().to_path_buf());

        let d = installer.describe(&request(&["+pdo", "+sqlite"], None)).unwrap();
        assert_eq!(d.install_prefix().unwrap(), tmp.path().join("5.4.1"));
        assert!(d.variants().contains_key("sqlite"));
        assert!(d.variants().contains_key("xml"));
        assert!(!d.variants().contains_key("openssl"));
    }

    #[test]
    fn test_describe_inherits_from_store() {
        let tmp = TempDir::new().unwrap();
        let registry = VariantRegistry::builtin();
        let policy = ResolverPolicy::builtin();
        let store = FileVariantStore::new(tmp.path().to_path_buf());

        let mut record = VariantRecord::default();
        record
            .enabled_variants
            .insert("gd".into(), VariantValue::Value("shared".into()));
        store.save(&tmp.path().join("old"), &record).unwrap();

        let installer = Installer::new(&registry, &policy, &store, tmp.path().to_path_buf());
        let d = installer.describe(&request(&["+pdo"], Some("old"))).unwrap();
        assert_eq!(
            d.variants().get("gd"),
            Some(&VariantValue::Value("shared".into()))
        );
        assert!(d.variants().contains_key("pdo"));
    }

    #[test]
    fn test_describe_rejects_names_outside_install_root() {
        let tmp = TempDir::new().unwrap();
        let registry = VariantRegistry::builtin();
        let policy = ResolverPolicy::builtin();
        let store = FileVariantStore::new(tmp.path().to_path_buf());
        let installer = Installer::new(&registry, &policy, &store, tmp.path().to_path_buf());

        let mut absolute = request(&["+pdo"], None);
        absolute.alias = Some("/usr".into());
        assert!(matches!(
            installer.describe(&absolute),
            Err(DescriptorError::InvalidBuildName { .. })
        ));

        let escaping = request(&["+pdo"], Some("../../x"));
        assert!(matches!(
            installer.describe(&escaping),
            Err(DescriptorError::InvalidBuildName { .. })
        ));
    }

    #[test]
    fn test_persist_skipped_on_dry_run() {
        let tmp = TempDir::new().unwrap();
        let registry = VariantRegistry::builtin();
        let policy = ResolverPolicy::builtin();
        let store = FileVariantStore::new(tmp.path().to_path_buf());
        let installer = Installer::new(&registry, &policy, &store, tmp.path().to_path_buf());

        let d = installer.describe(&request(&["+pdo"], None)).unwrap();
        installer.persist(&d, true);
        assert!(!FileVariantStore::record_path(d.install_prefix().unwrap()).exists());

        installer.persist(&d, false);
        assert!(FileVariantStore::record_path(d.install_prefix().unwrap()).exists());
    }
}
