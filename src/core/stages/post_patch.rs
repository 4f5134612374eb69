//! Post-install adjustments
//!
//! Three independent steps, each best-effort: a failure is logged and
//! the remaining steps still run.

use std::path::Path;

use crate::core::config_patch::{ConfigFilePatcher, PatchOutcome};
use crate::core::descriptor::BuildDescriptor;
use crate::core::pipeline::{StageContext, StageStatus};
use crate::core::variant::VariantValue;
use crate::error::StageError;
use crate::infra::filesystem;

type Step = fn(&BuildDescriptor, &StageContext<'_>) -> Result<(), StageError>;

const STEPS: &[(&str, Step)] = &[
    ("debug symbols", fix_dsym),
    ("php-fpm.conf", install_fpm_conf),
    ("php.ini", install_php_ini),
];

pub fn run(descriptor: &mut BuildDescriptor, ctx: &StageContext<'_>) -> Result<StageStatus, StageError> {
    let descriptor = &*descriptor;
    let mut failures = Vec::new();

    for (name, step) in STEPS {
        if let Err(e) = step(descriptor, ctx) {
            tracing::warn!("Skipping {name}: {e}");
            failures.push(format!("{name}: {e}"));
        }
    }

    Ok(if !failures.is_empty() {
        StageStatus::Warned(failures.join("; "))
    } else if ctx.options.dry_run {
        StageStatus::DryRun
    } else {
        StageStatus::Completed
    })
}

/// Rename `bin/php.dSYM` to `bin/php` when the build left only the former
fn fix_dsym(descriptor: &BuildDescriptor, ctx: &StageContext<'_>) -> Result<(), StageError> {
    let bin = descriptor.install_prefix()?.join("bin");
    let dsym = bin.join("php.dSYM");
    let php = bin.join("php");

    if php.exists() || !dsym.is_file() {
        return Ok(());
    }

    if ctx.options.dry_run {
        tracing::info!("(dry-run) would rename {} to {}", dsym.display(), php.display());
        return Ok(());
    }

    tracing::info!("---> Moving php.dSYM to php");
    filesystem::rename(&dsym, &php)?;
    Ok(())
}

/// Copy `sapi/fpm/php-fpm.conf` into `<prefix>/etc` for fpm builds
fn install_fpm_conf(descriptor: &BuildDescriptor, ctx: &StageContext<'_>) -> Result<(), StageError> {
    if !descriptor
        .variants()
        .get("fpm")
        .is_some_and(VariantValue::is_enabled)
    {
        return Ok(());
    }

    let template = descriptor
        .source_directory()?
        .join("sapi")
        .join("fpm")
        .join("php-fpm.conf");
    let target = descriptor.etc_directory()?.join("php-fpm.conf");

    tracing::info!("---> Creating php-fpm.conf");
    install(&ConfigFilePatcher::new(), &template, &target, ctx)
}

/// Create `<prefix>/etc/php.ini` from the development or production template
fn install_php_ini(descriptor: &BuildDescriptor, ctx: &StageContext<'_>) -> Result<(), StageError> {
    let name = if ctx.options.production {
        "php.ini-production"
    } else {
        "php.ini-development"
    };
    let template = descriptor.source_directory()?.join(name);
    let target = descriptor.etc_directory()?.join("php.ini");

    tracing::info!("---> Creating php.ini from {name}");
    install(&ctx.ini.patcher(), &template, &target, ctx)
}

fn install(
    patcher: &ConfigFilePatcher,
    template: &Path,
    target: &Path,
    ctx: &StageContext<'_>,
) -> Result<(), StageError> {
    if ctx.options.dry_run {
        tracing::info!(
            "(dry-run) would install {} as {}",
            template.display(),
            target.display()
        );
        for key in patcher.keys() {
            tracing::info!("(dry-run) would set {key}");
        }
        return Ok(());
    }

    match patcher.apply(template, target)? {
        PatchOutcome::Created => tracing::debug!("Created {}", target.display()),
        PatchOutcome::Kept => {}
    }
    Ok(())
}
