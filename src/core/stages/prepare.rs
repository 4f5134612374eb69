//! Prepare stage: verify the source tree and create the prefix layout.

use crate::config::defaults::BUILD_LOG_FILE;
use crate::core::descriptor::BuildDescriptor;
use crate::core::pipeline::{StageContext, StageStatus};
use crate::error::StageError;
use crate::infra::filesystem;

/// Bind the build log and create `<prefix>`, `<prefix>/etc`, `<prefix>/var/db`
pub fn run(descriptor: &mut BuildDescriptor, ctx: &StageContext<'_>) -> Result<StageStatus, StageError> {
    let source = descriptor.source_directory()?.to_path_buf();
    if descriptor.build_log_path().is_none() {
        descriptor.set_build_log_path(source.join(BUILD_LOG_FILE))?;
    }

    let dirs = [
        descriptor.install_prefix()?.to_path_buf(),
        descriptor.etc_directory()?,
        descriptor.scan_directory()?,
    ];

    if ctx.options.dry_run {
        tracing::info!("(dry-run) would build in {}", source.display());
        for dir in &dirs {
            tracing::info!("(dry-run) would create {}", dir.display());
        }
        return Ok(StageStatus::DryRun);
    }

    if !source.is_dir() {
        return Err(StageError::MissingSource { path: source });
    }

    for dir in &dirs {
        tracing::debug!("Creating {}", dir.display());
        filesystem::create_dir_all(dir)?;
    }

    if let Some(log) = descriptor.build_log_path() {
        tracing::info!("Build log: {}", log.display());
    }
    Ok(StageStatus::Completed)
}
