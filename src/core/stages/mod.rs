//! Pipeline stage implementations
//!
//! Each submodule exposes `run(descriptor, ctx)`. Stages that spawn tools
//! go through [`invoke`], which honors dry-run and routes output into the
//! build log.

pub mod build;
pub mod clean;
pub mod configure;
pub mod install;
pub mod post_patch;
pub mod prepare;

use crate::core::descriptor::BuildDescriptor;
use crate::core::pipeline::{StageContext, StageStatus};
use crate::error::StageError;
use crate::infra::process::ToolInvocation;

/// Run an external tool in the source tree
///
/// In dry-run mode the command line is logged and nothing is spawned.
pub(crate) fn invoke(
    descriptor: &BuildDescriptor,
    ctx: &StageContext<'_>,
    invocation: ToolInvocation,
) -> Result<StageStatus, StageError> {
    let invocation = match descriptor.build_log_path() {
        Some(log) => invocation.log_to(log),
        None => invocation,
    };

    if ctx.options.dry_run {
        tracing::info!("(dry-run) would run: {}", invocation.command_line());
        return Ok(StageStatus::DryRun);
    }

    tracing::info!("Running: {}", invocation.command_line());
    let status = ctx
        .invoker
        .run(&invocation)
        .map_err(|e| StageError::Spawn {
            program: invocation.program.clone(),
            error: e.to_string(),
        })?;

    if status.success() {
        Ok(StageStatus::Completed)
    } else {
        Err(StageError::ToolFailed {
            program: invocation.command_line(),
            status,
        })
    }
}

/// `make` invocation in the source tree
pub(crate) fn make(descriptor: &BuildDescriptor) -> Result<ToolInvocation, StageError> {
    Ok(ToolInvocation::new("make", descriptor.source_directory()?))
}
