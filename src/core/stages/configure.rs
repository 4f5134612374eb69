//! Configure stage
//!
//! Applies user patches, regenerates `configure` when the tree has none,
//! then runs `./configure` with the descriptor's argument list.

use super::invoke;
use crate::core::descriptor::BuildDescriptor;
use crate::core::pipeline::{StageContext, StageStatus};
use crate::error::StageError;
use crate::infra::process::ToolInvocation;

pub fn run(descriptor: &mut BuildDescriptor, ctx: &StageContext<'_>) -> Result<StageStatus, StageError> {
    let source = descriptor.source_directory()?.to_path_buf();

    for patch in &ctx.options.patches {
        if !ctx.options.dry_run && !patch.is_file() {
            return Err(StageError::MissingPatch { path: patch.clone() });
        }
        tracing::info!("Applying patch {}", patch.display());
        let apply = ToolInvocation::new("patch", &source)
            .args(["-p0", "-i"])
            .arg(patch.display().to_string());
        invoke(descriptor, ctx, apply)?;
    }

    if !source.join("configure").is_file() {
        tracing::info!("No configure script, running buildconf");
        invoke(
            descriptor,
            ctx,
            ToolInvocation::new("./buildconf", &source).arg("--force"),
        )?;
    }

    let args = descriptor.configure_args(ctx.registry)?;
    tracing::info!("Configuring {} with: {}", descriptor.version(), args.join(" "));

    invoke(descriptor, ctx, ToolInvocation::new("./configure", &source).args(args))
}
