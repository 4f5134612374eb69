//! Build stage: `make -j<jobs>`, optionally under `nice`.

use super::invoke;
use crate::core::descriptor::BuildDescriptor;
use crate::core::pipeline::{StageContext, StageStatus};
use crate::error::StageError;
use crate::infra::process::ToolInvocation;

pub fn run(descriptor: &mut BuildDescriptor, ctx: &StageContext<'_>) -> Result<StageStatus, StageError> {
    if !ctx.options.dry_run && ctx.invoker.locate("make").is_none() {
        return Err(StageError::ToolNotFound {
            program: "make".to_string(),
        });
    }

    let source = descriptor.source_directory()?;
    let jobs = format!("-j{}", ctx.options.jobs());

    let invocation = match ctx.options.nice {
        Some(priority) => ToolInvocation::new("nice", source)
            .args(["-n".to_string(), priority.to_string()])
            .args(["make".to_string(), jobs]),
        None => ToolInvocation::new("make", source).arg(jobs),
    };

    tracing::info!("Building php-{}...", descriptor.version());
    invoke(descriptor, ctx, invocation)
}
