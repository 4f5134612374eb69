//! Clean stage: `make clean` in the source tree.

use super::{invoke, make};
use crate::core::descriptor::BuildDescriptor;
use crate::core::pipeline::{StageContext, StageStatus};
use crate::error::StageError;

pub fn run(descriptor: &mut BuildDescriptor, ctx: &StageContext<'_>) -> Result<StageStatus, StageError> {
    tracing::info!("Cleaning up...");
    invoke(descriptor, ctx, make(descriptor)?.arg("clean"))
}
