//! Install stage: `make install` into the prefix chosen at configure time.

use super::{invoke, make};
use crate::core::descriptor::BuildDescriptor;
use crate::core::pipeline::{StageContext, StageStatus};
use crate::error::StageError;

pub fn run(descriptor: &mut BuildDescriptor, ctx: &StageContext<'_>) -> Result<StageStatus, StageError> {
    tracing::info!("Installing into {}...", descriptor.install_prefix()?.display());
    invoke(descriptor, ctx, make(descriptor)?.arg("install"))
}
