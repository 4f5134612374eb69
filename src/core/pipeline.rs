//! Build pipeline
//!
//! A fixed, strictly sequential list of stages:
//!
//! ```text
//! Prepare -> [Clean] -> Configure -> Build -> [Test] -> Install -> [Clean] -> PostPatch
//! ```
//!
//! Optional stages are selected from [`BuildOptions`] up front. Each stage
//! has a failure policy: fatal stages abort the run and surface the stage,
//! the cause and the build log path; the others are reported as warnings
//! and the run continues.

use std::fmt;

use crate::core::config_patch::IniDefaults;
use crate::core::descriptor::BuildDescriptor;
use crate::core::options::BuildOptions;
use crate::core::stages;
use crate::core::variant::VariantRegistry;
use crate::error::{PipelineError, StageError};
use crate::infra::process::ToolInvoker;

/// Stage identity without phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Prepare,
    Clean,
    Configure,
    Build,
    Test,
    Install,
    PostPatch,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prepare => "prepare",
            Self::Clean => "clean",
            Self::Configure => "configure",
            Self::Build => "build",
            Self::Test => "test",
            Self::Install => "install",
            Self::PostPatch => "post-patch",
        })
    }
}

/// When a clean stage runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanPhase {
    /// Before configuring
    Before,
    /// After installing
    After,
}

/// What a stage failure does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the pipeline
    Abort,
    /// Log a warning and continue
    Warn,
}

/// One pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prepare,
    Clean(CleanPhase),
    Configure,
    Build,
    Test,
    Install,
    PostPatch,
}

impl Stage {
    /// Stage identity
    pub fn kind(self) -> StageKind {
        match self {
            Self::Prepare => StageKind::Prepare,
            Self::Clean(_) => StageKind::Clean,
            Self::Configure => StageKind::Configure,
            Self::Build => StageKind::Build,
            Self::Test => StageKind::Test,
            Self::Install => StageKind::Install,
            Self::PostPatch => StageKind::PostPatch,
        }
    }

    /// Failure policy of this stage
    pub fn failure_policy(self) -> FailurePolicy {
        match self {
            Self::Clean(_) | Self::Test | Self::PostPatch => FailurePolicy::Warn,
            Self::Prepare | Self::Configure | Self::Build | Self::Install => FailurePolicy::Abort,
        }
    }

    /// Run the stage against a descriptor
    pub fn run(
        self,
        descriptor: &mut BuildDescriptor,
        ctx: &StageContext<'_>,
    ) -> Result<StageStatus, StageError> {
        match self {
            Self::Prepare => stages::prepare::run(descriptor, ctx),
            Self::Clean(_) => stages::clean::run(descriptor, ctx),
            Self::Configure => stages::configure::run(descriptor, ctx),
            Self::Build => stages::build::run(descriptor, ctx),
            Self::Test => stages::test::run(descriptor, ctx),
            Self::Install => stages::install::run(descriptor, ctx),
            Self::PostPatch => stages::post_patch::run(descriptor, ctx),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean(CleanPhase::Before) => f.write_str("pre-clean"),
            Self::Clean(CleanPhase::After) => f.write_str("post-clean"),
            other => fmt::Display::fmt(&other.kind(), f),
        }
    }
}

/// How a stage ended without aborting the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    /// Stage did its work
    Completed,
    /// Dry run: actions were only logged
    DryRun,
    /// Stage failed, or partly failed, under a warn policy
    Warned(String),
}

/// Shared, read-only inputs for every stage
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    /// Per-run options
    pub options: &'a BuildOptions,
    /// Variant lookup table
    pub registry: &'a VariantRegistry,
    /// Runs external tools
    pub invoker: &'a dyn ToolInvoker,
    /// php.ini defaults for post-install patching
    pub ini: &'a IniDefaults,
}

/// Outcome of one executed stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    /// The stage
    pub stage: Stage,
    /// How it ended
    pub status: StageStatus,
}

/// Outcome of a full run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Stages in execution order
    pub outcomes: Vec<StageOutcome>,
}

impl PipelineReport {
    /// Executed stages in order
    pub fn stages(&self) -> Vec<Stage> {
        self.outcomes.iter().map(|o| o.stage).collect()
    }

    /// Stages that ended with a warning
    pub fn warnings(&self) -> impl Iterator<Item = (&Stage, &str)> {
        self.outcomes.iter().filter_map(|o| match o.status {
            StageStatus::Warned(ref msg) => Some((&o.stage, msg.as_str())),
            _ => None,
        })
    }
}

/// Ordered stage list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Stages selected by `options`
    pub fn for_options(options: &BuildOptions) -> Self {
        let mut stages = vec![Stage::Prepare];
        if options.clean {
            stages.push(Stage::Clean(CleanPhase::Before));
        }
        stages.extend([Stage::Configure, Stage::Build]);
        if options.test {
            stages.push(Stage::Test);
        }
        stages.push(Stage::Install);
        if options.post_clean {
            stages.push(Stage::Clean(CleanPhase::After));
        }
        stages.push(Stage::PostPatch);
        Self { stages }
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order
    pub fn run(
        &self,
        descriptor: &mut BuildDescriptor,
        ctx: &StageContext<'_>,
    ) -> Result<PipelineReport, PipelineError> {
        let mut report = PipelineReport::default();

        for &stage in &self.stages {
            tracing::info!("===> Running {stage}");

            let status = match stage.run(descriptor, ctx) {
                Ok(status) => status,
                Err(source) => match stage.failure_policy() {
                    FailurePolicy::Abort => {
                        tracing::error!("{stage} failed: {source}");
                        return Err(PipelineError {
                            stage: stage.kind(),
                            source,
                            build_log: descriptor.build_log_path().map(ToOwned::to_owned),
                        });
                    }
                    FailurePolicy::Warn => {
                        tracing::warn!("{stage} failed, continuing: {source}");
                        StageStatus::Warned(source.to_string())
                    }
                },
            };

            tracing::debug!("{stage} finished: {status:?}");
            report.outcomes.push(StageOutcome { stage, status });
        }

        Ok(report)
    }
}
