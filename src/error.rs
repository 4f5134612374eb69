//! Error types for phpbuild
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::pipeline::StageKind;
use crate::infra::process::ToolStatus;

/// Version parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Version string could not be parsed
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Version range could not be parsed
    #[error("Invalid version range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },
}

/// Variant directive errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// Token does not start with '+' or '-'
    #[error("Invalid variant token '{token}': expected +name or -name")]
    InvalidToken { token: String },

    /// Token has a sign but no name
    #[error("Variant token '{token}' has no variant name")]
    EmptyName { token: String },

    /// A value was given to a negated variant
    #[error("Variant token '{token}': a disabled variant cannot take a value")]
    ValueOnDisabled { token: String },
}

/// Persisted variant record errors
#[derive(Error, Debug)]
pub enum RecordError {
    /// Failed to read the record file
    #[error("Failed to read variant record '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse the record file
    #[error("Failed to parse variant record '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Failed to serialize the record
    #[error("Failed to serialize variant record: {error}")]
    Serialize { error: String },

    /// Failed to write the record file
    #[error("Failed to write variant record '{path}': {error}")]
    Write { path: PathBuf, error: String },

    /// The build name would resolve outside the install root
    #[error(transparent)]
    BuildName(#[from] DescriptorError),
}

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    NetworkError { url: String, error: String },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },

    /// Max retries exceeded
    #[error("Download failed after {retries} retries: {url}")]
    MaxRetriesExceeded { url: String, retries: u32 },

    /// Archive could not be unpacked
    #[error("Failed to extract '{archive}': {error}")]
    Extract { archive: PathBuf, error: String },

    /// Nothing usable came out of the archive
    #[error("Source directory missing after extraction: {path}")]
    MissingSource { path: PathBuf },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to rename a file
    #[error("Failed to rename '{from}' to '{to}': {error}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// Build descriptor errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// A set-once field was assigned twice
    #[error("{field} is already set to '{current}' and cannot be changed")]
    AlreadyBound { field: &'static str, current: PathBuf },

    /// A field was read before being set
    #[error("{field} has not been set")]
    NotBound { field: &'static str },

    /// A path that must be absolute was relative
    #[error("{field} must be an absolute path, got '{path}'")]
    RelativePath { field: &'static str, path: PathBuf },

    /// A build name that is not a single plain directory name
    #[error("Invalid build name '{name}': must be a plain directory name")]
    InvalidBuildName { name: String },
}

/// Errors raised by a single pipeline stage
#[derive(Error, Debug)]
pub enum StageError {
    /// External tool exited unsuccessfully
    #[error("'{program}' failed with {status}")]
    ToolFailed { program: String, status: ToolStatus },

    /// External tool could not be started
    #[error("Failed to start '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Required external tool is not installed
    #[error("Required tool '{program}' not found in PATH")]
    ToolNotFound { program: String },

    /// Source tree is missing
    #[error("Source directory not found: {path}")]
    MissingSource { path: PathBuf },

    /// Patch file is missing or unreadable
    #[error("Patch file not found: {path}")]
    MissingPatch { path: PathBuf },

    /// Template file needed by a post-install step is missing
    #[error("Template not found: {path}")]
    MissingTemplate { path: PathBuf },

    /// Invalid substitution pattern
    #[error("Invalid substitution for '{key}': {error}")]
    InvalidSubstitution { key: String, error: String },

    /// Filesystem operation failed
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Descriptor was not fully bound
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// A fatal pipeline failure
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}{}", log_hint(.build_log.as_ref()))]
pub struct PipelineError {
    /// Stage that aborted the pipeline
    pub stage: StageKind,
    /// Underlying cause
    #[source]
    pub source: StageError,
    /// Build log holding the external tool output, if one was bound
    pub build_log: Option<PathBuf>,
}

fn log_hint(path: Option<&PathBuf>) -> String {
    path.map(|p| format!(" (see build log: {})", p.display()))
        .unwrap_or_default()
}

/// Top-level phpbuild error type
#[derive(Error, Debug)]
pub enum PhpbuildError {
    /// Version error
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Variant error
    #[error("Variant error: {0}")]
    Variant(#[from] VariantError),

    /// Variant record error
    #[error("Variant record error: {0}")]
    Record(#[from] RecordError),

    /// Download error
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Descriptor error
    #[error("Build descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Pipeline error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// No variant record exists for the named build
    #[error("No variant record for build '{build}'. Use 'phpbuild list' to see installed builds.")]
    BuildNotFound { build: String },
}
