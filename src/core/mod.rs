//! Core business logic module
//!
//! Variant resolution, the build descriptor and the build pipeline.
//! Process spawning and network access go through [`crate::infra`].
//!
//! # Submodules
//!
//! - [`version`] - PHP version parsing and ranges
//! - [`variant`] - Variant registry
//! - [`directive`] - `+variant`/`-variant` directives
//! - [`resolver`] - Variant resolution
//! - [`record`] - Persisted variant record and store
//! - [`descriptor`] - Build descriptor
//! - [`options`] - Per-run build options
//! - [`config_patch`] - Config file templating
//! - [`global_config`] - Global configuration management
//! - [`pipeline`] - Stage sequencing and failure policy
//! - [`stages`] - Stage implementations
//! - [`install`] - Install orchestration

pub mod config_patch;
pub mod descriptor;
pub mod directive;
pub mod global_config;
pub mod install;
pub mod options;
pub mod pipeline;
pub mod record;
pub mod resolver;
pub mod stages;
pub mod variant;
pub mod version;
