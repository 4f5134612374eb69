//! Install command implementation
//!
//! Implements `phpbuild install`: resolve variants, fetch the source
//! tree, then run the build pipeline.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::output::{create_download_bar, download_progress, status};
use crate::config::urls::source_archive_url;
use crate::core::descriptor::BuildDescriptor;
use crate::core::directive::VariantDirective;
use crate::core::global_config::GlobalConfig;
use crate::core::install::{InstallRequest, Installer};
use crate::core::options::{canonicalize_patches, BuildOptions};
use crate::core::pipeline::{PipelineReport, StageContext, StageStatus};
use crate::core::record::FileVariantStore;
use crate::core::variant::{VariantMap, VariantRegistry};
use crate::core::version::PhpVersion;
use crate::infra::dirs::PhpbuildDirs;
use crate::infra::download::SourceFetcher;
use crate::infra::filesystem;
use crate::infra::process::ProcessInvoker;

/// Parsed `install` arguments
#[derive(Debug, Clone, Default)]
pub struct InstallArgs {
    pub version: String,
    pub variants: Vec<String>,
    pub extra: Vec<String>,
    pub alias: Option<String>,
    pub like: Option<String>,
    pub build_dir: Option<PathBuf>,
    pub patches: Vec<PathBuf>,
    pub dry_run: bool,
    pub clean: bool,
    pub post_clean: bool,
    pub test: bool,
    pub production: bool,
    pub make_jobs: Option<usize>,
    pub nice: Option<i32>,
}

#[derive(Serialize)]
struct InstallSummary<'a> {
    version: String,
    alias: &'a str,
    prefix: &'a Path,
    build_log: Option<&'a Path>,
    dry_run: bool,
    variants: &'a VariantMap,
    configure_options: &'a [String],
    stages: Vec<StageSummary>,
}

#[derive(Serialize)]
struct StageSummary {
    stage: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

/// Execute the install command
pub async fn execute(args: InstallArgs, json: bool) -> Result<()> {
    let dirs = PhpbuildDirs::new();
    let config = GlobalConfig::load(&dirs).context("Failed to load global configuration")?;
    let registry = VariantRegistry::builtin();
    let policy = config.resolver_policy();

    let version = PhpVersion::parse(&args.version)?;
    let directive = VariantDirective::parse(&args.variants, &args.extra, &registry)?;

    let options = BuildOptions {
        dry_run: args.dry_run,
        clean: args.clean,
        post_clean: args.post_clean,
        test: args.test,
        production: args.production || config.build.production.unwrap_or(false),
        make_jobs: args.make_jobs.or(config.build.jobs),
        nice: args.nice.or(config.build.nice),
        patches: canonicalize_patches(&args.patches),
    };

    let install_root = absolute(dirs.install_root())?;
    let store = FileVariantStore::new(install_root.clone());
    let installer = Installer::new(&registry, &policy, &store, install_root);

    let request = InstallRequest {
        version: version.clone(),
        alias: args.alias.clone(),
        like: args.like.clone(),
        directive,
    };
    let mut descriptor = installer
        .describe(&request)
        .context("Failed to set up the build")?;

    let build_dir = absolute(args.build_dir.clone().unwrap_or_else(|| dirs.build_dir()))?;
    let url = source_archive_url(config.mirror(), &version.to_string());
    let source_dir = if options.dry_run {
        tracing::info!("(dry-run) would download {url} into {}", build_dir.display());
        build_dir.join(format!("php-{version}"))
    } else {
        filesystem::create_dir_all(&build_dir)?;
        let fetcher = SourceFetcher::new(dirs.distfiles_dir());
        let bar = (!json).then(|| create_download_bar(0));
        let source = fetcher
            .fetch(&url, &build_dir, bar.clone().map(download_progress))
            .await
            .with_context(|| format!("Failed to fetch php-{version}"))?;
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        source
    };
    descriptor.bind_source_directory(source_dir)?;

    let ini = config.ini_defaults();
    let ctx = StageContext {
        options: &options,
        registry: &registry,
        invoker: &ProcessInvoker,
        ini: &ini,
    };

    let report = installer.build(&mut descriptor, &ctx)?;

    if json {
        let summary = summarize(&descriptor, &report, options.dry_run)?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&descriptor, &report, options.dry_run)?;
    }
    Ok(())
}

fn summarize<'a>(
    descriptor: &'a BuildDescriptor,
    report: &PipelineReport,
    dry_run: bool,
) -> Result<InstallSummary<'a>> {
    let stages = report
        .outcomes
        .iter()
        .map(|o| {
            let (status, warning) = match o.status {
                StageStatus::Completed => ("completed", None),
                StageStatus::DryRun => ("dry-run", None),
                StageStatus::Warned(ref msg) => ("warned", Some(msg.clone())),
            };
            StageSummary {
                stage: o.stage.to_string(),
                status,
                warning,
            }
        })
        .collect();

    Ok(InstallSummary {
        version: descriptor.version().to_string(),
        alias: descriptor.alias(),
        prefix: descriptor.install_prefix()?,
        build_log: descriptor.build_log_path(),
        dry_run,
        variants: descriptor.variants(),
        configure_options: descriptor.extra_configure_options(),
        stages,
    })
}

fn print_report(descriptor: &BuildDescriptor, report: &PipelineReport, dry_run: bool) -> Result<()> {
    let prefix = descriptor.install_prefix()?;

    for (stage, msg) in report.warnings() {
        println!("{} {stage}: {msg}", status::WARNING);
    }

    if dry_run {
        let stages: Vec<String> = report.stages().iter().map(ToString::to_string).collect();
        println!(
            "{} Dry run for php-{}: {}",
            status::SUCCESS,
            descriptor.version(),
            stages.join(" -> ")
        );
        println!("  Prefix: {}", prefix.display());
        return Ok(());
    }

    println!(
        "{} Installed php-{} into {}",
        status::SUCCESS,
        descriptor.version(),
        prefix.display()
    );
    if let Some(log) = descriptor.build_log_path() {
        println!("  Build log: {}", log.display());
    }
    Ok(())
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()
            .context("Failed to determine current directory")?
            .join(path))
    }
}
