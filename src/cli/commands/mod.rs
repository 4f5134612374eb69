//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod info;
pub mod install;
pub mod list;
pub mod variants;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and install a PHP release
    #[command(
        override_usage = "phpbuild install [OPTIONS] <VERSION> [VARIANTS]... [-- <CONFIGURE_OPTIONS>...]",
        after_help = "Variants: +name, +name=value, -name (e.g. +pdo+mysql -xml), in any\n\
position after the version. Options after `--` are passed to ./configure verbatim."
    )]
    Install {
        /// Version to install (e.g. 5.4.1 or php-5.4.1)
        #[arg(id = "php_version", value_name = "VERSION")]
        version: String,

        /// Variant directive; bare `+name`/`-name` tokens are routed here
        #[arg(
            long = "variant",
            value_name = "VARIANT",
            allow_hyphen_values = true,
            hide = true
        )]
        variants: Vec<String>,

        /// Extra ./configure options
        #[arg(last = true, value_name = "CONFIGURE_OPTIONS")]
        extra: Vec<String>,

        /// Install under this build name instead of the version
        #[arg(long)]
        alias: Option<String>,

        /// Inherit variants from an installed build
        #[arg(long, value_name = "BUILD")]
        like: Option<String>,

        /// Directory holding extracted source trees
        #[arg(long)]
        build_dir: Option<PathBuf>,

        /// Apply a patch before configuring (repeatable)
        #[arg(long, value_name = "FILE")]
        patch: Vec<PathBuf>,

        /// Show what would be done without doing it
        #[arg(long)]
        dryrun: bool,

        /// Run `make clean` before building
        #[arg(long)]
        clean: bool,

        /// Run `make clean` after installing
        #[arg(long)]
        post_clean: bool,

        /// Run the test suite before installing
        #[arg(long)]
        test: bool,

        /// Use php.ini-production instead of php.ini-development
        #[arg(long)]
        production: bool,

        /// Number of parallel make jobs
        #[arg(long, value_name = "N")]
        make_jobs: Option<usize>,

        /// Build at an altered scheduling priority
        #[arg(long, value_name = "PRIORITY", allow_negative_numbers = true)]
        nice: Option<i32>,
    },

    /// List known variants
    Variants,

    /// Show the variant record of an installed build
    Info {
        /// Build name
        build: String,
    },

    /// List installed builds
    List,
}

impl Commands {
    /// Execute the command
    pub async fn run(self, json: bool) -> Result<()> {
        match self {
            Self::Install {
                version,
                variants,
                extra,
                alias,
                like,
                build_dir,
                patch,
                dryrun,
                clean,
                post_clean,
                test,
                production,
                make_jobs,
                nice,
            } => {
                let args = install::InstallArgs {
                    version,
                    variants,
                    extra,
                    alias,
                    like,
                    build_dir,
                    patches: patch,
                    dry_run: dryrun,
                    clean,
                    post_clean,
                    test,
                    production,
                    make_jobs,
                    nice,
                };
                install::execute(args, json).await
            }
            Self::Variants => variants::execute(json).await,
            Self::Info { build } => info::execute(&build, json).await,
            Self::List => list::execute(json).await,
        }
    }
}
