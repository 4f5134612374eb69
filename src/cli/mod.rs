//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;

use commands::Commands;

/// phpbuild - build PHP from source with selectable variants
///
/// Each build is installed into its own prefix under the phpbuild home.
#[derive(Parser, Debug)]
#[command(name = "phpbuild")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse the process arguments, routing variant tokens first
    pub fn parse_args() -> Self {
        Self::parse_from(route_variant_tokens(std::env::args_os()))
    }

    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(cmd) = self.command {
            cmd.run(self.json).await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}

/// `install` options that take their value as the next argument
const INSTALL_VALUE_OPTIONS: &[&str] = &[
    "--alias",
    "--like",
    "--build-dir",
    "--patch",
    "--make-jobs",
    "--nice",
    "--variant",
];

/// Rewrite `install` variant tokens as `--variant=<token>`
///
/// Variant tokens (`+pdo`, `-xml`) may sit anywhere among the flags, and a
/// `-name` token looks like a short flag to clap. Every `+`/`-` token that
/// starts with a letter, and every bare token after the version, is lifted
/// into the hidden `--variant` option so that known flags parse wherever
/// they appear. Arguments after `--` are left alone.
pub fn route_variant_tokens<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut iter = args.into_iter().map(Into::into);
    let mut routed: Vec<OsString> = iter.next().into_iter().collect();

    let mut subcommand: Option<bool> = None;
    let mut version_seen = false;
    let mut value_pending = false;
    let mut passthrough = false;

    for arg in iter {
        let Some(text) = arg.to_str().map(str::to_string) else {
            routed.push(arg);
            continue;
        };

        if passthrough || value_pending {
            value_pending = false;
            routed.push(arg);
            continue;
        }

        match subcommand {
            None => {
                if !text.starts_with('-') {
                    subcommand = Some(text == "install");
                }
                routed.push(arg);
            }
            Some(false) => routed.push(arg),
            Some(true) => {
                if text == "--" {
                    passthrough = true;
                } else if INSTALL_VALUE_OPTIONS.contains(&text.as_str()) {
                    value_pending = true;
                } else if is_variant_token(&text) || (version_seen && !text.starts_with('-')) {
                    routed.push(format!("--variant={text}").into());
                    continue;
                } else if !text.starts_with('-') {
                    version_seen = true;
                }
                routed.push(arg);
            }
        }
    }

    routed
}

/// `+name` or `-name`, but not a cluster of known short flags like `-vq`
fn is_variant_token(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some('+'), Some(c)) => c.is_ascii_alphabetic(),
        (Some('-'), Some(c)) if c.is_ascii_alphabetic() => {
            !text[1..].chars().all(|c| matches!(c, 'v' | 'q' | 'h'))
        }
        _ => false,
    }
}
