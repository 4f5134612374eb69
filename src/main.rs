//! phpbuild CLI - build PHP from source
//!
//! Entry point for the phpbuild command-line application.

use anyhow::Result;

use phpbuild::cli::output::{display_error, init_tracing};
use phpbuild::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose, cli.quiet);

    // Run the command and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
