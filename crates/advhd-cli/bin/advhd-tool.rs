//! advhd-tool binary entry point.
//!
//! This is a thin wrapper around the advhd-cli library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Validates configuration
//! 4. Runs the selected command
//!
//! Set `RUST_LOG` to override the log filter; `--verbose` raises the default
//! from `info` to `debug`.

use advhd_cli::Cli;
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(cli.config.default_log_level())
            }),
        )
        .with_target(false)
        .init();

    tracing::debug!("Configuration: {:?}", cli.config);

    cli.config.validate()?;
    advhd_cli::run(cli)
}
