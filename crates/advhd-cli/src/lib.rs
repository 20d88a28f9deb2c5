//! Command-line unpacker and repacker for AdvHD containers.
//!
//! This crate is the library half of the `advhd-tool` binary. It maps
//! command-line options onto the codecs in `advhd-formats` and runs batch
//! operations on a worker pool:
//!
//! - `config`: argument parsing and validation
//! - `commands`: one handler per subcommand
//! - `batch`: parallel execution with aggregate success/failure counts
//! - `error`: configuration and command errors
//!
//! # Example
//!
//! ```no_run
//! use advhd_cli::Cli;
//! use clap::Parser;
//!
//! fn main() -> anyhow::Result<()> {
//!     let cli = Cli::parse();
//!     cli.config.validate()?;
//!     advhd_cli::run(cli)
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod batch;
pub mod commands;
pub mod config;
pub mod error;

pub use batch::{BatchFailure, BatchReport, run_batch};
pub use config::{Cli, Command, ToolConfig};
pub use error::{CommandError, ConfigError};

/// Run the selected command
///
/// # Errors
///
/// Propagates the command's error; batch commands fail when any unit failed.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    commands::handle(cli)
}
