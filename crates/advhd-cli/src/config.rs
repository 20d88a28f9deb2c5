//! Command-line configuration.
//!
//! Options shared by every command can also come from the environment:
//!
//! - `ADVHD_OBFUSCATED_SUFFIX`: entry suffix that carries the byte rotation
//! - `ADVHD_JOBS`: worker count for batch commands
//!
//! # Example
//!
//! ```
//! use advhd_cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::try_parse_from(["advhd-tool", "--jobs", "4", "unpack-arc", "Rio.arc"]).unwrap();
//! cli.config.validate().unwrap();
//! assert!(cli.config.rule().is_enabled());
//! ```

use crate::error::ConfigError;
use advhd_formats::obfuscation::{DEFAULT_OBFUSCATED_SUFFIX, ObfuscationRule};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default extension for packed archives
pub const DEFAULT_ARCHIVE_EXTENSION: &str = ".arc";

/// Top-level arguments
#[derive(Debug, Clone, Parser)]
#[command(
    name = "advhd-tool",
    about = "Unpack and repack AdvHD ARC archives and PNA sprite containers",
    version
)]
pub struct Cli {
    /// Options shared by all commands
    #[command(flatten)]
    pub config: ToolConfig,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by all commands
#[derive(Debug, Clone, Args)]
pub struct ToolConfig {
    /// Entry name suffix whose payloads are stored rotated
    #[arg(
        long,
        global = true,
        env = "ADVHD_OBFUSCATED_SUFFIX",
        default_value = DEFAULT_OBFUSCATED_SUFFIX
    )]
    pub obfuscated_suffix: String,

    /// Store and extract every payload as-is
    #[arg(long, global = true)]
    pub no_obfuscation: bool,

    /// Worker threads for batch commands (defaults to the number of CPUs)
    #[arg(short, long, global = true, env = "ADVHD_JOBS")]
    pub jobs: Option<usize>,

    /// Log per-entry detail
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Unpack an archive, or every .arc/.dat/.bin file in a directory
    UnpackArc {
        /// Archive file or directory of archives
        input: PathBuf,

        /// Output directory (single archive only; defaults to the archive's stem)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Pack a directory into an archive next to it
    PackArc {
        /// Directory to pack, or parent of the directories to pack with --all
        input: PathBuf,

        /// Pack every immediate subdirectory of INPUT
        #[arg(long)]
        all: bool,

        /// Archive extension
        #[arg(long, default_value = DEFAULT_ARCHIVE_EXTENSION)]
        ext: String,

        /// Output archive path (single directory only)
        #[arg(short, long, conflicts_with = "all")]
        output: Option<PathBuf>,
    },

    /// Extract the frames of a PNA container and write its sidecar
    PnaUnpack {
        /// PNA file
        input: PathBuf,

        /// Frame output directory (defaults to the file's stem)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sidecar path (defaults to `<stem>.json`)
        #[arg(short, long)]
        metadata: Option<PathBuf>,
    },

    /// Rebuild a PNA container from numbered frames and a sidecar
    PnaRepack {
        /// Directory holding `000.png`, `001.png`, ...
        input: PathBuf,

        /// Sidecar path (defaults to `<input>.json`)
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Output PNA path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Unpack every container under `<dir>/orig` into `png/` and `metadata/`
    PnaConvert {
        /// Format directory containing `orig/`
        format_dir: PathBuf,
    },

    /// Repack every frame directory under `<dir>/fix` into `new/`
    PnaRepackAll {
        /// Format directory containing `metadata/` and the source directory
        format_dir: PathBuf,

        /// Name of the directory holding edited frame directories
        #[arg(long, default_value = "fix")]
        source: String,
    },

    /// Identify a container and print its index
    Inspect {
        /// ARC or PNA file
        input: PathBuf,
    },
}

impl ToolConfig {
    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the obfuscated suffix is empty or `jobs` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.obfuscated_suffix.is_empty() {
            return Err(ConfigError::EmptySuffix);
        }
        if self.jobs == Some(0) {
            return Err(ConfigError::InvalidJobs);
        }
        Ok(())
    }

    /// The obfuscation rule these options describe
    #[must_use]
    pub fn rule(&self) -> ObfuscationRule {
        ObfuscationRule::new(self.obfuscated_suffix.clone()).enabled(!self.no_obfuscation)
    }

    /// Default log filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn default_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Build the worker pool for batch commands
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ThreadPool` if the pool cannot be created.
    pub fn thread_pool(&self) -> Result<rayon::ThreadPool, ConfigError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()
            .map_err(ConfigError::ThreadPool)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            obfuscated_suffix: DEFAULT_OBFUSCATED_SUFFIX.to_string(),
            no_obfuscation: false,
            jobs: None,
            verbose: false,
        }
    }
}

/// Normalise an archive extension to start with a dot
///
/// An empty extension falls back to [`DEFAULT_ARCHIVE_EXTENSION`].
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    match ext {
        "" | "." => DEFAULT_ARCHIVE_EXTENSION.to_string(),
        e if e.starts_with('.') => e.to_string(),
        e => format!(".{e}"),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["advhd-tool", "inspect", "a.arc"]).unwrap();
        assert_eq!(cli.config.obfuscated_suffix, ".ws2");
        assert!(!cli.config.no_obfuscation);
        assert_eq!(cli.config.default_log_level(), "info");
        assert!(cli.config.validate().is_ok());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "advhd-tool",
            "pack-arc",
            "Rio",
            "--all",
            "--ext",
            "dat",
            "--no-obfuscation",
            "-v",
        ])
        .unwrap();

        assert!(!cli.config.rule().is_enabled());
        assert_eq!(cli.config.default_log_level(), "debug");
        match cli.command {
            Command::PackArc { all, ext, .. } => {
                assert!(all);
                assert_eq!(normalize_extension(&ext), ".dat");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_output_conflicts_with_all() {
        assert!(
            Cli::try_parse_from(["advhd-tool", "pack-arc", "Rio", "--all", "-o", "x.arc"]).is_err()
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ToolConfig {
            obfuscated_suffix: String::new(),
            ..ToolConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptySuffix)));

        let config = ToolConfig {
            jobs: Some(0),
            ..ToolConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidJobs)));
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".arc"), ".arc");
        assert_eq!(normalize_extension("dat"), ".dat");
        assert_eq!(normalize_extension(""), ".arc");
        assert_eq!(normalize_extension("."), ".arc");
    }

    #[test]
    fn test_rule_uses_custom_suffix() {
        let config = ToolConfig {
            obfuscated_suffix: ".scr".to_string(),
            ..ToolConfig::default()
        };
        let rule = config.rule();
        assert!(rule.matches("a/b.SCR"));
        assert!(!rule.matches("a/b.ws2"));
    }
}
