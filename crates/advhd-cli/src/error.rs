//! Error types for the command-line tool.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Obfuscated suffix is empty
    #[error("obfuscated suffix must not be empty")]
    EmptySuffix,

    /// Worker count of zero
    #[error("--jobs must be at least 1")]
    InvalidJobs,

    /// Worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[source] rayon::ThreadPoolBuildError),
}

/// Command-level errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Path does not exist or has the wrong type
    #[error("{what} not found: {}", path.display())]
    NotFound {
        /// What was expected at the path
        what: &'static str,
        /// The missing path
        path: PathBuf,
    },

    /// Batch pack target has no subdirectories
    #[error("no subdirectories to pack in {}", .0.display())]
    NoSubdirectories(PathBuf),

    /// Path has no usable final component
    #[error("cannot derive an output name from {}", .0.display())]
    NoFileName(PathBuf),

    /// File is not a recognised container
    #[error("not an ARC or PNA container: {}", .0.display())]
    Unrecognized(PathBuf),

    /// One or more units of a batch failed
    #[error("{failed} of {total} {label} operations failed")]
    BatchFailed {
        /// Operation name
        label: &'static str,
        /// Failed units
        failed: usize,
        /// Total units
        total: usize,
    },
}
