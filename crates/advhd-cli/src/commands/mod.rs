//! Command handlers.

pub mod arc;
pub mod inspect;
pub mod pna;

use crate::config::{Cli, Command};
use crate::error::CommandError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Run the command selected on the command line
///
/// # Errors
///
/// Returns the first fatal error of a single-container command, or
/// `CommandError::BatchFailed` when any unit of a batch failed.
pub fn handle(cli: Cli) -> Result<()> {
    let config = &cli.config;
    match cli.command {
        Command::UnpackArc { input, output } => arc::unpack(config, &input, output.as_deref()),
        Command::PackArc {
            input,
            all,
            ext,
            output,
        } => {
            if all {
                arc::pack_all(config, &input, &ext).map(|_| ())
            } else {
                arc::pack(config, &input, &ext, output.as_deref())
            }
        }
        Command::PnaUnpack {
            input,
            output,
            metadata,
        } => pna::unpack(&input, output.as_deref(), metadata.as_deref()),
        Command::PnaRepack {
            input,
            metadata,
            output,
        } => pna::repack(&input, metadata.as_deref(), &output),
        Command::PnaConvert { format_dir } => pna::convert(config, &format_dir).map(|_| ()),
        Command::PnaRepackAll { format_dir, source } => {
            pna::repack_all(config, &format_dir, &source).map(|_| ())
        }
        Command::Inspect { input } => inspect::run(&input),
    }
}

/// Immediate children of `dir` matching `keep`, sorted by path
pub(crate) fn list_dir(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Fail with `NotFound` unless `path` is a directory
pub(crate) fn require_dir(path: &Path, what: &'static str) -> Result<(), CommandError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CommandError::NotFound {
            what,
            path: path.to_path_buf(),
        })
    }
}

/// Final path component as a string
pub(crate) fn file_name(path: &Path) -> Result<String, CommandError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CommandError::NoFileName(path.to_path_buf()))
}
