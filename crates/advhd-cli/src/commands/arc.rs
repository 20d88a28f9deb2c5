//! ARC unpack and pack commands.

use super::{file_name, list_dir, require_dir};
use crate::batch::{BatchReport, run_batch};
use crate::config::{ToolConfig, normalize_extension};
use crate::error::CommandError;
use advhd_formats::arc::{ArcError, fs as arc_fs};
use advhd_formats::format::has_arc_extension;
use advhd_formats::obfuscation::ObfuscationRule;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Unpack one archive, or every archive directly inside a directory
///
/// # Errors
///
/// Fails on the first fatal error of a single archive, or when any archive
/// of a batch fails.
pub fn unpack(config: &ToolConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let rule = config.rule();

    if input.is_dir() {
        if output.is_some() {
            warn!("--output is ignored when unpacking a directory");
        }
        unpack_all(config, input)?;
        return Ok(());
    }

    let output = output.map_or_else(|| unpack_dir_for(input), Path::to_path_buf);
    unpack_one(input, &output, &rule)
}

/// Unpack every `.arc`/`.dat`/`.bin` file directly inside `dir`
///
/// Each archive is extracted into a sibling directory named after its stem.
///
/// # Errors
///
/// Returns `CommandError::BatchFailed` when any archive fails.
pub fn unpack_all(config: &ToolConfig, dir: &Path) -> Result<BatchReport> {
    require_dir(dir, "archive directory")?;
    let archives = list_dir(dir, |p| p.is_file() && has_arc_extension(p))?;
    if archives.is_empty() {
        warn!("No .arc, .dat or .bin files in {}", dir.display());
    }

    let rule = config.rule();
    let pool = config.thread_pool()?;
    let report = run_batch(&pool, "unpack", &archives, |archive| {
        unpack_one(archive, &unpack_dir_for(archive), &rule)
    });
    Ok(report.into_result()?)
}

/// Pack `input` into `<parent>/<dirname><ext>`, or into `output` if given
///
/// An empty directory is reported and produces no archive.
///
/// # Errors
///
/// Fails if the directory is missing or the archive cannot be written.
pub fn pack(config: &ToolConfig, input: &Path, ext: &str, output: Option<&Path>) -> Result<()> {
    require_dir(input, "input directory")?;
    let archive = match output {
        Some(path) => path.to_path_buf(),
        None => archive_path_for(input, &normalize_extension(ext))?,
    };
    pack_one(input, &archive, &config.rule())
}

/// Pack every immediate subdirectory of `parent` next to itself
///
/// # Errors
///
/// Returns `CommandError::NoSubdirectories` when `parent` has none, and
/// `CommandError::BatchFailed` when any directory fails.
pub fn pack_all(config: &ToolConfig, parent: &Path, ext: &str) -> Result<BatchReport> {
    require_dir(parent, "input directory")?;
    let dirs = list_dir(parent, Path::is_dir)?;
    if dirs.is_empty() {
        return Err(CommandError::NoSubdirectories(parent.to_path_buf()).into());
    }

    let ext = normalize_extension(ext);
    let rule = config.rule();
    let pool = config.thread_pool()?;
    let report = run_batch(&pool, "pack", &dirs, |dir| {
        pack_one(dir, &archive_path_for(dir, &ext)?, &rule)
    });
    Ok(report.into_result()?)
}

/// Output directory for an archive: its path without the extension
pub fn unpack_dir_for(archive: &Path) -> PathBuf {
    archive.with_extension("")
}

/// Archive path for a directory: `<parent>/<dirname><ext>`
///
/// # Errors
///
/// Returns `CommandError::NoFileName` if the directory name cannot be
/// determined.
pub fn archive_path_for(dir: &Path, ext: &str) -> Result<PathBuf, CommandError> {
    let resolved = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
    let name = file_name(&resolved)?;
    Ok(resolved.with_file_name(format!("{name}{ext}")))
}

fn unpack_one(archive: &Path, output: &Path, rule: &ObfuscationRule) -> Result<()> {
    let report = arc_fs::unpack_to_dir(archive, output, rule)
        .with_context(|| format!("unpacking {}", archive.display()))?;
    if !report.skipped.is_empty() {
        warn!(
            "{}: {} entries skipped",
            archive.display(),
            report.skipped.len()
        );
    }
    info!("{} -> {}", archive.display(), output.display());
    Ok(())
}

fn pack_one(dir: &Path, archive: &Path, rule: &ObfuscationRule) -> Result<()> {
    match arc_fs::pack_dir(dir, archive, rule) {
        Ok(report) => {
            info!(
                "{} -> {} ({} entries)",
                dir.display(),
                archive.display(),
                report.entries
            );
            Ok(())
        }
        // Already warned; nothing to write is not a failure
        Err(ArcError::EmptyInput) => Ok(()),
        Err(e) => Err(e).with_context(|| format!("packing {}", dir.display())),
    }
}
