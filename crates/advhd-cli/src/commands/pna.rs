//! PNA unpack, repack and format-directory commands.
//!
//! A format directory has this layout:
//!
//! ```text
//! pna/
//! ├── orig/            source containers (any depth)
//! ├── png/<name>/      extracted frames, 000.png, 001.png, ...
//! ├── metadata/<name>.json
//! ├── fix/<name>/      edited frames
//! └── new/             rebuilt containers
//! ```
//!
//! `<name>` is the container's file name, extension included.

use super::{file_name, list_dir, require_dir};
use crate::batch::{BatchReport, run_batch};
use crate::config::ToolConfig;
use advhd_formats::format::has_pna_extension;
use advhd_formats::pna::{self, metadata};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

const ORIG_DIR: &str = "orig";
const PNG_DIR: &str = "png";
const METADATA_DIR: &str = "metadata";
const NEW_DIR: &str = "new";

/// Unpack one container and write its sidecar
///
/// # Errors
///
/// Fails if the container cannot be parsed or the outputs cannot be written.
pub fn unpack(input: &Path, output: Option<&Path>, sidecar: Option<&Path>) -> Result<()> {
    let frames = output.map_or_else(|| input.with_extension(""), Path::to_path_buf);
    let sidecar = sidecar.map_or_else(|| input.with_extension("json"), Path::to_path_buf);

    let meta = pna::fs::unpack_to_dir(input, &frames)
        .with_context(|| format!("unpacking {}", input.display()))?;
    metadata::write_sidecar(&sidecar, &meta)
        .with_context(|| format!("writing {}", sidecar.display()))?;

    info!(
        "{} -> {} ({} frames), metadata {}",
        input.display(),
        frames.display(),
        meta.frames.len(),
        sidecar.display()
    );
    Ok(())
}

/// Rebuild one container from a frame directory and its sidecar
///
/// # Errors
///
/// Fails with the sidecar or frame that is missing, or on I/O errors.
pub fn repack(input: &Path, sidecar: Option<&Path>, output: &Path) -> Result<()> {
    let sidecar = sidecar.map_or_else(|| input.with_extension("json"), Path::to_path_buf);
    let meta = metadata::read_sidecar(&sidecar)?;
    pna::fs::repack_from_dir(input, &meta, output)
        .with_context(|| format!("repacking {}", input.display()))?;
    Ok(())
}

/// Unpack every container under `<format_dir>/orig`
///
/// Sidecars written by an earlier sorting pass are merged, not replaced.
///
/// # Errors
///
/// Fails if `orig/` is missing, or with `CommandError::BatchFailed` when
/// any container fails.
pub fn convert(config: &ToolConfig, format_dir: &Path) -> Result<BatchReport> {
    let orig = format_dir.join(ORIG_DIR);
    require_dir(&orig, "orig directory")?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&orig).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", orig.display()))?;
        if entry.file_type().is_file() && has_pna_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    if files.is_empty() {
        warn!("No .pna files under {}", orig.display());
    }

    let png = format_dir.join(PNG_DIR);
    let meta_dir = format_dir.join(METADATA_DIR);
    let pool = config.thread_pool()?;
    let report = run_batch(&pool, "convert", &files, |file| {
        convert_one(file, &orig, &png, &meta_dir)
    });
    Ok(report.into_result()?)
}

/// Repack every frame directory under `<format_dir>/<source>` into `new/`
///
/// The output file name comes from the sidecar's `OriginalRelativePath`
/// when present, otherwise from the frame directory's name.
///
/// # Errors
///
/// Returns `CommandError::BatchFailed` when any directory fails, e.g. with
/// a missing sidecar or frame.
pub fn repack_all(config: &ToolConfig, format_dir: &Path, source: &str) -> Result<BatchReport> {
    let source_dir = format_dir.join(source);
    require_dir(&source_dir, "source directory")?;

    let dirs = list_dir(&source_dir, Path::is_dir)?;
    if dirs.is_empty() {
        warn!("No frame directories in {}", source_dir.display());
    }

    let meta_dir = format_dir.join(METADATA_DIR);
    let new_dir = format_dir.join(NEW_DIR);
    let pool = config.thread_pool()?;
    let report = run_batch(&pool, "repack", &dirs, |dir| {
        repack_one(dir, &meta_dir, &new_dir)
    });
    Ok(report.into_result()?)
}

/// Sidecar path for a container or frame directory named `name`
pub fn sidecar_path(meta_dir: &Path, name: &str) -> PathBuf {
    meta_dir.join(format!("{name}.json"))
}

fn convert_one(file: &Path, orig: &Path, png: &Path, meta_dir: &Path) -> Result<()> {
    let name = file_name(file)?;
    let frames = png.join(&name);
    let sidecar = sidecar_path(meta_dir, &name);

    let mut meta = pna::fs::unpack_to_dir(file, &frames)
        .with_context(|| format!("converting {}", file.display()))?;
    if !sidecar.exists() {
        meta.original_relative_path = file
            .strip_prefix(orig)
            .ok()
            .map(|rel| rel.to_string_lossy().replace('\\', "/"));
    }
    metadata::write_sidecar(&sidecar, &meta)
        .with_context(|| format!("writing {}", sidecar.display()))?;
    Ok(())
}

fn repack_one(dir: &Path, meta_dir: &Path, new_dir: &Path) -> Result<()> {
    let name = file_name(dir)?;
    let meta = metadata::read_sidecar(&sidecar_path(meta_dir, &name))?;

    let out_name = meta
        .original_relative_path
        .as_deref()
        .and_then(|p| p.rsplit(['/', '\\']).next())
        .filter(|n| !n.is_empty())
        .map_or(name, str::to_string);

    let dest = new_dir.join(out_name);
    pna::fs::repack_from_dir(dir, &meta, &dest)
        .with_context(|| format!("repacking {}", dir.display()))?;
    Ok(())
}
