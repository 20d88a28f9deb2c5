//! Unpacking archives to directories and packing directories to archives

use crate::arc::builder::ArcBuilder;
use crate::arc::entry::ArcEntry;
use crate::arc::error::{ArcError, ArcResult};
use crate::arc::reader::{ArcReader, SkippedEntry};
use crate::obfuscation::ObfuscationRule;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of [`unpack_to_dir`]
#[derive(Debug, Default)]
pub struct UnpackReport {
    /// Number of entries written to disk
    pub extracted: usize,
    /// Entries that were reported and skipped
    pub skipped: Vec<SkippedEntry>,
}

/// Outcome of [`pack_dir`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackReport {
    /// Number of entries in the archive
    pub entries: usize,
    /// Size of the written archive in bytes
    pub archive_size: u64,
}

/// Extract every entry of `archive` below `output_dir`
///
/// The header and index are validated before anything on disk changes. An
/// existing `output_dir` is then removed and recreated so no stale files
/// survive from a previous run. Entries that are out of bounds or whose
/// names would escape `output_dir` are skipped and listed in the report.
pub fn unpack_to_dir(
    archive: &Path,
    output_dir: &Path,
    rule: &ObfuscationRule,
) -> ArcResult<UnpackReport> {
    info!("Unpacking {}", archive.display());

    let file = File::open(archive)?;
    let mut reader = ArcReader::new(BufReader::new(file))?;
    info!(
        "Found {} entries, index size {} bytes",
        reader.entries().len(),
        reader.header().index_size
    );

    if output_dir.exists() {
        debug!("Clearing existing output directory {}", output_dir.display());
        fs::remove_dir_all(output_dir)?;
    }
    fs::create_dir_all(output_dir)?;

    let entries: Vec<ArcEntry> = reader.entries().to_vec();
    let mut report = UnpackReport::default();

    for entry in &entries {
        let result = entry_path(output_dir, &entry.name)
            .and_then(|path| reader.read_entry(entry, rule).map(|data| (path, data)));

        match result {
            Ok((path, data)) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, &data)?;
                debug!("Extracted {} ({} bytes)", entry.name, data.len());
                report.extracted += 1;
            }
            Err(e) if e.is_entry_level() => {
                warn!("Skipping {}: {}", entry.name, e);
                report.skipped.push(SkippedEntry {
                    name: entry.name.clone(),
                    error: e,
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Unpacked {}: {} extracted, {} skipped",
        archive.display(),
        report.extracted,
        report.skipped.len()
    );
    Ok(report)
}

/// Pack every file below `input_dir` into `archive`
///
/// Entry names are paths relative to `input_dir` with `/` separators, in
/// the order [`collect_dir`] returns them. Fails with
/// [`ArcError::EmptyInput`] without creating `archive` when the directory
/// holds no files. An existing `archive` is replaced only after the new one
/// has been built.
pub fn pack_dir(input_dir: &Path, archive: &Path, rule: &ObfuscationRule) -> ArcResult<PackReport> {
    info!("Packing {}", input_dir.display());

    let files = collect_dir(input_dir)?;
    if files.is_empty() {
        warn!("Input directory {} is empty, nothing packed", input_dir.display());
        return Err(ArcError::EmptyInput);
    }

    let mut builder = ArcBuilder::new();
    for (name, path) in files {
        let data = fs::read(&path)?;
        if rule.matches(&name) {
            debug!("Adding {} ({} bytes, obfuscated)", name, data.len());
        } else {
            debug!("Adding {} ({} bytes)", name, data.len());
        }
        builder.add_file(name, data);
    }

    let archive_size = write_archive(&builder, archive, rule)?;

    info!(
        "Wrote {} ({} entries, {} bytes)",
        archive.display(),
        builder.len(),
        archive_size
    );

    Ok(PackReport {
        entries: builder.len(),
        archive_size,
    })
}

// Built in memory so a failed build never truncates an existing archive
fn write_archive(builder: &ArcBuilder, archive: &Path, rule: &ObfuscationRule) -> ArcResult<u64> {
    let data = builder.build(rule)?;

    if let Some(parent) = archive.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(archive, &data)?;
    Ok(data.len() as u64)
}

/// List the files below `input_dir` as `(entry name, path)` pairs
///
/// The walk is depth-first with siblings sorted by file name, so the order
/// is stable across runs and platforms.
pub fn collect_dir(input_dir: &Path) -> ArcResult<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for ent in WalkDir::new(input_dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let ent = ent.map_err(|e| {
            let msg = e.to_string();
            ArcError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other(msg)),
            )
        })?;

        if !ent.file_type().is_file() {
            continue;
        }

        let name = relative_name(input_dir, ent.path())?;
        files.push((name, ent.path().to_path_buf()));
    }

    Ok(files)
}

/// Entry name for `file_path` relative to `root`, `/` separated
pub fn relative_name(root: &Path, file_path: &Path) -> ArcResult<String> {
    let rel = file_path
        .strip_prefix(root)
        .map_err(|_| ArcError::OutsideRoot(file_path.to_string_lossy().into_owned()))?;

    let name = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace('\\', "/");

    if name.is_empty() {
        return Err(ArcError::UnsafeName(name));
    }
    Ok(name)
}

/// Map an entry name to a path below `output_dir`
///
/// Both `/` and `\` separate components. Empty names, absolute names and
/// names with `..` components are rejected.
pub fn entry_path(output_dir: &Path, name: &str) -> ArcResult<PathBuf> {
    let unsafe_name = || ArcError::UnsafeName(name.to_string());

    if name.starts_with(['/', '\\']) {
        return Err(unsafe_name());
    }

    let mut path = output_dir.to_path_buf();
    let mut depth = 0usize;

    for part in name.split(['/', '\\']) {
        if part.is_empty() || part == "." {
            continue;
        }
        // Reject anything that is not a plain file name, e.g. "..", "C:"
        let mut comps = Path::new(part).components();
        match (comps.next(), comps.next()) {
            (Some(Component::Normal(_)), None) if !part.contains(':') => {}
            _ => return Err(unsafe_name()),
        }
        path.push(part);
        depth += 1;
    }

    if depth == 0 {
        return Err(unsafe_name());
    }
    Ok(path)
}
