//! Print the index of a container.

use crate::error::CommandError;
use advhd_formats::ContainerKind;
use advhd_formats::arc::ArcReader;
use advhd_formats::pna::{PnaFile, frame_file_name};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Identify `input` and print its index to stdout
///
/// # Errors
///
/// Returns `CommandError::Unrecognized` if the file is neither an ARC nor a
/// PNA container, or the parse error if its index is damaged.
pub fn run(input: &Path) -> Result<()> {
    let kind = ContainerKind::identify_file(input)
        .with_context(|| format!("reading {}", input.display()))?
        .ok_or_else(|| CommandError::Unrecognized(input.to_path_buf()))?;

    let reader = BufReader::new(File::open(input)?);
    match kind {
        ContainerKind::Arc => inspect_arc(input, reader),
        ContainerKind::Pna => inspect_pna(input, reader),
    }
}

fn inspect_arc(input: &Path, reader: BufReader<File>) -> Result<()> {
    let arc = ArcReader::new(reader).with_context(|| format!("parsing {}", input.display()))?;
    let header = arc.header();

    println!("{} (ARC)", input.display());
    println!("  Entries:      {}", header.entry_count);
    println!("  Index size:   {} bytes", header.index_size);
    println!("  Payload base: {:#x}", arc.base_offset());
    println!();
    println!("  {:>10}  {:>10}  Name", "Offset", "Size");

    let mut out_of_bounds = 0usize;
    for entry in arc.entries() {
        let marker = if entry.fits_within(arc.stream_len()) {
            ""
        } else {
            out_of_bounds += 1;
            "  (out of bounds)"
        };
        println!(
            "  {:>#10x}  {:>10}  {}{}",
            entry.offset, entry.size, entry.name, marker
        );
    }

    if out_of_bounds > 0 {
        println!();
        println!("  {out_of_bounds} entries lie outside the archive");
    }
    Ok(())
}

fn inspect_pna(input: &Path, mut reader: BufReader<File>) -> Result<()> {
    let pna = PnaFile::read_from(&mut reader)
        .with_context(|| format!("parsing {}", input.display()))?;

    println!("{} (PNA)", input.display());
    println!("  Frames: {}", pna.header.frame_count);
    println!();
    println!(
        "  {:>5}  {:>7}  {:>7}  {:>6}  {:>6}  {:>10}  File",
        "Index", "X", "Y", "Width", "Height", "Size"
    );

    for (i, frame) in pna.frames.iter().enumerate() {
        let r = &frame.record;
        let file = if frame.is_exported() {
            frame_file_name(i)
        } else {
            "-".to_string()
        };
        println!(
            "  {:>5}  {:>7}  {:>7}  {:>6}  {:>6}  {:>10}  {}",
            i,
            r.offset_x(),
            r.offset_y(),
            r.width(),
            r.height(),
            r.frame_size(),
            file
        );
    }
    Ok(())
}
