//! Unpacking PNA containers to numbered image files and repacking them

use crate::pna::builder::PnaBuilder;
use crate::pna::error::{PnaError, PnaResult};
use crate::pna::frame::{PnaFrameRecord, frame_file_name};
use crate::pna::metadata::PnaMetadata;
use crate::pna::parser::read_pna;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Write every exported frame of `pna_path` into `frames_dir`
///
/// Frames are written as `NNN.png` by record index; zero-geometry frames get
/// no file. The returned metadata lists every record, exported or not.
pub fn unpack_to_dir(pna_path: &Path, frames_dir: &Path) -> PnaResult<PnaMetadata> {
    info!("Unpacking {}", pna_path.display());

    let mut reader = BufReader::new(File::open(pna_path)?);
    let (header, frames) = read_pna(&mut reader)?;

    fs::create_dir_all(frames_dir)?;

    let mut exported = 0usize;
    for (i, frame) in frames.iter().enumerate() {
        let Some(payload) = frame.payload.as_deref().filter(|_| frame.is_exported()) else {
            debug!("Frame {} has no image, skipped", i);
            continue;
        };
        let path = frames_dir.join(frame_file_name(i));
        fs::write(&path, payload)?;
        debug!("Wrote {} ({} bytes)", path.display(), payload.len());
        exported += 1;
    }

    info!(
        "Unpacked {}: {} frames, {} exported",
        pna_path.display(),
        header.frame_count,
        exported
    );

    Ok(PnaMetadata::from_records(frames.into_iter().map(|f| f.record)))
}

/// Rebuild a container at `dest` from `metadata` and the images in `frames_dir`
///
/// Each frame with geometry reads `frames_dir/NNN.png`. A missing image
/// fails with [`PnaError::MissingFrame`] before `dest` is created. Returns
/// the records as written.
pub fn repack_from_dir(
    frames_dir: &Path,
    metadata: &PnaMetadata,
    dest: &Path,
) -> PnaResult<Vec<PnaFrameRecord>> {
    info!("Repacking {} into {}", frames_dir.display(), dest.display());

    let mut builder = PnaBuilder::from_metadata(metadata);
    let required: Vec<usize> = builder.required_frames().collect();
    for i in required {
        let name = frame_file_name(i);
        let path = frames_dir.join(&name);
        if !path.is_file() {
            return Err(PnaError::MissingFrame { index: i, name });
        }
        let data = fs::read(&path)?;
        debug!("Frame {} from {} ({} bytes)", i, name, data.len());
        builder.replace_frame(i, data);
    }

    let mut cursor = std::io::Cursor::new(Vec::new());
    let records = builder.write_to(&mut cursor)?;
    let data = cursor.into_inner();

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, &data)?;

    info!(
        "Wrote {} ({} frames, {} bytes)",
        dest.display(),
        records.len(),
        data.len()
    );
    Ok(records)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{frame_record, raw_pna};

    #[test]
    fn test_unpack_writes_only_exported_frames() {
        let dir = tempfile::tempdir().unwrap();
        let pna = dir.path().join("face.pna");
        let records = [
            frame_record(0, 0, 0, 0, 0),
            frame_record(1, 1, 2, 2, 3),
        ];
        fs::write(&pna, raw_pna(&records, &[vec![7, 8, 9]])).unwrap();

        let out = dir.path().join("png").join("face");
        let meta = unpack_to_dir(&pna, &out).unwrap();

        assert_eq!(meta.records(), records.to_vec());
        assert!(!out.join("000.png").exists());
        assert_eq!(fs::read(out.join("001.png")).unwrap(), vec![7, 8, 9]);
    }

    #[test]
    fn test_repack_missing_frame_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let meta = PnaMetadata::from_records([frame_record(0, 0, 4, 4, 16)]);
        let dest = dir.path().join("new").join("face.pna");

        let err = repack_from_dir(dir.path(), &meta, &dest).unwrap_err();
        assert!(matches!(err, PnaError::MissingFrame { index: 0, .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_repack_reads_numbered_frames() {
        let dir = tempfile::tempdir().unwrap();
        let frames = dir.path().join("fix");
        fs::create_dir_all(&frames).unwrap();
        fs::write(frames.join("000.png"), [1u8; 5]).unwrap();

        let meta = PnaMetadata::from_records([frame_record(0, 0, 4, 4, 16)]);
        let dest = dir.path().join("new").join("face.pna");
        let records = repack_from_dir(&frames, &meta, &dest).unwrap();

        assert_eq!(records[0].frame_size(), 5);
        let data = fs::read(&dest).unwrap();
        assert_eq!(&data[0x14 + 40..], &[1u8; 5]);
    }
}
