//! PNA sprite container implementation
//!
//! A PNA holds the frames of a layered sprite: a fixed header, one 40-byte
//! record per frame and the embedded images back to back. Each image is
//! already a complete image file and is treated as an opaque blob.
//!
//! # Format Structure
//!
//! ```text
//! PNA File:
//! ├── Header (0x14 bytes, little-endian)
//! │   ├── Magic: "PNAP" (4 bytes)
//! │   ├── Reserved (12 bytes)
//! │   └── Frame Count (i32)
//! ├── Frame Records (frame_count x 40 bytes)
//! │   └── Per record: offset_x, offset_y, width, height, frame_size, opaque bytes
//! └── Payloads (from 0x14 + frame_count * 40, in record order, no padding)
//! ```
//!
//! Frames with zero width or height carry no image. On repack only the
//! `frame_size` field of each record is rewritten.
//!
//! # Usage
//!
//! ```rust
//! use advhd_formats::pna::{PnaBuilder, PnaFile, PnaFrameRecord};
//!
//! let mut raw = [0u8; 40];
//! raw[16..20].copy_from_slice(&2u32.to_le_bytes()); // width
//! raw[20..24].copy_from_slice(&2u32.to_le_bytes()); // height
//!
//! let mut builder = PnaBuilder::new(vec![PnaFrameRecord::from_bytes(raw)]);
//! builder.replace_frame(0, vec![0xAB; 8]);
//! let data = builder.build()?;
//!
//! let pna = PnaFile::from_bytes(&data)?;
//! assert_eq!(pna.frames[0].record.frame_size(), 8);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod error;
mod frame;
pub mod fs;
mod header;
pub mod metadata;
mod parser;

pub use builder::PnaBuilder;
pub use error::{PnaError, PnaResult};
pub use frame::{
    FRAME_RECORD_SIZE, FrameInfo, PnaFrame, PnaFrameRecord, frame_file_name, frame_stem,
};
pub use header::{HEADER_SIZE, PNA_MAGIC, PnaHeader};
pub use metadata::{PnaFrameEntry, PnaMetadata, read_sidecar, write_sidecar};
pub use parser::payload_start;

use std::io::{Cursor, Read, Seek};

/// A parsed PNA container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PnaFile {
    /// Container header, reserved bytes included
    pub header: PnaHeader,
    /// Frames in record order
    pub frames: Vec<PnaFrame>,
}

impl PnaFile {
    /// Parse a container from a stream
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> PnaResult<Self> {
        let (header, frames) = parser::read_pna(reader)?;
        Ok(Self { header, frames })
    }

    /// Parse a container held in memory
    pub fn from_bytes(data: &[u8]) -> PnaResult<Self> {
        Self::read_from(&mut Cursor::new(data))
    }

    /// Frame records in order
    pub fn records(&self) -> Vec<PnaFrameRecord> {
        self.frames.iter().map(|f| f.record).collect()
    }

    /// Sidecar metadata describing every frame
    pub fn metadata(&self) -> PnaMetadata {
        PnaMetadata::from_records(self.records())
    }

    /// Frames that get a numbered image file, with their index
    pub fn exported_frames(&self) -> impl Iterator<Item = (usize, &PnaFrame)> {
        self.frames.iter().enumerate().filter(|(_, f)| f.is_exported())
    }

    /// Rebuild the container with its current payloads and reserved bytes
    pub fn to_bytes(&self) -> PnaResult<Vec<u8>> {
        let mut builder = PnaBuilder::new(self.records()).reserved(self.header.reserved);
        for (i, frame) in self.frames.iter().enumerate() {
            if frame.record.has_geometry() {
                builder.replace_frame(i, frame.payload.clone().unwrap_or_default());
            }
        }
        builder.build()
    }
}

impl crate::AdvhdFormat for PnaFile {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::from_bytes(data)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(self.to_bytes()?)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::AdvhdFormat;
    use crate::test_utils::{frame_record, raw_pna, test_round_trip};

    #[test]
    fn test_two_frame_scenario() {
        let records = [frame_record(0, 0, 10, 10, 100), frame_record(0, 0, 0, 0, 0)];
        let data = raw_pna(&records, &[vec![0x11; 100]]);

        let pna = PnaFile::parse(&data).unwrap();
        let exported: Vec<usize> = pna.exported_frames().map(|(i, _)| i).collect();
        assert_eq!(exported, vec![0]);
        assert_eq!(frame_file_name(exported[0]), "000.png");
        assert_eq!(pna.metadata().frames.len(), 2);

        let mut builder = PnaBuilder::from_metadata(&pna.metadata());
        builder.replace_frame(0, vec![0x22; 120]);
        let rebuilt = PnaFile::parse(&builder.build().unwrap()).unwrap();

        assert_eq!(rebuilt.frames[0].record.frame_size(), 120);
        assert_eq!(
            &rebuilt.frames[0].record.as_bytes()[..36],
            &records[0].as_bytes()[..36]
        );
        assert_eq!(rebuilt.frames[1].record, records[1]);
        assert_eq!(rebuilt.frames[0].payload.as_deref(), Some(&[0x22u8; 120][..]));
    }

    #[test]
    fn test_round_trip_keeps_reserved_bytes() {
        let mut data = raw_pna(
            &[frame_record(4, 5, 3, 3, 4), frame_record(0, 0, 0, 0, 0)],
            &[vec![1, 2, 3, 4]],
        );
        data[4..16].copy_from_slice(&[0x5A; 12]);

        PnaFile::verify_round_trip(&data).unwrap();
        let pna = PnaFile::parse(&data).unwrap();
        assert_eq!(pna.header.reserved, [0x5A; 12]);
        test_round_trip(&pna).unwrap();
    }

    #[test]
    fn test_empty_frame_with_stored_size_round_trips() {
        let data = raw_pna(
            &[frame_record(0, 0, 0, 0, 4), frame_record(0, 0, 2, 2, 3)],
            &[vec![7, 8, 9]],
        );

        let pna = PnaFile::parse(&data).unwrap();
        assert!(pna.frames[0].payload.is_none());
        assert_eq!(pna.frames[1].payload.as_deref(), Some(&[7u8, 8, 9][..]));
        assert_eq!(pna.build().unwrap(), data);
    }

    #[test]
    fn test_empty_container() {
        let data = raw_pna(&[], &[]);
        let pna = PnaFile::parse(&data).unwrap();
        assert!(pna.frames.is_empty());
        assert_eq!(pna.build().unwrap(), data);
    }
}
