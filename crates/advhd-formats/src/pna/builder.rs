//! PNA builder
//!
//! Rebuilds a container from the original frame records and a set of
//! replacement images. Payloads are packed back to back in record order;
//! only the `frame_size` field of each exported frame's record changes.

use crate::pna::error::{PnaError, PnaResult};
use crate::pna::frame::{PnaFrameRecord, frame_file_name};
use crate::pna::header::PnaHeader;
use crate::pna::metadata::PnaMetadata;
use crate::pna::parser::payload_start;
use binrw::BinWrite;
use std::collections::BTreeMap;
use std::io::{Cursor, Seek, SeekFrom, Write};

/// Builder for PNA containers
#[derive(Debug, Clone, Default)]
pub struct PnaBuilder {
    reserved: [u8; 12],
    records: Vec<PnaFrameRecord>,
    replacements: BTreeMap<usize, Vec<u8>>,
}

impl PnaBuilder {
    /// Start from the original frame records
    ///
    /// The header's reserved bytes default to zero.
    pub fn new(records: Vec<PnaFrameRecord>) -> Self {
        Self {
            reserved: [0; 12],
            records,
            replacements: BTreeMap::new(),
        }
    }

    /// Start from sidecar metadata
    pub fn from_metadata(metadata: &PnaMetadata) -> Self {
        Self::new(metadata.records())
    }

    /// Set the header's reserved bytes
    pub fn reserved(mut self, reserved: [u8; 12]) -> Self {
        self.reserved = reserved;
        self
    }

    /// Frame records in order
    pub fn records(&self) -> &[PnaFrameRecord] {
        &self.records
    }

    /// Indices of the frames that need a replacement image
    pub fn required_frames(&self) -> impl Iterator<Item = usize> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.has_geometry())
            .map(|(i, _)| i)
    }

    /// Provide the image for frame `index`
    pub fn replace_frame(&mut self, index: usize, data: Vec<u8>) {
        self.replacements.insert(index, data);
    }

    /// Write the container to `writer`, returning the records as written
    ///
    /// Every frame with geometry must have a replacement; otherwise this
    /// fails with [`PnaError::MissingFrame`] before anything is written.
    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> PnaResult<Vec<PnaFrameRecord>> {
        let frame_count = i32::try_from(self.records.len()).map_err(|_| PnaError::TooLarge {
            field: "frame_count",
            value: self.records.len() as u64,
        })?;

        // Resolve every record before touching the writer
        let mut records = self.records.clone();
        let mut payloads = Vec::new();
        for (i, record) in records.iter_mut().enumerate() {
            if !record.has_geometry() {
                continue;
            }

            let data = self
                .replacements
                .get(&i)
                .ok_or_else(|| PnaError::MissingFrame {
                    index: i,
                    name: frame_file_name(i),
                })?;
            let size = u32::try_from(data.len()).map_err(|_| PnaError::TooLarge {
                field: "frame_size",
                value: data.len() as u64,
            })?;
            if record.frame_size() != size {
                record.set_frame_size(size);
            }
            payloads.push(data.as_slice());
        }

        // Payload region first, back to back
        writer.seek(SeekFrom::Start(payload_start(records.len())))?;
        for payload in &payloads {
            writer.write_all(payload)?;
        }

        // Header and records
        writer.seek(SeekFrom::Start(0))?;
        let header = PnaHeader {
            reserved: self.reserved,
            ..PnaHeader::new(frame_count)
        };
        header.write(writer)?;
        for record in &records {
            record.write(writer)?;
        }

        writer.seek(SeekFrom::End(0))?;
        writer.flush()?;

        Ok(records)
    }

    /// Build the container into memory
    pub fn build(&self) -> PnaResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}
