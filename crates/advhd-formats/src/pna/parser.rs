//! PNA parsing
//!
//! Records are read back to back from 0x14. Payloads follow the last record
//! and are consumed strictly in record order by a running cursor; the
//! records carry sizes, not offsets. A frame with a zero size or zero
//! geometry has no payload and does not move the cursor.

use crate::pna::error::{PnaError, PnaResult};
use crate::pna::frame::{FRAME_RECORD_SIZE, PnaFrame, PnaFrameRecord};
use crate::pna::header::{HEADER_SIZE, PnaHeader};
use binrw::BinRead;
use std::io::{Read, Seek, SeekFrom};
use tracing::debug;

/// Absolute offset of the payload region for `frame_count` records
pub fn payload_start(frame_count: usize) -> u64 {
    HEADER_SIZE + (frame_count * FRAME_RECORD_SIZE) as u64
}

/// Parse a PNA stream into its header and frames
pub fn read_pna<R: Read + Seek>(reader: &mut R) -> PnaResult<(PnaHeader, Vec<PnaFrame>)> {
    let stream_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    if stream_len < HEADER_SIZE {
        return Err(PnaError::DataTooShort {
            actual: stream_len,
            minimum: HEADER_SIZE,
        });
    }

    let magic = u32::read_le(reader)?;
    if magic != crate::pna::header::PNA_MAGIC {
        return Err(PnaError::InvalidMagic(magic));
    }
    reader.seek(SeekFrom::Start(0))?;
    let header = PnaHeader::read(reader)?;

    let frame_count = usize::try_from(header.frame_count)
        .map_err(|_| PnaError::InvalidFrameCount(header.frame_count))?;

    let mut cursor = payload_start(frame_count);
    if cursor > stream_len {
        return Err(PnaError::TruncatedIndex {
            frame_count: header.frame_count,
            needed: cursor,
            stream_len,
        });
    }

    let mut records = Vec::with_capacity(frame_count);
    for _ in 0..frame_count {
        records.push(PnaFrameRecord::read(reader)?);
    }

    let mut frames = Vec::with_capacity(frame_count);
    for (i, record) in records.into_iter().enumerate() {
        let size = record.frame_size();
        if size == 0 || !record.has_geometry() {
            if size != 0 {
                debug!(
                    "Frame {} has zero geometry, ignoring stored size {}",
                    i, size
                );
            }
            frames.push(PnaFrame {
                record,
                payload: None,
            });
            continue;
        }

        if cursor + u64::from(size) > stream_len {
            return Err(PnaError::TruncatedPayload {
                frame: i,
                offset: cursor,
                size,
                stream_len,
            });
        }

        reader.seek(SeekFrom::Start(cursor))?;
        let mut payload = vec![0u8; size as usize];
        reader.read_exact(&mut payload)?;
        cursor += u64::from(size);

        debug!(
            "Frame {}: {}x{} at ({}, {}), {} bytes",
            i,
            record.width(),
            record.height(),
            record.offset_x(),
            record.offset_y(),
            size
        );

        frames.push(PnaFrame {
            record,
            payload: Some(payload),
        });
    }

    Ok((header, frames))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{frame_record, raw_pna};
    use std::io::Cursor;

    #[test]
    fn test_payload_start() {
        assert_eq!(payload_start(0), 0x14);
        assert_eq!(payload_start(2), 0x14 + 80);
    }

    #[test]
    fn test_reads_frames_in_order() {
        let records = [
            frame_record(0, 0, 2, 2, 3),
            frame_record(5, 6, 1, 1, 2),
        ];
        let data = raw_pna(&records, &[vec![1, 2, 3], vec![4, 5]]);
        let (header, frames) = read_pna(&mut Cursor::new(&data)).unwrap();

        assert_eq!(header.frame_count, 2);
        assert_eq!(frames[0].payload.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(frames[1].payload.as_deref(), Some(&[4u8, 5][..]));
        assert_eq!(frames[1].record, records[1]);
    }

    #[test]
    fn test_empty_frame_consumes_no_payload() {
        let records = [
            frame_record(0, 0, 0, 0, 0),
            frame_record(0, 0, 4, 4, 2),
        ];
        let data = raw_pna(&records, &[vec![9, 8]]);
        let (_, frames) = read_pna(&mut Cursor::new(&data)).unwrap();

        assert!(frames[0].payload.is_none());
        assert_eq!(frames[1].payload.as_deref(), Some(&[9u8, 8][..]));
    }

    #[test]
    fn test_zero_geometry_ignores_stored_size() {
        let records = [
            frame_record(0, 0, 0, 0, 4),
            frame_record(0, 0, 2, 2, 3),
        ];
        let data = raw_pna(&records, &[vec![7, 8, 9]]);
        let (_, frames) = read_pna(&mut Cursor::new(&data)).unwrap();

        assert!(frames[0].payload.is_none());
        assert_eq!(frames[0].record.frame_size(), 4);
        assert_eq!(frames[1].payload.as_deref(), Some(&[7u8, 8, 9][..]));
    }

    #[test]
    fn test_bad_magic() {
        let mut data = raw_pna(&[], &[]);
        data[0] = b'X';
        assert!(matches!(
            read_pna(&mut Cursor::new(&data)),
            Err(PnaError::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            read_pna(&mut Cursor::new(b"PNAP")),
            Err(PnaError::DataTooShort { .. })
        ));
    }

    #[test]
    fn test_negative_frame_count() {
        let mut data = raw_pna(&[], &[]);
        data[0x10..0x14].copy_from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(
            read_pna(&mut Cursor::new(&data)),
            Err(PnaError::InvalidFrameCount(-1))
        ));
    }

    #[test]
    fn test_records_past_end() {
        let mut data = raw_pna(&[frame_record(0, 0, 0, 0, 0)], &[]);
        data[0x10..0x14].copy_from_slice(&2i32.to_le_bytes());
        assert!(matches!(
            read_pna(&mut Cursor::new(&data)),
            Err(PnaError::TruncatedIndex { frame_count: 2, .. })
        ));
    }

    #[test]
    fn test_payload_past_end() {
        let data = raw_pna(&[frame_record(0, 0, 1, 1, 10)], &[vec![0; 4]]);
        assert!(matches!(
            read_pna(&mut Cursor::new(&data)),
            Err(PnaError::TruncatedPayload { frame: 0, size: 10, .. })
        ));
    }
}
