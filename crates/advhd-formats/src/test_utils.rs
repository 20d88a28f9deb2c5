//! Test utilities shared by the format test modules

use crate::AdvhdFormat;
use crate::pna::{PNA_MAGIC, PnaFrameRecord};
use std::fmt::Debug;

/// Build a frame record with the given known fields
///
/// Every opaque byte is set to a distinct non-zero value so tests notice
/// any byte that gets rewritten by accident.
pub fn frame_record(
    offset_x: i32,
    offset_y: i32,
    width: u32,
    height: u32,
    size: u32,
) -> PnaFrameRecord {
    let mut raw = [0u8; 40];
    for (i, b) in raw.iter_mut().enumerate() {
        *b = 0xE0 | i as u8;
    }
    raw[8..12].copy_from_slice(&offset_x.to_le_bytes());
    raw[12..16].copy_from_slice(&offset_y.to_le_bytes());
    raw[16..20].copy_from_slice(&width.to_le_bytes());
    raw[20..24].copy_from_slice(&height.to_le_bytes());
    raw[36..40].copy_from_slice(&size.to_le_bytes());
    PnaFrameRecord::from_bytes(raw)
}

/// Lay out a PNA container by hand: header, records, then payloads
pub fn raw_pna(records: &[PnaFrameRecord], payloads: &[Vec<u8>]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&PNA_MAGIC.to_le_bytes());
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&(records.len() as i32).to_le_bytes());
    for record in records {
        data.extend_from_slice(record.as_bytes());
    }
    for payload in payloads {
        data.extend_from_slice(payload);
    }
    data
}

/// Test round-trip serialization for a format instance
///
/// Builds `original`, parses the result and requires the two to be equal.
pub fn test_round_trip<T>(original: &T) -> Result<(), Box<dyn std::error::Error>>
where
    T: AdvhdFormat + PartialEq + Debug,
{
    let data = original.build()?;
    let parsed = T::parse(&data)?;

    if original != &parsed {
        return Err(format!(
            "Round-trip verification failed:\nOriginal: {:?}\nParsed: {:?}",
            original, parsed
        )
        .into());
    }

    Ok(())
}

/// Test round-trip with existing binary data
///
/// Parses `data`, rebuilds it, and requires both the bytes and the reparsed
/// value to match.
pub fn test_round_trip_with_data<T>(data: &[u8]) -> Result<(), Box<dyn std::error::Error>>
where
    T: AdvhdFormat + PartialEq + Debug,
{
    let parsed = T::parse(data)?;
    let rebuilt = parsed.build()?;

    if data != rebuilt.as_slice() {
        return Err(format!(
            "Rebuilt data differs: {} bytes in, {} bytes out",
            data.len(),
            rebuilt.len()
        )
        .into());
    }

    let reparsed = T::parse(&rebuilt)?;
    if parsed != reparsed {
        return Err("Reparsed value differs from the original parse".into());
    }

    Ok(())
}
