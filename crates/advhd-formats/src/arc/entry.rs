//! ARC index record parsing and building

use binrw::{BinRead, BinResult, BinWrite};
use std::io::{Read, Seek, Write};

/// Fixed part of an index record: size (u32) + offset (u32)
pub const RECORD_FIXED_SIZE: u64 = 8;

/// One record of the ARC index as stored on disk
///
/// Binary layout (little-endian):
/// ```text
/// size:    u32            payload length in bytes
/// offset:  u32            payload offset relative to the payload region
/// name:    [u16; n] + 0   UTF-16LE code units, zero-terminated, no length prefix
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcIndexEntry {
    /// Payload length in bytes
    pub size: u32,
    /// Offset relative to the start of the payload region
    pub offset: u32,
    /// Entry name, `/` separated
    pub name: String,
}

impl ArcIndexEntry {
    /// Create a record
    pub fn new(name: impl Into<String>, size: u32, offset: u32) -> Self {
        Self {
            size,
            offset,
            name: name.into(),
        }
    }

    /// Number of bytes this record occupies in the index
    pub fn record_size(&self) -> u64 {
        record_size(&self.name)
    }
}

/// Bytes a record with `name` occupies: fixed fields, UTF-16 name, terminator
pub fn record_size(name: &str) -> u64 {
    RECORD_FIXED_SIZE + utf16_byte_len(name) + 2
}

/// Length in bytes of `name` encoded as UTF-16
pub fn utf16_byte_len(name: &str) -> u64 {
    name.encode_utf16().count() as u64 * 2
}

impl BinRead for ArcIndexEntry {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let size = u32::read_options(reader, endian, ())?;
        let offset = u32::read_options(reader, endian, ())?;

        // Zero-terminated UTF-16 name
        let mut units = Vec::new();
        loop {
            let unit = u16::read_options(reader, endian, ())?;
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        let name = String::from_utf16(&units).map_err(|e| binrw::Error::Custom {
            pos: reader.stream_position().unwrap_or(0),
            err: Box::new(e),
        })?;

        Ok(Self { size, offset, name })
    }
}

impl BinWrite for ArcIndexEntry {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        self.size.write_options(writer, endian, ())?;
        self.offset.write_options(writer, endian, ())?;
        for unit in self.name.encode_utf16() {
            unit.write_options(writer, endian, ())?;
        }
        0u16.write_options(writer, endian, ())?;
        Ok(())
    }
}

impl binrw::meta::ReadEndian for ArcIndexEntry {
    const ENDIAN: binrw::meta::EndianKind = binrw::meta::EndianKind::Endian(binrw::Endian::Little);
}

impl binrw::meta::WriteEndian for ArcIndexEntry {
    const ENDIAN: binrw::meta::EndianKind = binrw::meta::EndianKind::Endian(binrw::Endian::Little);
}

/// An entry resolved against its archive: absolute offset and payload size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcEntry {
    /// Entry name, `/` separated
    pub name: String,
    /// Payload length in bytes
    pub size: u32,
    /// Absolute payload offset within the archive
    pub offset: u64,
}

impl ArcEntry {
    /// Resolve an index record against the payload base offset
    pub fn from_index(record: &ArcIndexEntry, base_offset: u64) -> Self {
        Self {
            name: record.name.clone(),
            size: record.size,
            offset: base_offset + u64::from(record.offset),
        }
    }

    /// First byte after the payload
    pub fn end(&self) -> u64 {
        self.offset + u64::from(self.size)
    }

    /// Whether the payload fits in a stream of `stream_len` bytes
    pub fn fits_within(&self, stream_len: u64) -> bool {
        self.end() <= stream_len
    }
}
