//! ARC header parsing and validation

use crate::arc::error::{ArcError, ArcResult};
use binrw::{BinRead, BinWrite};

/// Size of the fixed header in bytes
pub const HEADER_SIZE: u64 = 8;

/// Largest entry count accepted when reading
///
/// Real archives stay far below this; anything larger is treated as a sign
/// that the file is not an ARC at all.
pub const MAX_ENTRY_COUNT: i32 = 100_000;

/// ARC header (8 bytes, little-endian)
///
/// ```text
/// offset 0x00: i32 entry_count
/// offset 0x04: u32 index_size   (bytes of index records, header excluded)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct ArcHeader {
    /// Number of index records
    pub entry_count: i32,

    /// Total size in bytes of all index records
    pub index_size: u32,
}

impl ArcHeader {
    /// Create a header for `entry_count` records occupying `index_size` bytes
    pub fn new(entry_count: i32, index_size: u32) -> Self {
        Self {
            entry_count,
            index_size,
        }
    }

    /// Absolute offset where the payload region starts
    pub fn base_offset(&self) -> u64 {
        HEADER_SIZE + u64::from(self.index_size)
    }

    /// Check the header against the length of the stream it came from
    pub fn validate(&self, stream_len: u64) -> ArcResult<()> {
        let corrupt = |reason| ArcError::CorruptHeader {
            reason,
            entry_count: self.entry_count,
            index_size: self.index_size,
            stream_len,
        };

        if self.entry_count <= 0 {
            return Err(corrupt("entry count is not positive"));
        }
        if self.entry_count > MAX_ENTRY_COUNT {
            return Err(corrupt("entry count exceeds sanity limit"));
        }
        if self.base_offset() > stream_len {
            return Err(corrupt("index extends past end of stream"));
        }

        Ok(())
    }
}
