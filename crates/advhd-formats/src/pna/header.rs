//! PNA header structure

use binrw::{BinRead, BinWrite};

/// `PNAP` read as a little-endian u32
pub const PNA_MAGIC: u32 = 0x50414E50;

/// Size of the fixed header; frame records start here
pub const HEADER_SIZE: u64 = 0x14;

/// PNA header (0x14 bytes, little-endian)
///
/// ```text
/// offset 0x00: u32      magic ("PNAP")
/// offset 0x04: [u8; 12] reserved, meaning unknown
/// offset 0x10: i32      frame_count
/// ```
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct PnaHeader {
    /// File signature, must be [`PNA_MAGIC`]
    #[br(assert(magic == PNA_MAGIC, "Invalid PNA magic: expected {:#x}, got {:#x}", PNA_MAGIC, magic))]
    pub magic: u32,

    /// Reserved bytes, carried through unchanged
    pub reserved: [u8; 12],

    /// Number of 40-byte frame records
    pub frame_count: i32,
}

impl PnaHeader {
    /// Header with zeroed reserved bytes
    pub fn new(frame_count: i32) -> Self {
        Self {
            magic: PNA_MAGIC,
            reserved: [0; 12],
            frame_count,
        }
    }

    /// Check whether `data` starts with the PNA magic
    pub fn has_magic(data: &[u8]) -> bool {
        data.len() >= 4 && u32::from_le_bytes([data[0], data[1], data[2], data[3]]) == PNA_MAGIC
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use binrw::io::Cursor;

    #[test]
    fn test_magic_spells_pnap() {
        assert_eq!(&PNA_MAGIC.to_le_bytes(), b"PNAP");
    }

    #[test]
    fn test_header_layout() {
        let mut header = PnaHeader::new(3);
        header.reserved[0] = 0xAB;
        header.reserved[11] = 0xCD;

        let mut cursor = Cursor::new(Vec::new());
        header.write(&mut cursor).unwrap();
        let bytes = cursor.into_inner();

        assert_eq!(bytes.len() as u64, HEADER_SIZE);
        assert_eq!(&bytes[0..4], b"PNAP");
        assert_eq!(bytes[4], 0xAB);
        assert_eq!(bytes[15], 0xCD);
        assert_eq!(&bytes[0x10..0x14], &3i32.to_le_bytes());

        let parsed = PnaHeader::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = vec![0u8; 0x14];
        bytes[0..4].copy_from_slice(b"PNG\0");
        assert!(PnaHeader::read(&mut Cursor::new(&bytes)).is_err());
        assert!(!PnaHeader::has_magic(&bytes));
        assert!(PnaHeader::has_magic(b"PNAP"));
        assert!(!PnaHeader::has_magic(b"PNA"));
    }
}
