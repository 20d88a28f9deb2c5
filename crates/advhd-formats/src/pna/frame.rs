//! PNA frame records
//!
//! A frame record is 40 bytes. Only a handful of fields are understood; the
//! raw block is kept as the source of truth so every other byte survives an
//! unpack/repack cycle untouched.

use binrw::{BinRead, BinWrite};
use serde::{Deserialize, Serialize};

/// Size of one frame record in bytes
pub const FRAME_RECORD_SIZE: usize = 40;

const OFFSET_X: usize = 8;
const OFFSET_Y: usize = 12;
const WIDTH: usize = 16;
const HEIGHT: usize = 20;
const FRAME_SIZE: usize = 36;

/// Raw 40-byte frame record
///
/// Known fields (little-endian):
/// ```text
/// offset  8: i32 offset_x
/// offset 12: i32 offset_y
/// offset 16: u32 width
/// offset 20: u32 height
/// offset 36: u32 frame_size   payload length in bytes
/// ```
/// All other bytes are opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct PnaFrameRecord {
    raw: [u8; FRAME_RECORD_SIZE],
}

impl PnaFrameRecord {
    /// Wrap a raw record
    pub const fn from_bytes(raw: [u8; FRAME_RECORD_SIZE]) -> Self {
        Self { raw }
    }

    /// Build a record from a slice, `None` unless it is exactly 40 bytes
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let raw: [u8; FRAME_RECORD_SIZE] = data.try_into().ok()?;
        Some(Self { raw })
    }

    /// The raw record
    pub const fn as_bytes(&self) -> &[u8; FRAME_RECORD_SIZE] {
        &self.raw
    }

    /// Horizontal placement offset
    pub fn offset_x(&self) -> i32 {
        i32::from_le_bytes(self.field(OFFSET_X))
    }

    /// Vertical placement offset
    pub fn offset_y(&self) -> i32 {
        i32::from_le_bytes(self.field(OFFSET_Y))
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        u32::from_le_bytes(self.field(WIDTH))
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        u32::from_le_bytes(self.field(HEIGHT))
    }

    /// Stored payload length
    pub fn frame_size(&self) -> u32 {
        u32::from_le_bytes(self.field(FRAME_SIZE))
    }

    /// Overwrite the stored payload length; no other byte changes
    pub fn set_frame_size(&mut self, size: u32) {
        self.raw[FRAME_SIZE..FRAME_SIZE + 4].copy_from_slice(&size.to_le_bytes());
    }

    /// Whether the frame has an image (non-zero width and height)
    pub fn has_geometry(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    /// Geometry summary for the sidecar
    pub fn info(&self) -> FrameInfo {
        FrameInfo {
            offset_x: self.offset_x(),
            offset_y: self.offset_y(),
            width: self.width(),
            height: self.height(),
        }
    }

    fn field(&self, at: usize) -> [u8; 4] {
        [
            self.raw[at],
            self.raw[at + 1],
            self.raw[at + 2],
            self.raw[at + 3],
        ]
    }
}

impl From<[u8; FRAME_RECORD_SIZE]> for PnaFrameRecord {
    fn from(raw: [u8; FRAME_RECORD_SIZE]) -> Self {
        Self::from_bytes(raw)
    }
}

/// Read-only geometry of a frame, as stored in the sidecar's `Info` object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameInfo {
    /// Horizontal placement offset
    #[serde(rename = "OffsetX", alias = "offsetX", alias = "offsetx")]
    pub offset_x: i32,
    /// Vertical placement offset
    #[serde(rename = "OffsetY", alias = "offsetY", alias = "offsety")]
    pub offset_y: i32,
    /// Width in pixels
    #[serde(rename = "Width", alias = "width")]
    pub width: u32,
    /// Height in pixels
    #[serde(rename = "Height", alias = "height")]
    pub height: u32,
}

/// A frame record together with its payload, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PnaFrame {
    /// Raw record
    pub record: PnaFrameRecord,
    /// Embedded image bytes (already a complete image file)
    pub payload: Option<Vec<u8>>,
}

impl PnaFrame {
    /// Whether this frame gets a numbered image file on unpack
    pub fn is_exported(&self) -> bool {
        self.record.has_geometry() && self.payload.is_some()
    }
}

/// File stem for frame `index`: zero-padded to three digits
pub fn frame_stem(index: usize) -> String {
    format!("{index:03}")
}

/// File name for frame `index`, e.g. `007.png`
pub fn frame_file_name(index: usize) -> String {
    format!("{index:03}.png")
}
