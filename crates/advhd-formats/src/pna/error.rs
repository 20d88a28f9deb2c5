//! PNA error types

use std::path::PathBuf;
use thiserror::Error;

/// PNA-specific error type
#[derive(Debug, Error)]
pub enum PnaError {
    /// Wrong magic at offset 0
    #[error("invalid PNA magic: expected 0x50414E50, got {0:#010x}")]
    InvalidMagic(u32),

    /// Stream too short for the fixed header
    #[error("data too short: got {actual} bytes, minimum is {minimum}")]
    DataTooShort {
        /// Actual data length
        actual: u64,
        /// Minimum required length
        minimum: u64,
    },

    /// Negative frame count
    #[error("invalid frame count: {0}")]
    InvalidFrameCount(i32),

    /// Frame records run past the end of the stream
    #[error("truncated index: {frame_count} records need {needed} bytes, stream has {stream_len}")]
    TruncatedIndex {
        /// Declared frame count
        frame_count: i32,
        /// Bytes needed for header and records
        needed: u64,
        /// Total stream length
        stream_len: u64,
    },

    /// A frame payload runs past the end of the stream
    #[error("frame {frame} payload out of bounds: offset {offset} + size {size} exceeds {stream_len}")]
    TruncatedPayload {
        /// Frame index
        frame: usize,
        /// Absolute payload offset
        offset: u64,
        /// Declared payload size
        size: u32,
        /// Total stream length
        stream_len: u64,
    },

    /// A frame with geometry has no replacement image
    #[error("missing replacement for frame {index} ({name})")]
    MissingFrame {
        /// Frame index
        index: usize,
        /// Expected file name
        name: String,
    },

    /// Sidecar metadata file does not exist
    #[error("metadata file not found: {}", .0.display())]
    MissingSidecar(PathBuf),

    /// Sidecar metadata could not be parsed or written
    #[error("invalid metadata: {0}")]
    InvalidSidecar(#[from] serde_json::Error),

    /// Sidecar root is not a JSON object
    #[error("invalid metadata: root of {} is not an object", .0.display())]
    SidecarNotObject(PathBuf),

    /// Container does not fit the format's 32-bit fields
    #[error("container too large: {field} would be {value}")]
    TooLarge {
        /// Field that overflowed
        field: &'static str,
        /// Value that did not fit
        value: u64,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` parsing/writing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for PNA operations
pub type PnaResult<T> = Result<T, PnaError>;
