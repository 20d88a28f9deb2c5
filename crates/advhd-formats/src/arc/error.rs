//! ARC error types

use thiserror::Error;

/// ARC-specific error type
#[derive(Debug, Error)]
pub enum ArcError {
    /// Header fields are impossible for a real archive
    #[error(
        "corrupt header: {reason} (entry_count={entry_count}, index_size={index_size}, stream_len={stream_len})"
    )]
    CorruptHeader {
        /// Which sanity rule failed
        reason: &'static str,
        /// Declared entry count
        entry_count: i32,
        /// Declared index size in bytes
        index_size: u32,
        /// Total stream length
        stream_len: u64,
    },

    /// Index records ran past the declared index size
    #[error("truncated index: entry {entry} starts at {position}, index ends at {index_end}")]
    TruncatedIndex {
        /// Zero-based entry number being read
        entry: usize,
        /// Stream position where the record would start
        position: u64,
        /// First byte after the index region
        index_end: u64,
    },

    /// Entry payload lies outside the archive
    #[error("entry '{name}' out of bounds: offset {offset} + size {size} exceeds {stream_len}")]
    BoundsViolation {
        /// Entry name
        name: String,
        /// Absolute payload offset
        offset: u64,
        /// Payload size
        size: u32,
        /// Total stream length
        stream_len: u64,
    },

    /// Entry name cannot be mapped to a path below the output directory
    #[error("unsafe entry name: '{0}'")]
    UnsafeName(String),

    /// Entry name is not valid UTF-16
    #[error("invalid UTF-16 entry name at offset {position}")]
    InvalidName {
        /// Stream position of the record
        position: u64,
    },

    /// Nothing to pack
    #[error("no entries to pack")]
    EmptyInput,

    /// Archive layout does not fit the 32-bit fields
    #[error("archive too large: {field} would be {value}")]
    TooLarge {
        /// Field that overflowed
        field: &'static str,
        /// Value that did not fit
        value: u64,
    },

    /// Input path handed to the packer is not below its root
    #[error("path is outside input dir: {0}")]
    OutsideRoot(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` parsing/writing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

impl ArcError {
    /// Whether the error only affects a single entry
    ///
    /// Entry-level errors are reported and skipped during extraction; every
    /// other error aborts the archive.
    pub fn is_entry_level(&self) -> bool {
        matches!(self, Self::BoundsViolation { .. } | Self::UnsafeName(_))
    }
}

/// Result type for ARC operations
pub type ArcResult<T> = Result<T, ArcError>;
