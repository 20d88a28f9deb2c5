//! ARC archive format implementation
//!
//! ARC is the engine's generic indexed archive: a small header, a table of
//! variable-length index records and a contiguous payload region. Entries
//! whose names end in the obfuscated suffix (`.ws2` by default) are stored
//! with every byte rotated left by two bits.
//!
//! # Format Structure
//!
//! ```text
//! ARC File:
//! ├── Header (8 bytes, little-endian)
//! │   ├── Entry Count (i32)
//! │   └── Index Size (u32) - bytes of all index records
//! ├── Index (entry_count records, no padding)
//! │   └── Per record:
//! │       ├── Size (u32)
//! │       ├── Offset (u32) - relative to the payload region
//! │       └── Name (UTF-16LE, zero-terminated)
//! └── Payloads (from 8 + index_size, in index order)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use advhd_formats::arc::{self, ArcBuilder};
//! use advhd_formats::obfuscation::ObfuscationRule;
//!
//! let rule = ObfuscationRule::default();
//! let data = ArcBuilder::new()
//!     .with_file("scene/start.ws2", vec![0x01, 0x02])
//!     .with_file("readme.txt", b"hello".to_vec())
//!     .build(&rule)?;
//!
//! let extraction = arc::unpack(&data, &rule)?;
//! assert_eq!(extraction.files[0].data, vec![0x01, 0x02]);
//! assert!(extraction.skipped.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod entry;
mod error;
pub mod fs;
mod header;
mod reader;

pub use builder::{ArcBuilder, index_byte_size};
pub use entry::{ArcEntry, ArcIndexEntry, RECORD_FIXED_SIZE};
pub use error::{ArcError, ArcResult};
pub use header::{ArcHeader, HEADER_SIZE, MAX_ENTRY_COUNT};
pub use reader::{ArcExtraction, ArcFile, ArcReader, SkippedEntry};

use crate::obfuscation::ObfuscationRule;
use std::io::Cursor;

/// Extract every entry of an in-memory archive
pub fn unpack(data: &[u8], rule: &ObfuscationRule) -> ArcResult<ArcExtraction> {
    ArcReader::new(Cursor::new(data))?.extract_all(rule)
}

/// Pack `files` into an in-memory archive, in the order given
pub fn pack(files: &[ArcFile], rule: &ObfuscationRule) -> ArcResult<Vec<u8>> {
    let mut builder = ArcBuilder::new();
    for file in files {
        builder.add_file(file.name.clone(), file.data.clone());
    }
    builder.build(rule)
}

/// Complete ARC archive with stored payloads
///
/// Payloads are kept exactly as stored, without the obfuscation transform,
/// so parsing and building are exact inverses for archives whose payloads
/// are contiguous.
///
/// Entries that cannot be extracted (out of bounds or with an unsafe name)
/// are listed in `skipped` and are not part of `files`, so
/// [`ArcArchive::to_bytes`] drops them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcArchive {
    /// Archive header
    pub header: ArcHeader,
    /// Resolved index in file order
    pub entries: Vec<ArcEntry>,
    /// Stored payloads of the entries that lie within the archive
    pub files: Vec<ArcFile>,
    /// Names of the entries that could not be extracted
    pub skipped: Vec<String>,
}

impl ArcArchive {
    /// Parse an archive, keeping payloads as stored
    pub fn from_bytes(data: &[u8]) -> ArcResult<Self> {
        let mut reader = ArcReader::new(Cursor::new(data))?;
        let extraction = reader.extract_all(&ObfuscationRule::disabled())?;
        Ok(Self {
            header: *reader.header(),
            entries: reader.entries().to_vec(),
            files: extraction.files,
            skipped: extraction.skipped.into_iter().map(|s| s.name).collect(),
        })
    }

    /// Rebuild the archive from its stored payloads
    ///
    /// Skipped entries are not written; check [`ArcArchive::is_complete`]
    /// first when the rebuilt archive must hold every indexed entry.
    pub fn to_bytes(&self) -> ArcResult<Vec<u8>> {
        pack(&self.files, &ObfuscationRule::disabled())
    }

    /// True when every indexed entry was extracted
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Look up a stored payload by entry name
    pub fn get(&self, name: &str) -> Option<&ArcFile> {
        self.files.iter().find(|f| f.name == name)
    }
}

impl crate::AdvhdFormat for ArcArchive {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::from_bytes(data)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(self.to_bytes()?)
    }
}
