//! ARC builder
//!
//! Payloads are written first, starting at the precomputed base offset,
//! then the writer rewinds and fills in the header and index. Index order
//! and payload order are both the insertion order.

use crate::arc::entry::{ArcIndexEntry, record_size};
use crate::arc::error::{ArcError, ArcResult};
use crate::arc::header::{ArcHeader, HEADER_SIZE, MAX_ENTRY_COUNT};
use crate::arc::reader::ArcFile;
use crate::obfuscation::ObfuscationRule;
use binrw::BinWrite;
use std::borrow::Cow;
use std::io::{Cursor, Seek, SeekFrom, Write};

/// Builder for ARC archives
#[derive(Debug, Clone, Default)]
pub struct ArcBuilder {
    files: Vec<ArcFile>,
}

impl ArcBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file; it lands after every file added before it
    pub fn add_file(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.push(ArcFile::new(name, data));
    }

    /// Append a file (builder style)
    pub fn with_file(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.add_file(name, data);
        self
    }

    /// Files in insertion order
    pub fn files(&self) -> &[ArcFile] {
        &self.files
    }

    /// Number of files added
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files were added
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Size in bytes of the index these files produce
    pub fn index_size(&self) -> ArcResult<u32> {
        index_byte_size(self.files.iter().map(|f| f.name.as_str()))
    }

    /// Write the archive to `writer`, returning the header that was written
    ///
    /// Entries whose name matches `rule` are stored with the forward rotation
    /// applied. Fails with [`ArcError::EmptyInput`] before touching `writer`
    /// when no files were added.
    pub fn write_to<W: Write + Seek>(
        &self,
        writer: &mut W,
        rule: &ObfuscationRule,
    ) -> ArcResult<ArcHeader> {
        if self.files.is_empty() {
            return Err(ArcError::EmptyInput);
        }
        for file in &self.files {
            validate_name(&file.name)?;
        }

        let count = self.files.len();
        if count > MAX_ENTRY_COUNT as usize {
            return Err(ArcError::TooLarge {
                field: "entry_count",
                value: count as u64,
            });
        }

        let index_size = self.index_size()?;
        let header = ArcHeader::new(count as i32, index_size);

        // Payload region first
        writer.seek(SeekFrom::Start(header.base_offset()))?;
        let mut index = Vec::with_capacity(count);
        let mut relative: u64 = 0;

        for file in &self.files {
            let size = u32::try_from(file.data.len()).map_err(|_| ArcError::TooLarge {
                field: "entry size",
                value: file.data.len() as u64,
            })?;
            let offset = u32::try_from(relative).map_err(|_| ArcError::TooLarge {
                field: "entry offset",
                value: relative,
            })?;

            let payload = if rule.matches(&file.name) {
                let mut owned = file.data.clone();
                rule.apply_forward(&file.name, &mut owned);
                Cow::Owned(owned)
            } else {
                Cow::Borrowed(file.data.as_slice())
            };
            writer.write_all(&payload)?;

            index.push(ArcIndexEntry::new(file.name.clone(), size, offset));
            relative += u64::from(size);
        }

        // Then header and index
        writer.seek(SeekFrom::Start(0))?;
        header.write(writer)?;
        for record in &index {
            record.write(writer)?;
        }
        debug_assert_eq!(writer.stream_position()?, header.base_offset());

        writer.seek(SeekFrom::End(0))?;
        writer.flush()?;

        Ok(header)
    }

    /// Build the archive into memory
    pub fn build(&self, rule: &ObfuscationRule) -> ArcResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor, rule)?;
        Ok(cursor.into_inner())
    }
}

/// Index size for entries with the given names: `Σ(8 + utf16_len + 2)`
pub fn index_byte_size<'a>(names: impl IntoIterator<Item = &'a str>) -> ArcResult<u32> {
    let total: u64 = names.into_iter().map(record_size).sum();
    if total + HEADER_SIZE > u64::from(u32::MAX) {
        return Err(ArcError::TooLarge {
            field: "index_size",
            value: total,
        });
    }
    Ok(total as u32)
}

fn validate_name(name: &str) -> ArcResult<()> {
    // A NUL code unit would terminate the name early on read
    if name.is_empty() || name.contains('\0') {
        return Err(ArcError::UnsafeName(name.to_string()));
    }
    Ok(())
}
