//! ARC reader
//!
//! Reads the header and the full index up front, then serves payloads on
//! demand. Index problems abort; payload bounds problems only affect the
//! entry they belong to.

use crate::arc::entry::{ArcEntry, ArcIndexEntry};
use crate::arc::error::{ArcError, ArcResult};
use crate::arc::header::{ArcHeader, HEADER_SIZE};
use crate::obfuscation::ObfuscationRule;
use binrw::BinRead;
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, warn};

/// A named payload taken out of (or destined for) an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcFile {
    /// Entry name, `/` separated
    pub name: String,
    /// Payload bytes
    pub data: Vec<u8>,
}

impl ArcFile {
    /// Create a file from a name and its bytes
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// An entry that could not be extracted
#[derive(Debug)]
pub struct SkippedEntry {
    /// Entry name
    pub name: String,
    /// Why it was skipped
    pub error: ArcError,
}

/// Result of extracting every entry of an archive
#[derive(Debug, Default)]
pub struct ArcExtraction {
    /// Extracted files in index order
    pub files: Vec<ArcFile>,
    /// Entries skipped because of entry-level errors
    pub skipped: Vec<SkippedEntry>,
}

/// Reader over an ARC stream
#[derive(Debug)]
pub struct ArcReader<R> {
    reader: R,
    header: ArcHeader,
    entries: Vec<ArcEntry>,
    stream_len: u64,
}

impl<R: Read + Seek> ArcReader<R> {
    /// Read and validate the header and index
    pub fn new(mut reader: R) -> ArcResult<Self> {
        let stream_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if stream_len < HEADER_SIZE {
            return Err(ArcError::CorruptHeader {
                reason: "stream shorter than header",
                entry_count: 0,
                index_size: 0,
                stream_len,
            });
        }

        let header = ArcHeader::read(&mut reader)?;
        header.validate(stream_len)?;

        let entries = read_index(&mut reader, &header)?;
        debug!(
            "ARC index: {} entries, payload region at {:#x}",
            entries.len(),
            header.base_offset()
        );

        Ok(Self {
            reader,
            header,
            entries,
            stream_len,
        })
    }

    /// The parsed header
    pub fn header(&self) -> &ArcHeader {
        &self.header
    }

    /// Absolute offset of the payload region
    pub fn base_offset(&self) -> u64 {
        self.header.base_offset()
    }

    /// Total length of the underlying stream
    pub fn stream_len(&self) -> u64 {
        self.stream_len
    }

    /// Index entries in file order
    pub fn entries(&self) -> &[ArcEntry] {
        &self.entries
    }

    /// Read one entry's payload, applying the inverse transform when `rule` matches
    pub fn read_entry(&mut self, entry: &ArcEntry, rule: &ObfuscationRule) -> ArcResult<Vec<u8>> {
        read_payload(&mut self.reader, entry, self.stream_len, rule)
    }

    /// Read every entry in index order
    ///
    /// Entries whose payload lies outside the stream are skipped and listed
    /// in [`ArcExtraction::skipped`]; extraction of the others continues.
    pub fn extract_all(&mut self, rule: &ObfuscationRule) -> ArcResult<ArcExtraction> {
        let mut out = ArcExtraction::default();

        for entry in &self.entries {
            match read_payload(&mut self.reader, entry, self.stream_len, rule) {
                Ok(data) => out.files.push(ArcFile {
                    name: entry.name.clone(),
                    data,
                }),
                Err(e) if e.is_entry_level() => {
                    warn!("Skipping {}: {}", entry.name, e);
                    out.skipped.push(SkippedEntry {
                        name: entry.name.clone(),
                        error: e,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(out)
    }

    /// Give back the underlying stream
    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn read_index<R: Read + Seek>(reader: &mut R, header: &ArcHeader) -> ArcResult<Vec<ArcEntry>> {
    let base_offset = header.base_offset();
    let count = header.entry_count as usize;
    let mut entries = Vec::with_capacity(count);

    for i in 0..count {
        let position = reader.stream_position()?;
        let truncated = || ArcError::TruncatedIndex {
            entry: i,
            position,
            index_end: base_offset,
        };

        if position >= base_offset {
            return Err(truncated());
        }

        let record = match ArcIndexEntry::read(reader) {
            Ok(record) => record,
            Err(e) if e.is_eof() => return Err(truncated()),
            Err(binrw::Error::Custom { .. }) => return Err(ArcError::InvalidName { position }),
            Err(e) => return Err(e.into()),
        };

        if reader.stream_position()? > base_offset {
            return Err(truncated());
        }

        entries.push(ArcEntry::from_index(&record, base_offset));
    }

    Ok(entries)
}

fn read_payload<R: Read + Seek>(
    reader: &mut R,
    entry: &ArcEntry,
    stream_len: u64,
    rule: &ObfuscationRule,
) -> ArcResult<Vec<u8>> {
    if !entry.fits_within(stream_len) {
        return Err(ArcError::BoundsViolation {
            name: entry.name.clone(),
            offset: entry.offset,
            size: entry.size,
            stream_len,
        });
    }

    reader.seek(SeekFrom::Start(entry.offset))?;
    let mut data = vec![0u8; entry.size as usize];
    reader.read_exact(&mut data)?;

    if rule.apply_inverse(&entry.name, &mut data) {
        debug!("Deobfuscated {}", entry.name);
    }

    Ok(data)
}
