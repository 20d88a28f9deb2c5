//! PNA sidecar metadata
//!
//! The sidecar is a JSON object shared with other tooling. This module owns
//! the `Frames` key; every other key in an existing sidecar is preserved
//! when it is rewritten.
//!
//! ```json
//! {
//!   "OriginalRelativePath": "chara/face.pna",
//!   "Frames": [
//!     { "RawIndexData": "<base64 of 40 bytes>",
//!       "Info": { "OffsetX": 0, "OffsetY": 0, "Width": 10, "Height": 10 } }
//!   ]
//! }
//! ```

use crate::pna::error::{PnaError, PnaResult};
use crate::pna::frame::{FRAME_RECORD_SIZE, FrameInfo, PnaFrameRecord};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::Path;

/// Frame metadata for one PNA container
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PnaMetadata {
    /// Original path of the container, if the sorter recorded one
    #[serde(
        rename = "OriginalRelativePath",
        alias = "originalRelativePath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_relative_path: Option<String>,

    /// One entry per frame record, in record order
    #[serde(rename = "Frames", alias = "frames", default)]
    pub frames: Vec<PnaFrameEntry>,
}

/// One frame in the sidecar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnaFrameEntry {
    /// The full 40-byte record, the source of truth for repacking
    #[serde(
        rename = "RawIndexData",
        alias = "rawIndexData",
        serialize_with = "serialize_record",
        deserialize_with = "deserialize_record"
    )]
    pub raw_index_data: PnaFrameRecord,

    /// Geometry derived from the record, informational only
    #[serde(rename = "Info", alias = "info", default)]
    pub info: FrameInfo,
}

impl From<PnaFrameRecord> for PnaFrameEntry {
    fn from(record: PnaFrameRecord) -> Self {
        Self {
            info: record.info(),
            raw_index_data: record,
        }
    }
}

impl PnaMetadata {
    /// Metadata for a list of records
    pub fn from_records(records: impl IntoIterator<Item = PnaFrameRecord>) -> Self {
        Self {
            original_relative_path: None,
            frames: records.into_iter().map(PnaFrameEntry::from).collect(),
        }
    }

    /// The raw records in order
    pub fn records(&self) -> Vec<PnaFrameRecord> {
        self.frames.iter().map(|f| f.raw_index_data).collect()
    }

    /// Parse metadata from sidecar JSON text
    pub fn from_json(text: &str) -> PnaResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Write `metadata` to the sidecar at `path`
///
/// When the file already holds a JSON object, its keys are kept and only
/// the keys this metadata carries are replaced.
pub fn write_sidecar(path: &Path, metadata: &PnaMetadata) -> PnaResult<()> {
    let mut root = if path.exists() {
        let text = fs::read_to_string(path)?;
        match serde_json::from_str::<serde_json::Value>(&text)? {
            serde_json::Value::Object(map) => map,
            _ => return Err(PnaError::SidecarNotObject(path.to_path_buf())),
        }
    } else {
        serde_json::Map::new()
    };

    if let serde_json::Value::Object(ours) = serde_json::to_value(metadata)? {
        for (key, value) in ours {
            root.insert(key, value);
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(&serde_json::Value::Object(root))?;
    fs::write(path, text)?;
    Ok(())
}

/// Read the sidecar at `path`
pub fn read_sidecar(path: &Path) -> PnaResult<PnaMetadata> {
    if !path.is_file() {
        return Err(PnaError::MissingSidecar(path.to_path_buf()));
    }
    PnaMetadata::from_json(&fs::read_to_string(path)?)
}

fn serialize_record<S: Serializer>(record: &PnaFrameRecord, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&STANDARD.encode(record.as_bytes()))
}

/// Raw record encodings accepted on read
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecord {
    Base64(String),
    Bytes(Vec<u8>),
}

fn deserialize_record<'de, D: Deserializer<'de>>(d: D) -> Result<PnaFrameRecord, D::Error> {
    use serde::de::Error;

    let bytes = match RawRecord::deserialize(d)? {
        RawRecord::Base64(text) => STANDARD.decode(text.as_bytes()).map_err(D::Error::custom)?,
        RawRecord::Bytes(bytes) => bytes,
    };
    let len = bytes.len();
    PnaFrameRecord::from_slice(&bytes).ok_or_else(|| {
        D::Error::custom(format!(
            "RawIndexData must be {FRAME_RECORD_SIZE} bytes, got {len}"
        ))
    })
}
