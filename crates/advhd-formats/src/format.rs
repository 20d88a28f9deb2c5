//! Container identification and dispatch

use crate::arc::{ArcArchive, ArcError, ArcHeader, HEADER_SIZE as ARC_HEADER_SIZE, MAX_ENTRY_COUNT};
use crate::pna::{PnaError, PnaFile, PnaHeader};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// File extensions ARC archives ship under
pub const ARC_EXTENSIONS: &[&str] = &["arc", "dat", "bin"];

/// File extension of PNA containers
pub const PNA_EXTENSION: &str = "pna";

/// The container formats this crate understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Indexed ARC archive
    Arc,
    /// PNA sprite container
    Pna,
}

impl ContainerKind {
    /// Identify a container from its path and full contents
    pub fn identify(path: &Path, data: &[u8]) -> Option<Self> {
        identify_with_len(path, data, data.len() as u64)
    }

    /// Identify a container on disk, reading only its header
    pub fn identify_file(path: &Path) -> std::io::Result<Option<Self>> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        let mut head = Vec::with_capacity(ARC_HEADER_SIZE as usize);
        file.by_ref().take(ARC_HEADER_SIZE).read_to_end(&mut head)?;
        Ok(identify_with_len(path, &head, len))
    }

    /// Short lowercase name, e.g. for log output
    pub fn tag(self) -> &'static str {
        match self {
            Self::Arc => "arc",
            Self::Pna => "pna",
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Whether `path` has one of the ARC extensions (case-insensitive)
pub fn has_arc_extension(path: &Path) -> bool {
    extension(path).is_some_and(|ext| ARC_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Whether `path` has the PNA extension (case-insensitive)
pub fn has_pna_extension(path: &Path) -> bool {
    extension(path).is_some_and(|ext| ext.eq_ignore_ascii_case(PNA_EXTENSION))
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn identify_with_len(path: &Path, head: &[u8], len: u64) -> Option<ContainerKind> {
    if has_pna_extension(path) && PnaHeader::has_magic(head) {
        return Some(ContainerKind::Pna);
    }
    if has_arc_extension(path) && plausible_arc_header(head, len) {
        return Some(ContainerKind::Arc);
    }
    None
}

fn plausible_arc_header(head: &[u8], len: u64) -> bool {
    let (Some(count), Some(index)) = (head.get(0..4), head.get(4..8)) else {
        return false;
    };
    let header = ArcHeader::new(
        i32::from_le_bytes([count[0], count[1], count[2], count[3]]),
        u32::from_le_bytes([index[0], index[1], index[2], index[3]]),
    );
    header.entry_count > 0
        && header.entry_count <= MAX_ENTRY_COUNT
        && header.base_offset() <= len
}

/// Errors from [`Container`] dispatch
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Neither extension nor signature matched a known format
    #[error("unrecognised container: {0}")]
    Unrecognized(String),

    /// ARC decode or encode failed
    #[error(transparent)]
    Arc(#[from] ArcError),

    /// PNA decode or encode failed
    #[error(transparent)]
    Pna(#[from] PnaError),
}

/// A decoded container of either kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    /// ARC archive with stored payloads
    Arc(ArcArchive),
    /// PNA sprite container
    Pna(PnaFile),
}

impl Container {
    /// Identify and decode `data`
    pub fn decode(path: &Path, data: &[u8]) -> Result<Self, ContainerError> {
        match ContainerKind::identify(path, data) {
            Some(ContainerKind::Arc) => Ok(Self::Arc(ArcArchive::from_bytes(data)?)),
            Some(ContainerKind::Pna) => Ok(Self::Pna(PnaFile::from_bytes(data)?)),
            None => Err(ContainerError::Unrecognized(path.display().to_string())),
        }
    }

    /// Encode back to bytes
    pub fn encode(&self) -> Result<Vec<u8>, ContainerError> {
        match self {
            Self::Arc(archive) => Ok(archive.to_bytes()?),
            Self::Pna(pna) => Ok(pna.to_bytes()?),
        }
    }

    /// Kind of this container
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Arc(_) => ContainerKind::Arc,
            Self::Pna(_) => ContainerKind::Pna,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arc::ArcBuilder;
    use crate::obfuscation::ObfuscationRule;
    use crate::test_utils::{frame_record, raw_pna};

    fn arc_bytes() -> Vec<u8> {
        ArcBuilder::new()
            .with_file("x.txt", b"x".to_vec())
            .build(&ObfuscationRule::default())
            .unwrap()
    }

    #[test]
    fn test_identify_pna_needs_extension_and_magic() {
        let data = raw_pna(&[frame_record(0, 0, 0, 0, 0)], &[]);
        assert_eq!(
            ContainerKind::identify(Path::new("face.PNA"), &data),
            Some(ContainerKind::Pna)
        );
        assert_eq!(ContainerKind::identify(Path::new("face.png"), &data), None);
        assert_eq!(ContainerKind::identify(Path::new("face.pna"), b"\x89PNG"), None);
    }

    #[test]
    fn test_identify_arc_by_header_sanity() {
        let data = arc_bytes();
        for name in ["a.arc", "a.DAT", "a.bin"] {
            assert_eq!(
                ContainerKind::identify(Path::new(name), &data),
                Some(ContainerKind::Arc),
                "{name}"
            );
        }
        assert_eq!(ContainerKind::identify(Path::new("a.zip"), &data), None);

        let mut zero_count = data.clone();
        zero_count[0..4].copy_from_slice(&0i32.to_le_bytes());
        assert_eq!(ContainerKind::identify(Path::new("a.arc"), &zero_count), None);

        let mut huge_index = data;
        huge_index[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(ContainerKind::identify(Path::new("a.arc"), &huge_index), None);
    }

    #[test]
    fn test_identify_file_reads_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.arc");
        std::fs::write(&path, arc_bytes()).unwrap();
        assert_eq!(
            ContainerKind::identify_file(&path).unwrap(),
            Some(ContainerKind::Arc)
        );
    }

    #[test]
    fn test_container_dispatch() {
        let data = arc_bytes();
        let container = Container::decode(Path::new("a.arc"), &data).unwrap();
        assert_eq!(container.kind(), ContainerKind::Arc);
        assert_eq!(container.encode().unwrap(), data);

        let pna = raw_pna(&[frame_record(0, 0, 1, 1, 2)], &[vec![7, 7]]);
        let container = Container::decode(Path::new("b.pna"), &pna).unwrap();
        assert_eq!(container.kind().tag(), "pna");
        assert_eq!(container.encode().unwrap(), pna);

        assert!(matches!(
            Container::decode(Path::new("c.txt"), b"text"),
            Err(ContainerError::Unrecognized(_))
        ));
    }
}
