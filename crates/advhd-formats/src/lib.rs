//! Container formats of the AdvHD visual-novel engine
//!
#![allow(clippy::cast_possible_truncation)] // Sizes are range-checked before narrowing
#![allow(clippy::cast_possible_wrap)] // Entry counts are capped well below i32::MAX
#![allow(clippy::doc_markdown)] // Engine-specific terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate provides symmetric (parser and builder) implementations for the
//! asset containers shipped with AdvHD games, for extraction and repacking
//! in translation workflows.
//!
//! # Supported Formats
//!
//! - **ARC**: Indexed archive of named payloads, with `.ws2` scripts stored
//!   under a two-bit byte rotation
//! - **PNA**: Multi-frame sprite container of embedded images with per-frame
//!   placement records
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: Both parsing and building supported
//! - **Opaque Bytes Survive**: Record fields the engine uses but this crate
//!   does not interpret are carried through unchanged
//! - **Isolated Failures**: A bad entry is reported and skipped; a bad header
//!   aborts before anything is written
//! - **Round-Trip Guarantee**: parse(build(data)) == data

#![warn(missing_docs)]

/// ARC indexed archives
///
/// See the [`arc`] module for the layout and usage examples.
pub mod arc;
pub mod format;
pub mod obfuscation;
/// PNA sprite containers and their JSON sidecar metadata
pub mod pna;

pub use format::{Container, ContainerError, ContainerKind};

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

/// Common format trait implemented by every container
pub trait AdvhdFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>>;

    /// Build to bytes
    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;

    /// Verify round-trip correctness
    fn verify_round_trip(data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data != rebuilt.as_slice() {
            return Err("Round-trip verification failed".into());
        }
        Ok(())
    }
}
