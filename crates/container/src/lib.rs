//! # Container - sectioned, write-once map file
//!
//! A container is a sequence of named byte sections followed by a
//! directory that tells a reader where each section lives.
//!
//! ## File layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ SECTIONS (in registration order, no padding)                  │
//! │                                                               │
//! │ version | header | rgninfo | dat | geom0 | trg0 | ...         │
//! ├───────────────────────────────────────────────────────────────┤
//! │ DIRECTORY                                                     │
//! │                                                               │
//! │ count (u32)                                                   │
//! │ tag_len (u8) | tag | offset (u64) | len (u64) | crc32 (u32)   │
//! │ ... repeated for each section ...                             │
//! ├───────────────────────────────────────────────────────────────┤
//! │ FOOTER (always last 20 bytes)                                 │
//! │                                                               │
//! │ dir_offset (u64 LE) | dir_len (u64 LE) | magic (u32) "MGC1"   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. The CRC32 in each directory entry covers
//! the section bytes and is verified by [`ContainerReader::read_section`].
//!
//! Files are immutable once written. There is no update path; a changed map
//! is a new file.

mod format;
mod reader;
mod writer;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use format::{DirEntry, CONTAINER_MAGIC, FOOTER_BYTES, MAX_TAG_LEN};
pub use reader::ContainerReader;
pub use writer::{ContainerWriter, SectionId, SectionSink};

/// Errors produced while writing or reading a container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// An I/O failure, with the operation and the file it hit.
    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("reader error: {0}")]
    Coding(#[from] coding::CodingError),

    #[error("section tag {0:?} is already registered")]
    DuplicateTag(String),

    #[error("invalid section tag {0:?}")]
    InvalidTag(String),

    #[error("no section named {0:?}")]
    MissingSection(String),

    #[error("bad container magic {0:#x}")]
    BadMagic(u32),

    #[error("checksum mismatch in section {tag:?}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        tag: String,
        expected: u32,
        actual: u32,
    },

    #[error("corrupt container: {0}")]
    Corrupt(String),
}

impl ContainerError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        ContainerError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests;
