//! Container directory and footer encoding.
//!
//! ## Directory
//!
//! ```text
//! [count: u32 LE]
//! repeated: [tag_len: u8][tag bytes][offset: u64 LE][len: u64 LE][crc32: u32 LE]
//! ```
//!
//! ## Footer (20 bytes) - magic `MGC1` (`0x4D47_4331`)
//!
//! ```text
//! [dir_offset: u64 LE][dir_len: u64 LE][magic: u32 LE]
//! ```
//!
//! The footer is always the last 20 bytes of the file, so a reader finds
//! the directory with one read from the end.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Result as IoResult, Write};

use crate::ContainerError;

/// Magic number identifying container files (ASCII "MGC1").
pub const CONTAINER_MAGIC: u32 = 0x4D47_4331;

/// Size of the footer in bytes: 8 (`dir_offset`) + 8 (`dir_len`) + 4 (`magic`).
pub const FOOTER_BYTES: u64 = 8 + 8 + 4;

/// Longest allowed section tag, bounded by the `u8` length prefix.
pub const MAX_TAG_LEN: usize = u8::MAX as usize;

/// Location and checksum of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub tag: String,
    pub offset: u64,
    pub len: u64,
    pub crc32: u32,
}

/// Parsed footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub dir_offset: u64,
    pub dir_len: u64,
}

pub fn write_directory<W: Write>(w: &mut W, entries: &[DirEntry]) -> IoResult<()> {
    w.write_u32::<LittleEndian>(entries.len() as u32)?;
    for e in entries {
        w.write_u8(e.tag.len() as u8)?;
        w.write_all(e.tag.as_bytes())?;
        w.write_u64::<LittleEndian>(e.offset)?;
        w.write_u64::<LittleEndian>(e.len)?;
        w.write_u32::<LittleEndian>(e.crc32)?;
    }
    Ok(())
}

/// Parses a directory and checks that every section lies before `data_end`.
pub fn read_directory(mut buf: &[u8], data_end: u64) -> Result<Vec<DirEntry>, ContainerError> {
    let corrupt = |what: &str| ContainerError::Corrupt(format!("directory: {}", what));

    let count = buf.read_u32::<LittleEndian>().map_err(|_| corrupt("missing count"))?;
    let mut entries = Vec::with_capacity((count as usize).min(1024));
    for _ in 0..count {
        let tag_len = buf.read_u8().map_err(|_| corrupt("truncated entry"))? as usize;
        let mut tag = vec![0u8; tag_len];
        buf.read_exact(&mut tag).map_err(|_| corrupt("truncated tag"))?;
        let tag = String::from_utf8(tag).map_err(|_| corrupt("tag is not utf-8"))?;
        let offset = buf.read_u64::<LittleEndian>().map_err(|_| corrupt("truncated entry"))?;
        let len = buf.read_u64::<LittleEndian>().map_err(|_| corrupt("truncated entry"))?;
        let crc32 = buf.read_u32::<LittleEndian>().map_err(|_| corrupt("truncated entry"))?;

        match offset.checked_add(len) {
            Some(end) if end <= data_end => {}
            _ => {
                return Err(ContainerError::Corrupt(format!(
                    "section {:?} [{}, +{}) runs past the data end {}",
                    tag, offset, len, data_end
                )))
            }
        }
        entries.push(DirEntry {
            tag,
            offset,
            len,
            crc32,
        });
    }
    if !buf.is_empty() {
        return Err(corrupt("trailing bytes"));
    }
    Ok(entries)
}

pub fn write_footer<W: Write>(w: &mut W, footer: Footer) -> IoResult<()> {
    w.write_u64::<LittleEndian>(footer.dir_offset)?;
    w.write_u64::<LittleEndian>(footer.dir_len)?;
    w.write_u32::<LittleEndian>(CONTAINER_MAGIC)?;
    Ok(())
}

/// Parses the last [`FOOTER_BYTES`] of a file of `file_size` bytes.
pub fn read_footer(mut buf: &[u8], file_size: u64) -> Result<Footer, ContainerError> {
    let short = |_: std::io::Error| ContainerError::Corrupt("short footer".to_string());
    let dir_offset = buf.read_u64::<LittleEndian>().map_err(short)?;
    let dir_len = buf.read_u64::<LittleEndian>().map_err(short)?;
    let magic = buf.read_u32::<LittleEndian>().map_err(short)?;
    if magic != CONTAINER_MAGIC {
        return Err(ContainerError::BadMagic(magic));
    }
    let expected = dir_offset
        .checked_add(dir_len)
        .and_then(|v| v.checked_add(FOOTER_BYTES));
    if expected != Some(file_size) {
        return Err(ContainerError::Corrupt(format!(
            "footer points at directory [{}, +{}) in a {} byte file",
            dir_offset, dir_len, file_size
        )));
    }
    Ok(Footer {
        dir_offset,
        dir_len,
    })
}
