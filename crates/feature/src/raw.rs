//! Raw intermediate feature file.
//!
//! Written once by an importer, then read by the generator in two passes:
//! a sequential pass that reports each record's offset, and random re-reads
//! by offset in sorted order.

use byteorder::{LittleEndian, WriteBytesExt};
use coding::{CodingError, FileReader, Reader};
use crc32fast::Hasher as Crc32;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::FeatureRecord;

/// Size of the `[record_len][crc32]` frame header.
const FRAME_HEADER_BYTES: u64 = 8;

/// Largest accepted record (64 MiB). Guards against allocating on corrupt lengths.
pub const MAX_RECORD_SIZE: u32 = 64 * 1024 * 1024;

/// Errors that can occur while writing or reading the raw feature file.
#[derive(Debug, Error)]
pub enum RawFeatureError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A reader-level error (out-of-bounds read, bad varint, ...).
    #[error("coding error: {0}")]
    Coding(#[from] CodingError),

    /// A record failed CRC validation or carried an impossible length.
    #[error("corrupt record at offset {offset}")]
    Corrupt { offset: u64 },

    /// The file ends in the middle of a record.
    #[error("truncated record at offset {offset}")]
    Truncated { offset: u64 },

    /// A single record does not fit the frame's length field.
    #[error("record too large: {0} bytes")]
    TooLarge(u64),
}

/// Append-only writer of framed [`FeatureRecord`]s.
pub struct RawFeatureWriter {
    path: PathBuf,
    file: BufWriter<File>,
    pos: u64,
    /// Reusable scratch buffer for the frame being built.
    buf: Vec<u8>,
}

impl RawFeatureWriter {
    /// Creates (or truncates) the raw file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, RawFeatureError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self {
            path,
            file: BufWriter::new(file),
            pos: 0,
            buf: Vec::with_capacity(256),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record`, returning the offset its frame starts at.
    pub fn append(&mut self, record: &FeatureRecord) -> Result<u64, RawFeatureError> {
        self.buf.clear();
        self.buf.extend_from_slice(&[0u8; FRAME_HEADER_BYTES as usize]);
        record.write_body(&mut self.buf)?;

        let body = &self.buf[FRAME_HEADER_BYTES as usize..];
        let mut hasher = Crc32::new();
        hasher.update(body);
        let crc = hasher.finalize();

        let record_len = body.len() as u64 + 4;
        if record_len > u64::from(MAX_RECORD_SIZE) {
            return Err(RawFeatureError::TooLarge(record_len));
        }

        let mut header = &mut self.buf[..FRAME_HEADER_BYTES as usize];
        header.write_u32::<LittleEndian>(record_len as u32)?;
        header.write_u32::<LittleEndian>(crc)?;

        let offset = self.pos;
        self.file.write_all(&self.buf)?;
        self.pos += self.buf.len() as u64;
        Ok(offset)
    }

    /// Flushes buffered frames and syncs the file to disk.
    pub fn finish(mut self) -> Result<u64, RawFeatureError> {
        self.file.flush()?;
        self.file.get_ref().sync_all()?;
        Ok(self.pos)
    }
}

/// Reader over a raw feature file.
///
/// Generic over [`Reader`] so tests can run against in-memory buffers.
pub struct RawFeatureReader<R: Reader> {
    reader: R,
}

impl RawFeatureReader<FileReader> {
    /// Opens a raw feature file on disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RawFeatureError> {
        Ok(Self {
            reader: FileReader::open(path)?,
        })
    }
}

impl<R: Reader> RawFeatureReader<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.reader.size()
    }

    /// Reads the record whose frame starts at `offset`.
    ///
    /// Returns the record and the offset of the next frame.
    pub fn read_at(&self, offset: u64) -> Result<(FeatureRecord, u64), RawFeatureError> {
        let size = self.reader.size();
        if offset + FRAME_HEADER_BYTES > size {
            return Err(RawFeatureError::Truncated { offset });
        }

        let mut header = [0u8; FRAME_HEADER_BYTES as usize];
        self.reader.read_at(offset, &mut header)?;
        let record_len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if record_len <= 4 || record_len > MAX_RECORD_SIZE {
            return Err(RawFeatureError::Corrupt { offset });
        }

        let body_len = u64::from(record_len - 4);
        let body_start = offset + FRAME_HEADER_BYTES;
        if body_start + body_len > size {
            return Err(RawFeatureError::Truncated { offset });
        }

        let mut body = vec![0u8; body_len as usize];
        self.reader.read_at(body_start, &mut body)?;

        let mut hasher = Crc32::new();
        hasher.update(&body);
        if hasher.finalize() != crc {
            return Err(RawFeatureError::Corrupt { offset });
        }

        let mut slice = body.as_slice();
        let record = FeatureRecord::read_body(&mut slice).map_err(|_| RawFeatureError::Corrupt { offset })?;
        if !slice.is_empty() {
            return Err(RawFeatureError::Corrupt { offset });
        }
        Ok((record, body_start + body_len))
    }

    /// Reads every record in file order, calling `apply(record, offset)` for each.
    ///
    /// Stops at the first error; a file ending mid-frame is reported as
    /// [`RawFeatureError::Truncated`].
    pub fn for_each<F>(&self, mut apply: F) -> Result<(), RawFeatureError>
    where
        F: FnMut(FeatureRecord, u64),
    {
        let size = self.reader.size();
        let mut offset = 0u64;
        while offset < size {
            let (record, next) = self.read_at(offset)?;
            apply(record, offset);
            offset = next;
        }
        Ok(())
    }
}
