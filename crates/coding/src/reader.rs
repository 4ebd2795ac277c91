//! Random-access readers.
//!
//! [`Reader`] is the seek-and-read capability the raw feature stream and the
//! container reader are built on. Implementations must be readable through
//! `&self` so one reader can serve many lookups.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::CodingError;

/// A fixed-size byte source that supports reads at arbitrary offsets.
pub trait Reader {
    /// Total number of readable bytes.
    fn size(&self) -> u64;

    /// Fills `buf` with the bytes starting at `pos`.
    ///
    /// Fails with [`CodingError::OutOfBounds`] if the range is not fully
    /// inside the reader.
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> Result<(), CodingError>;

    /// Reads the whole content into memory.
    fn read_all(&self) -> Result<Vec<u8>, CodingError> {
        let mut buf = vec![0u8; self.size() as usize];
        self.read_at(0, &mut buf)?;
        Ok(buf)
    }
}

impl<R: Reader + ?Sized> Reader for &R {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read_at(&self, pos: u64, buf: &mut [u8]) -> Result<(), CodingError> {
        (**self).read_at(pos, buf)
    }
}

fn check_bounds(pos: u64, len: usize, size: u64) -> Result<(), CodingError> {
    let len = len as u64;
    match pos.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(CodingError::OutOfBounds { pos, len, size }),
    }
}

/// Reader over a borrowed byte slice.
#[derive(Debug, Clone, Copy)]
pub struct MemReader<'a> {
    data: &'a [u8],
}

impl<'a> MemReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl Reader for MemReader<'_> {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_at(&self, pos: u64, buf: &mut [u8]) -> Result<(), CodingError> {
        check_bounds(pos, buf.len(), self.size())?;
        let start = pos as usize;
        buf.copy_from_slice(&self.data[start..start + buf.len()]);
        Ok(())
    }
}

/// Reader over a file on disk.
///
/// The file handle is kept open and wrapped in a `Mutex` so reads can go
/// through a shared reference.
#[derive(Debug)]
pub struct FileReader {
    path: PathBuf,
    file: Mutex<File>,
    size: u64,
}

impl FileReader {
    /// Opens `path` for reading. The size is captured once at open time.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CodingError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            file: Mutex::new(file),
            size,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Reader for FileReader {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&self, pos: u64, buf: &mut [u8]) -> Result<(), CodingError> {
        check_bounds(pos, buf.len(), self.size)?;
        let mut f = self
            .file
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("lock poisoned: {}", e)))?;
        f.seek(SeekFrom::Start(pos))?;
        f.read_exact(buf)?;
        Ok(())
    }
}

/// A window `[offset, offset + size)` of another reader.
#[derive(Debug, Clone)]
pub struct SubReader<R> {
    inner: R,
    offset: u64,
    size: u64,
}

impl<R: Reader> SubReader<R> {
    /// Creates a window over `inner`. The window must lie inside `inner`.
    pub fn new(inner: R, offset: u64, size: u64) -> Result<Self, CodingError> {
        match offset.checked_add(size) {
            Some(end) if end <= inner.size() => Ok(Self {
                inner,
                offset,
                size,
            }),
            _ => Err(CodingError::OutOfBounds {
                pos: offset,
                len: size,
                size: inner.size(),
            }),
        }
    }

    /// Window starting at `offset` and running to the end of `inner`.
    pub fn skip(inner: R, offset: u64) -> Result<Self, CodingError> {
        let size = inner.size().saturating_sub(offset);
        Self::new(inner, offset, size)
    }
}

impl<R: Reader> Reader for SubReader<R> {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&self, pos: u64, buf: &mut [u8]) -> Result<(), CodingError> {
        check_bounds(pos, buf.len(), self.size)?;
        self.inner.read_at(self.offset + pos, buf)
    }
}

/// Sequential cursor over a [`Reader`], implementing [`std::io::Read`].
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    pos: u64,
}

impl<R: Reader> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, pos: 0 }
    }

    /// Current position relative to the start of the reader.
    #[must_use]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Bytes left before the end of the reader.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.reader.size().saturating_sub(self.pos)
    }

    /// Moves the cursor forward by `n` bytes.
    pub fn skip(&mut self, n: u64) -> Result<(), CodingError> {
        if n > self.remaining() {
            return Err(CodingError::OutOfBounds {
                pos: self.pos,
                len: n,
                size: self.reader.size(),
            });
        }
        self.pos += n;
        Ok(())
    }
}

impl<R: Reader> Read for ReaderSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = (buf.len() as u64).min(self.remaining()) as usize;
        if n == 0 {
            return Ok(0);
        }
        self.reader
            .read_at(self.pos, &mut buf[..n])
            .map_err(|e| match e {
                CodingError::Io(io_err) => io_err,
                other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
            })?;
        self.pos += n as u64;
        Ok(n)
    }
}
