use coding::{FileReader, Reader, SubReader};
use crc32fast::Hasher as Crc32;
use std::collections::HashMap;
use std::path::Path;

use crate::format::{read_directory, read_footer, DirEntry, FOOTER_BYTES};
use crate::ContainerError;

/// Read side of a container file.
///
/// On open the footer and the whole directory are loaded; sections are
/// then read on demand through the underlying [`Reader`].
pub struct ContainerReader<R: Reader = FileReader> {
    reader: R,
    entries: Vec<DirEntry>,
    by_tag: HashMap<String, usize>,
}

impl ContainerReader<FileReader> {
    /// Opens a container file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the magic is wrong, or
    /// the directory is inconsistent with the file size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        let path = path.as_ref();
        let reader = FileReader::open(path).map_err(|e| match e {
            coding::CodingError::Io(source) => ContainerError::io("open", path, source),
            other => ContainerError::Coding(other),
        })?;
        Self::from_reader(reader)
    }
}

impl<R: Reader> ContainerReader<R> {
    /// Parses the footer and directory of `reader`.
    ///
    /// # Errors
    ///
    /// Same as [`ContainerReader::open`].
    pub fn from_reader(reader: R) -> Result<Self, ContainerError> {
        let size = reader.size();
        if size < FOOTER_BYTES {
            return Err(ContainerError::Corrupt(format!(
                "file of {} bytes is too small for a footer",
                size
            )));
        }

        let mut footer_buf = [0u8; FOOTER_BYTES as usize];
        reader.read_at(size - FOOTER_BYTES, &mut footer_buf)?;
        let footer = read_footer(&footer_buf, size)?;

        let mut dir_buf = vec![0u8; footer.dir_len as usize];
        reader.read_at(footer.dir_offset, &mut dir_buf)?;
        let entries = read_directory(&dir_buf, footer.dir_offset)?;

        let mut by_tag = HashMap::with_capacity(entries.len());
        for (i, e) in entries.iter().enumerate() {
            if by_tag.insert(e.tag.clone(), i).is_some() {
                return Err(ContainerError::DuplicateTag(e.tag.clone()));
            }
        }

        Ok(Self {
            reader,
            entries,
            by_tag,
        })
    }

    /// Directory entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.tag.as_str())
    }

    #[must_use]
    pub fn has(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    #[must_use]
    pub fn entry(&self, tag: &str) -> Option<&DirEntry> {
        self.by_tag.get(tag).map(|&i| &self.entries[i])
    }

    /// `(offset, len)` of a section within the file.
    #[must_use]
    pub fn range(&self, tag: &str) -> Option<(u64, u64)> {
        self.entry(tag).map(|e| (e.offset, e.len))
    }

    fn require(&self, tag: &str) -> Result<&DirEntry, ContainerError> {
        self.entry(tag)
            .ok_or_else(|| ContainerError::MissingSection(tag.to_string()))
    }

    /// Reads a whole section into memory, verifying its checksum.
    ///
    /// # Errors
    ///
    /// [`ContainerError::MissingSection`] for an unknown tag and
    /// [`ContainerError::ChecksumMismatch`] when the bytes do not match the
    /// directory.
    pub fn read_section(&self, tag: &str) -> Result<Vec<u8>, ContainerError> {
        let entry = self.require(tag)?;
        let mut buf = vec![0u8; entry.len as usize];
        self.reader.read_at(entry.offset, &mut buf)?;

        let mut hasher = Crc32::new();
        hasher.update(&buf);
        let actual = hasher.finalize();
        if actual != entry.crc32 {
            return Err(ContainerError::ChecksumMismatch {
                tag: tag.to_string(),
                expected: entry.crc32,
                actual,
            });
        }
        Ok(buf)
    }

    /// A random-access window over one section, without checksum
    /// verification.
    ///
    /// # Errors
    ///
    /// [`ContainerError::MissingSection`] for an unknown tag.
    pub fn section_reader(&self, tag: &str) -> Result<SubReader<&R>, ContainerError> {
        let entry = self.require(tag)?;
        Ok(SubReader::new(&self.reader, entry.offset, entry.len)?)
    }
}
