use crc32fast::Hasher as Crc32;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::format::{write_directory, write_footer, DirEntry, Footer, MAX_TAG_LEN};
use crate::ContainerError;

/// Handle to a section registered with a [`ContainerWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(usize);

/// Append-only byte sink for one section.
///
/// Backed by its own temporary file so sections grow independently and
/// never interleave. The CRC32 of the section is accumulated as bytes are
/// written.
pub struct SectionSink {
    tag: String,
    path: PathBuf,
    file: BufWriter<File>,
    pos: u64,
    hasher: Crc32,
}

impl SectionSink {
    fn create(tag: &str, path: PathBuf) -> Result<Self, ContainerError> {
        let file = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| ContainerError::io("create section", &path, e))?;
        Ok(Self {
            tag: tag.to_string(),
            path,
            file: BufWriter::new(file),
            pos: 0,
            hasher: Crc32::new(),
        })
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of bytes written so far; the offset the next write lands at.
    #[must_use]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Copies the staged bytes into `out`, returning the section checksum.
    fn drain_into<W: Write>(self, out: &mut W) -> Result<u32, ContainerError> {
        let SectionSink {
            path,
            file,
            pos,
            hasher,
            ..
        } = self;
        let mut file = file
            .into_inner()
            .map_err(|e| ContainerError::io("flush section", &path, e.into_error()))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| ContainerError::io("rewind section", &path, e))?;
        let copied = io::copy(&mut file, out).map_err(|e| ContainerError::io("copy section", &path, e))?;
        if copied != pos {
            return Err(ContainerError::Corrupt(format!(
                "section file {} holds {} bytes, expected {}",
                path.display(),
                copied,
                pos
            )));
        }
        Ok(hasher.finalize())
    }
}

impl Write for SectionSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Builds a container file from independently written sections.
///
/// Sections are staged in a private temporary directory next to the
/// destination. [`finish`](ContainerWriter::finish) concatenates them in
/// registration order, appends the directory and footer, fsyncs, and
/// renames the result into place. Dropping the writer without finishing
/// removes every staged byte and leaves the destination untouched.
///
/// `finish` consumes the writer, so no section can be written after it.
pub struct ContainerWriter {
    path: PathBuf,
    staging: TempDir,
    sections: Vec<SectionSink>,
    by_tag: HashMap<String, SectionId>,
}

impl ContainerWriter {
    /// Starts a container that will be written to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Io`] if the staging directory cannot be
    /// created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        let path = path.as_ref().to_path_buf();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let staging = tempfile::Builder::new()
            .prefix(".mapgen-sections-")
            .tempdir_in(&parent)
            .map_err(|e| ContainerError::io("create staging dir", &parent, e))?;
        Ok(Self {
            path,
            staging,
            sections: Vec::new(),
            by_tag: HashMap::new(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registers a new section. Sections are laid out in registration order.
    ///
    /// # Errors
    ///
    /// Fails on an empty, overlong, or already registered tag.
    pub fn add_section(&mut self, tag: &str) -> Result<SectionId, ContainerError> {
        if tag.is_empty() || tag.len() > MAX_TAG_LEN {
            return Err(ContainerError::InvalidTag(tag.to_string()));
        }
        if self.by_tag.contains_key(tag) {
            return Err(ContainerError::DuplicateTag(tag.to_string()));
        }
        let id = SectionId(self.sections.len());
        let file_path = self.staging.path().join(format!("{}.sec", id.0));
        self.sections.push(SectionSink::create(tag, file_path)?);
        self.by_tag.insert(tag.to_string(), id);
        Ok(id)
    }

    #[must_use]
    pub fn section_id(&self, tag: &str) -> Option<SectionId> {
        self.by_tag.get(tag).copied()
    }

    /// The sink of a registered section.
    pub fn sink(&mut self, id: SectionId) -> &mut SectionSink {
        &mut self.sections[id.0]
    }

    /// Registers `tag` and writes `bytes` as its whole content.
    ///
    /// # Errors
    ///
    /// Same as [`add_section`](ContainerWriter::add_section), plus I/O errors.
    pub fn write_section(&mut self, tag: &str, bytes: &[u8]) -> Result<SectionId, ContainerError> {
        let id = self.add_section(tag)?;
        let sink = self.sink(id);
        sink.write_all(bytes)
            .map_err(|e| ContainerError::io("write section", &sink.path, e))?;
        Ok(id)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Concatenates all sections into the destination file and returns the
    /// directory that was written.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Io`] with path and operation on any I/O
    /// failure. No partial destination file is left behind.
    pub fn finish(self) -> Result<Vec<DirEntry>, ContainerError> {
        let tmp_path = self.tmp_path();
        let ContainerWriter {
            path,
            staging,
            sections,
            ..
        } = self;

        let result = write_container(&tmp_path, sections).and_then(|entries| {
            fs::rename(&tmp_path, &path).map_err(|e| ContainerError::io("rename", &path, e))?;
            Ok(entries)
        });
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        let entries = result?;

        // Fsync the parent so the rename survives a crash.
        if let Some(parent) = path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        let staging_path = staging.path().to_path_buf();
        staging
            .close()
            .map_err(|e| ContainerError::io("remove staging dir", &staging_path, e))?;

        debug!(path = %path.display(), sections = entries.len(), "container written");
        Ok(entries)
    }
}

fn write_container(tmp_path: &Path, sections: Vec<SectionSink>) -> Result<Vec<DirEntry>, ContainerError> {
    let io_err = |op: &'static str| move |e: io::Error| ContainerError::io(op, tmp_path, e);

    let raw = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(tmp_path)
        .map_err(io_err("create"))?;
    let mut out = BufWriter::new(raw);

    let mut entries = Vec::with_capacity(sections.len());
    let mut offset = 0u64;
    for sink in sections {
        let tag = sink.tag.clone();
        let len = sink.pos;
        let crc32 = sink.drain_into(&mut out)?;
        entries.push(DirEntry {
            tag,
            offset,
            len,
            crc32,
        });
        offset += len;
    }

    let mut dir = Vec::new();
    write_directory(&mut dir, &entries).map_err(io_err("encode directory"))?;
    out.write_all(&dir).map_err(io_err("write directory"))?;
    write_footer(
        &mut out,
        Footer {
            dir_offset: offset,
            dir_len: dir.len() as u64,
        },
    )
    .map_err(io_err("write footer"))?;

    out.flush().map_err(io_err("flush"))?;
    out.into_inner()
        .map_err(|e| ContainerError::io("flush", tmp_path, e.into_error()))?
        .sync_all()
        .map_err(io_err("sync"))?;
    Ok(entries)
}
