//! Decoding of finished map files.
//!
//! The inverse of the collector, used by `mapgen inspect` and by tests to
//! check what a build actually wrote. Sections are read lazily; only `dat`,
//! `metaidx` and `extids` are loaded whole.

use coding::{
    decode_point, decode_points, read_varuint, CodingError, FileReader, GeometryCodingParams, Reader,
    ReaderSource,
};
use config::RegionData;
use container::{ContainerError, ContainerReader};
use feature::{AddressData, GeomType, Metadata};
use geometry::PointD;
use std::io::{Cursor, Read};
use std::path::Path;

use crate::header::{DataHeader, VersionInfo};
use crate::packer::{LIST_KIND, STRIP_KIND};
use crate::{
    ADDRESS_TAG, DATA_TAG, EXTERNAL_IDS_TAG, GEOMETRY_TAG, HEADER_TAG, METADATA_INDEX_TAG, METADATA_TAG,
    REGION_INFO_TAG, TRIANGLE_TAG, VERSION_TAG,
};

/// One entry of the `dat` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFeature {
    pub id: u32,
    pub geom_type: GeomType,
    pub types: Vec<u32>,
    /// Location of a point feature.
    pub point: Option<PointD>,
    /// Offset into `geom<i>` or `trg<i>` for every scale `i` with geometry.
    pub scale_offsets: Vec<Option<u64>>,
}

impl DecodedFeature {
    /// Bit `i` set when scale `i` has geometry.
    #[must_use]
    pub fn scale_mask(&self) -> u8 {
        self.scale_offsets
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_some())
            .fold(0u8, |m, (i, _)| m | (1 << i))
    }

    #[must_use]
    pub fn has_scale(&self, scale: usize) -> bool {
        matches!(self.scale_offsets.get(scale), Some(Some(_)))
    }
}

/// Geometry of one feature at one scale.
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleGeometry {
    Line(Vec<PointD>),
    Strip(Vec<PointD>),
    /// `points` holds three vertices per triangle.
    Triangles { rings: usize, points: Vec<PointD> },
}

impl ScaleGeometry {
    #[must_use]
    pub fn points(&self) -> &[PointD] {
        match self {
            ScaleGeometry::Line(points) | ScaleGeometry::Strip(points) => points,
            ScaleGeometry::Triangles { points, .. } => points,
        }
    }
}

fn corrupt(msg: String) -> CodingError {
    CodingError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, msg))
}

fn to_points(raw: Vec<(f64, f64)>) -> Vec<PointD> {
    raw.into_iter().map(PointD::from).collect()
}

/// Upper bound on buffer space reserved from an untrusted string length.
const MAX_STRING_PREALLOC: u64 = 4096;

fn decode_record(
    id: u32,
    body: &[u8],
    coding: &GeometryCodingParams,
    scales_count: usize,
) -> Result<DecodedFeature, CodingError> {
    let mut r = Cursor::new(body);
    let mut kind = [0u8; 1];
    r.read_exact(&mut kind)?;
    let geom_type = GeomType::from_u8(kind[0])
        .ok_or_else(|| corrupt(format!("feature {} has geometry type {}", id, kind[0])))?;

    let count = read_varuint(&mut r)?;
    let mut types = Vec::with_capacity(count.min(64) as usize);
    for _ in 0..count {
        let t = read_varuint(&mut r)?;
        types.push(u32::try_from(t).map_err(|_| corrupt(format!("type code {} overflows", t)))?);
    }

    let mut point = None;
    let mut scale_offsets = vec![None; scales_count];
    if geom_type == GeomType::Point {
        point = Some(PointD::from(decode_point(&mut r, coding)?));
    } else {
        let mut mask = [0u8; 1];
        r.read_exact(&mut mask)?;
        for (i, slot) in scale_offsets.iter_mut().enumerate() {
            if mask[0] & (1 << i) != 0 {
                *slot = Some(read_varuint(&mut r)?);
            }
        }
    }
    if r.position() != body.len() as u64 {
        return Err(corrupt(format!("feature {} has trailing bytes", id)));
    }
    Ok(DecodedFeature {
        id,
        geom_type,
        types,
        point,
        scale_offsets,
    })
}

fn read_string<R: Read>(r: &mut R) -> Result<String, CodingError> {
    let len = read_varuint(r)?;
    let mut buf = Vec::with_capacity(len.min(MAX_STRING_PREALLOC) as usize);
    r.by_ref().take(len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(corrupt(format!("string of {} bytes is truncated at {}", len, buf.len())));
    }
    String::from_utf8(buf).map_err(|e| corrupt(e.to_string()))
}

/// Read access to a map file produced by
/// [`generate_final_features`](crate::generate_final_features).
pub struct MapReader<R: Reader = FileReader> {
    container: ContainerReader<R>,
    header: DataHeader,
    version: VersionInfo,
}

impl MapReader<FileReader> {
    /// Opens the map file at `path` and parses its `version` and `header`.
    ///
    /// # Errors
    ///
    /// Fails if the container is damaged or either section is missing or
    /// malformed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        Self::from_container(ContainerReader::open(path)?)
    }
}

impl<R: Reader> MapReader<R> {
    pub fn from_container(container: ContainerReader<R>) -> Result<Self, ContainerError> {
        let version = VersionInfo::read_from(&mut Cursor::new(container.read_section(VERSION_TAG)?))?;
        let header = DataHeader::load(&mut Cursor::new(container.read_section(HEADER_TAG)?))?;
        Ok(Self {
            container,
            header,
            version,
        })
    }

    #[must_use]
    pub fn header(&self) -> &DataHeader {
        &self.header
    }

    #[must_use]
    pub fn version(&self) -> VersionInfo {
        self.version
    }

    #[must_use]
    pub fn container(&self) -> &ContainerReader<R> {
        &self.container
    }

    /// Region key/value pairs from `rgninfo`.
    pub fn region(&self) -> Result<RegionData, ContainerError> {
        let buf = self.container.read_section(REGION_INFO_TAG)?;
        let mut r = Cursor::new(buf.as_slice());
        let mut region = RegionData::default();
        for _ in 0..read_varuint(&mut r)? {
            let key = read_string(&mut r)?;
            let value = read_string(&mut r)?;
            region.set(key, value);
        }
        Ok(region)
    }

    /// Every feature of `dat`, in id order.
    pub fn features(&self) -> Result<Vec<DecodedFeature>, ContainerError> {
        let buf = self.container.read_section(DATA_TAG)?;
        let mut r = Cursor::new(buf.as_slice());
        let mut out = Vec::new();
        while (r.position() as usize) < buf.len() {
            let len = read_varuint(&mut r)? as usize;
            let start = r.position() as usize;
            let body = start
                .checked_add(len)
                .and_then(|end| buf.get(start..end))
                .ok_or_else(|| ContainerError::Corrupt(format!("record at {} overruns dat", start)))?;
            let id = out.len() as u32;
            out.push(decode_record(id, body, self.header.coding(), self.header.scales_count())?);
            r.set_position((start + len) as u64);
        }
        Ok(out)
    }

    /// Geometry of `feature` at `scale`, `None` when that scale has none.
    pub fn geometry(&self, feature: &DecodedFeature, scale: usize) -> Result<Option<ScaleGeometry>, ContainerError> {
        let Some(Some(offset)) = feature.scale_offsets.get(scale).copied() else {
            return Ok(None);
        };
        let coding = self.header.coding();
        let geometry = match feature.geom_type {
            GeomType::Point => return Ok(None),
            GeomType::Line => {
                let mut src = ReaderSource::new(self.container.section_reader(&format!("{}{}", GEOMETRY_TAG, scale))?);
                src.skip(offset)?;
                ScaleGeometry::Line(to_points(decode_points(&mut src, coding)?))
            }
            GeomType::Area => {
                let mut src = ReaderSource::new(self.container.section_reader(&format!("{}{}", TRIANGLE_TAG, scale))?);
                src.skip(offset)?;
                let mut kind = [0u8; 1];
                src.read_exact(&mut kind).map_err(CodingError::from)?;
                match kind[0] {
                    STRIP_KIND => ScaleGeometry::Strip(to_points(decode_points(&mut src, coding)?)),
                    LIST_KIND => {
                        let rings = read_varuint(&mut src)? as usize;
                        ScaleGeometry::Triangles {
                            rings,
                            points: to_points(decode_points(&mut src, coding)?),
                        }
                    }
                    other => {
                        return Err(ContainerError::Corrupt(format!(
                            "area entry of feature {} has kind {}",
                            feature.id, other
                        )))
                    }
                }
            }
        };
        Ok(Some(geometry))
    }

    /// `(feature id, offset into meta)` pairs, ascending by id.
    pub fn metadata_index(&self) -> Result<Vec<(u32, u32)>, ContainerError> {
        let buf = self.container.read_section(METADATA_INDEX_TAG)?;
        if buf.len() % 8 != 0 {
            return Err(ContainerError::Corrupt(format!("metaidx length {} is not a multiple of 8", buf.len())));
        }
        Ok(buf
            .chunks_exact(8)
            .map(|c| {
                (
                    u32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                    u32::from_le_bytes([c[4], c[5], c[6], c[7]]),
                )
            })
            .collect())
    }

    /// Metadata of feature `id`, `None` when it has none.
    pub fn metadata(&self, id: u32) -> Result<Option<Metadata>, ContainerError> {
        let index = self.metadata_index()?;
        let Ok(pos) = index.binary_search_by_key(&id, |&(fid, _)| fid) else {
            return Ok(None);
        };
        let mut src = ReaderSource::new(self.container.section_reader(METADATA_TAG)?);
        src.skip(u64::from(index[pos].1))?;
        Ok(Some(Metadata::read_from(&mut src)?))
    }

    /// Address entries, one per feature in id order.
    pub fn addresses(&self) -> Result<Vec<AddressData>, ContainerError> {
        let buf = self.container.read_section(ADDRESS_TAG)?;
        let mut r = Cursor::new(buf.as_slice());
        let mut out = Vec::new();
        while (r.position() as usize) < buf.len() {
            out.push(AddressData::read_from(&mut r)?);
        }
        Ok(out)
    }

    /// `(source id, feature id)` pairs sorted by source id, `None` when the
    /// file type carries no `extids` section.
    pub fn external_ids(&self) -> Result<Option<Vec<(u64, u32)>>, ContainerError> {
        if !self.container.has(EXTERNAL_IDS_TAG) {
            return Ok(None);
        }
        let buf = self.container.read_section(EXTERNAL_IDS_TAG)?;
        if buf.len() % 12 != 0 {
            return Err(ContainerError::Corrupt(format!("extids length {} is not a multiple of 12", buf.len())));
        }
        let mut out = Vec::with_capacity(buf.len() / 12);
        for c in buf.chunks_exact(12) {
            let mut source = [0u8; 8];
            source.copy_from_slice(&c[..8]);
            let mut id = [0u8; 4];
            id.copy_from_slice(&c[8..]);
            out.push((u64::from_le_bytes(source), u32::from_le_bytes(id)));
        }
        Ok(Some(out))
    }
}
