use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use coding::{read_varuint, write_varuint, CodingError};
use geometry::{PointD, RectD};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};

/// Upper bound on preallocation while decoding untrusted counts.
const MAX_PREALLOC: usize = 64 * 1024;

/// Geometry kind, stored as the first byte of raw and final records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeomType {
    Point = 0,
    Line = 1,
    Area = 2,
}

impl GeomType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(GeomType::Point),
            1 => Some(GeomType::Line),
            2 => Some(GeomType::Area),
            _ => None,
        }
    }
}

/// Feature geometry in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(PointD),
    Line(Vec<PointD>),
    /// Closed rings; the first is the outer boundary, the rest are holes.
    Area(Vec<Vec<PointD>>),
}

/// Key-value metadata attached to a feature (opening hours, phone, ...).
///
/// Keys are small integer codes; the payload layout is opaque to the
/// generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<u8, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: u8, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value);
        }
    }

    pub fn get(&self, key: u8) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Wire format: `count(varuint)` then `key(u8) len(varuint) bytes` per entry.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_varuint(w, self.entries.len() as u64)?;
        for (key, value) in &self.entries {
            w.write_u8(*key)?;
            write_string(w, value)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, CodingError> {
        let count = read_varuint(r)?;
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let key = r.read_u8()?;
            entries.insert(key, read_string(r)?);
        }
        Ok(Self { entries })
    }
}

/// Address and locality fields used by search index builders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressData {
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postcode: Option<String>,
    pub locality: Option<String>,
}

impl AddressData {
    fn fields(&self) -> [&Option<String>; 4] {
        [&self.street, &self.house_number, &self.postcode, &self.locality]
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|f| f.is_none())
    }

    /// Wire format: presence mask (bit per field) then `len(varuint) bytes` per present field.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let fields = self.fields();
        let mask = fields
            .iter()
            .enumerate()
            .fold(0u8, |m, (i, f)| if f.is_some() { m | (1 << i) } else { m });
        w.write_u8(mask)?;
        for value in fields.iter().filter_map(|f| f.as_deref()) {
            write_string(w, value)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, CodingError> {
        let mask = r.read_u8()?;
        let mut read_field = |bit: u8| -> Result<Option<String>, CodingError> {
            if mask & (1 << bit) != 0 {
                read_string(r).map(Some)
            } else {
                Ok(None)
            }
        };
        Ok(Self {
            street: read_field(0)?,
            house_number: read_field(1)?,
            postcode: read_field(2)?,
            locality: read_field(3)?,
        })
    }
}

/// One source feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub geometry: Geometry,
    /// Classification type codes.
    pub types: Vec<u32>,
    pub metadata: Metadata,
    pub address: AddressData,
    /// Id of the object in the upstream source, if it has one.
    pub source_id: Option<u64>,
}

impl FeatureRecord {
    pub fn new(geometry: Geometry, types: Vec<u32>) -> Self {
        Self {
            geometry,
            types,
            metadata: Metadata::default(),
            address: AddressData::default(),
            source_id: None,
        }
    }

    pub fn geom_type(&self) -> GeomType {
        match self.geometry {
            Geometry::Point(_) => GeomType::Point,
            Geometry::Line(_) => GeomType::Line,
            Geometry::Area(_) => GeomType::Area,
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self.geometry, Geometry::Line(_))
    }

    pub fn is_area(&self) -> bool {
        matches!(self.geometry, Geometry::Area(_))
    }

    /// Points of a line, or of the outer ring of an area. A point feature
    /// yields its single location.
    pub fn outer_points(&self) -> &[PointD] {
        match &self.geometry {
            Geometry::Point(p) => std::slice::from_ref(p),
            Geometry::Line(points) => points,
            Geometry::Area(rings) => rings.first().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Hole rings of an area; empty for points and lines.
    pub fn inner_rings(&self) -> &[Vec<PointD>] {
        match &self.geometry {
            Geometry::Area(rings) if rings.len() > 1 => &rings[1..],
            _ => &[],
        }
    }

    /// Bounding rectangle of every point of the feature.
    pub fn limit_rect(&self) -> RectD {
        let mut rect = RectD::from_points(self.outer_points());
        for ring in self.inner_rings() {
            rect.add_rect(&RectD::from_points(ring));
        }
        rect
    }

    /// The single point used to place the feature on the sort curve.
    ///
    /// Points use their location; lines and areas use the average of their
    /// (outer) vertices, ignoring the closing point of a ring. Returns `None`
    /// when there is no vertex or the average is not finite.
    pub fn representative_point(&self) -> Option<PointD> {
        let mut points = self.outer_points();
        if self.is_area() && points.len() > 1 && points.first() == points.last() {
            points = &points[..points.len() - 1];
        }
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let mid = PointD::new(sx / n, sy / n);
        mid.is_finite().then_some(mid)
    }

    pub(crate) fn write_body<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u8(self.geom_type() as u8)?;
        write_varuint(w, self.types.len() as u64)?;
        for t in &self.types {
            write_varuint(w, u64::from(*t))?;
        }

        match &self.geometry {
            Geometry::Point(p) => write_point(w, p)?,
            Geometry::Line(points) => write_points(w, points)?,
            Geometry::Area(rings) => {
                write_varuint(w, rings.len() as u64)?;
                for ring in rings {
                    write_points(w, ring)?;
                }
            }
        }

        self.metadata.write_to(w)?;
        self.address.write_to(w)?;
        match self.source_id {
            Some(id) => {
                w.write_u8(1)?;
                w.write_u64::<LittleEndian>(id)?;
            }
            None => w.write_u8(0)?,
        }
        Ok(())
    }

    pub(crate) fn read_body<R: Read>(r: &mut R) -> Result<Self, CodingError> {
        let geom_type = GeomType::from_u8(r.read_u8()?).ok_or_else(|| invalid("unknown geometry type"))?;

        let types_count = read_varuint(r)? as usize;
        let mut types = Vec::with_capacity(types_count.min(MAX_PREALLOC));
        for _ in 0..types_count {
            let t = read_varuint(r)?;
            types.push(u32::try_from(t).map_err(|_| invalid("type code exceeds u32"))?);
        }

        let geometry = match geom_type {
            GeomType::Point => Geometry::Point(read_point(r)?),
            GeomType::Line => Geometry::Line(read_points(r)?),
            GeomType::Area => {
                let count = read_varuint(r)? as usize;
                let mut rings = Vec::with_capacity(count.min(MAX_PREALLOC));
                for _ in 0..count {
                    rings.push(read_points(r)?);
                }
                Geometry::Area(rings)
            }
        };

        let metadata = Metadata::read_from(r)?;
        let address = AddressData::read_from(r)?;
        let source_id = match r.read_u8()? {
            0 => None,
            _ => Some(r.read_u64::<LittleEndian>()?),
        };

        Ok(Self {
            geometry,
            types,
            metadata,
            address,
            source_id,
        })
    }
}

fn invalid(msg: &str) -> CodingError {
    CodingError::Io(io::Error::new(io::ErrorKind::InvalidData, msg.to_string()))
}

fn write_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    write_varuint(w, s.len() as u64)?;
    w.write_all(s.as_bytes())
}

fn read_string<R: Read>(r: &mut R) -> Result<String, CodingError> {
    let len = read_varuint(r)? as usize;
    let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
    r.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(CodingError::Io(io::ErrorKind::UnexpectedEof.into()));
    }
    String::from_utf8(buf).map_err(|_| invalid("string is not utf-8"))
}

fn write_point<W: Write>(w: &mut W, p: &PointD) -> io::Result<()> {
    w.write_f64::<LittleEndian>(p.x)?;
    w.write_f64::<LittleEndian>(p.y)
}

fn read_point<R: Read>(r: &mut R) -> Result<PointD, CodingError> {
    let x = r.read_f64::<LittleEndian>()?;
    let y = r.read_f64::<LittleEndian>()?;
    Ok(PointD::new(x, y))
}

fn write_points<W: Write>(w: &mut W, points: &[PointD]) -> io::Result<()> {
    write_varuint(w, points.len() as u64)?;
    points.iter().try_for_each(|p| write_point(w, p))
}

fn read_points<R: Read>(r: &mut R) -> Result<Vec<PointD>, CodingError> {
    let count = read_varuint(r)? as usize;
    let mut points = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        points.push(read_point(r)?);
    }
    Ok(points)
}
