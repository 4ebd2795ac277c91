//! `version` and `header` sections.
//!
//! ```text
//! version: "MGV" | format(varuint) | date(varuint)
//! header:  map_type(u8) | scales_count(u8) | scales(u8...) | coord_bits(u8)
//!          | base_x(f64) base_y(f64) | min_x min_y max_x max_y (f64)
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use coding::{read_varuint, write_varuint, CodingError, GeometryCodingParams};
use config::MapType;
use geometry::RectD;
use std::io::{self, Read, Write};

/// Magic at the start of the `version` section.
pub const VERSION_MAGIC: &[u8; 3] = b"MGV";

/// Feature records carry one `u8` scale mask, so a file has at most 8 scales.
pub const MAX_SCALES: usize = 8;

/// Layout version of files written by this generator.
pub const FORMAT_VERSION: u32 = 1;

fn invalid(msg: String) -> CodingError {
    CodingError::Io(io::Error::new(io::ErrorKind::InvalidData, msg))
}

/// Content of the `version` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub format: u32,
    /// Build date as `YYMMDD`.
    pub date: u32,
}

impl VersionInfo {
    #[must_use]
    pub fn current(date: u32) -> Self {
        Self {
            format: FORMAT_VERSION,
            date,
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(VERSION_MAGIC)?;
        write_varuint(w, u64::from(self.format))?;
        write_varuint(w, u64::from(self.date))?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, CodingError> {
        let mut magic = [0u8; 3];
        r.read_exact(&mut magic)?;
        if &magic != VERSION_MAGIC {
            return Err(invalid(format!("bad version magic {:?}", magic)));
        }
        let to_u32 = |v: u64| u32::try_from(v).map_err(|_| invalid(format!("version field {} overflows", v)));
        let format = to_u32(read_varuint(r)?)?;
        let date = to_u32(read_varuint(r)?)?;
        Ok(Self { format, date })
    }
}

/// Per-file parameters every reader needs before touching features.
#[derive(Debug, Clone, PartialEq)]
pub struct DataHeader {
    map_type: MapType,
    scales: Vec<u8>,
    coding: GeometryCodingParams,
    bounds: RectD,
}

impl DataHeader {
    /// Header for `map_type` with its preset scales and empty bounds.
    pub fn new(map_type: MapType, coding: GeometryCodingParams) -> Self {
        Self {
            map_type,
            scales: map_type.scales().to_vec(),
            coding,
            bounds: RectD::empty(),
        }
    }

    #[must_use]
    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    /// Zoom thresholds, coarsest first.
    #[must_use]
    pub fn scales(&self) -> &[u8] {
        &self.scales
    }

    #[must_use]
    pub fn scales_count(&self) -> usize {
        self.scales.len()
    }

    #[must_use]
    pub fn coding(&self) -> &GeometryCodingParams {
        &self.coding
    }

    #[must_use]
    pub fn bounds(&self) -> RectD {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: RectD) {
        self.bounds = bounds;
    }

    pub fn save<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u8(self.map_type as u8)?;
        w.write_u8(self.scales.len() as u8)?;
        w.write_all(&self.scales)?;
        w.write_u8(self.coding.coord_bits())?;
        let (bx, by) = self.coding.base_point();
        for v in [
            bx,
            by,
            self.bounds.min_x,
            self.bounds.min_y,
            self.bounds.max_x,
            self.bounds.max_y,
        ] {
            w.write_f64::<LittleEndian>(v)?;
        }
        Ok(())
    }

    pub fn load<R: Read>(r: &mut R) -> Result<Self, CodingError> {
        let raw_type = r.read_u8()?;
        let map_type =
            MapType::from_u8(raw_type).ok_or_else(|| invalid(format!("unknown map type {}", raw_type)))?;
        let count = r.read_u8()? as usize;
        if count > MAX_SCALES {
            return Err(invalid(format!("{} scales exceed the limit of {}", count, MAX_SCALES)));
        }
        let mut scales = vec![0u8; count];
        r.read_exact(&mut scales)?;
        if scales.is_empty() || scales.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid(format!("scales {:?} are not strictly increasing", scales)));
        }

        let coord_bits = r.read_u8()?;
        if coord_bits == 0 || coord_bits > coding::MAX_COORD_BITS {
            return Err(invalid(format!("coord_bits {} out of range", coord_bits)));
        }
        let mut f = [0f64; 6];
        for v in &mut f {
            *v = r.read_f64::<LittleEndian>()?;
        }
        Ok(Self {
            map_type,
            scales,
            coding: GeometryCodingParams::new(coord_bits, (f[0], f[1])),
            bounds: RectD::new(f[2], f[3], f[4], f[5]),
        })
    }
}
