//! Coordinate quantization and point-sequence encoding.

use std::io::{Read, Result as IoResult, Write};

use crate::varint::{read_varint, read_varuint, write_varint, write_varuint};
use crate::CodingError;

/// Lower bound of both world axes.
pub const WORLD_MIN: f64 = -180.0;
/// Upper bound of both world axes.
pub const WORLD_MAX: f64 = 180.0;

/// Quantized coordinates are stored in `u32`.
pub const MAX_COORD_BITS: u8 = 32;

/// Upper bound on preallocation while decoding untrusted counts.
const MAX_PREALLOC_POINTS: usize = 64 * 1024;

/// A point on the integer grid of a [`GeometryCodingParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointU {
    pub x: u32,
    pub y: u32,
}

/// Bit depth and base point used to encode every coordinate of one file.
///
/// Fixed once per file; the base point is the quantized centroid of all
/// features so that first-point deltas stay small.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryCodingParams {
    coord_bits: u8,
    base: PointU,
}

impl GeometryCodingParams {
    /// Creates coding params for `coord_bits` bits per axis, centered on `base_point`.
    ///
    /// # Panics
    ///
    /// Panics if `coord_bits` is 0 or greater than [`MAX_COORD_BITS`].
    pub fn new(coord_bits: u8, base_point: (f64, f64)) -> Self {
        assert!(
            coord_bits > 0 && coord_bits <= MAX_COORD_BITS,
            "coord_bits must be in 1..=32"
        );
        let mut params = Self {
            coord_bits,
            base: PointU { x: 0, y: 0 },
        };
        params.base = params.quantize(base_point);
        params
    }

    #[must_use]
    pub fn coord_bits(&self) -> u8 {
        self.coord_bits
    }

    /// The base point on the integer grid.
    #[must_use]
    pub fn base(&self) -> PointU {
        self.base
    }

    /// The base point in world coordinates.
    #[must_use]
    pub fn base_point(&self) -> (f64, f64) {
        self.dequantize(self.base)
    }

    fn max_value(&self) -> f64 {
        ((1u64 << self.coord_bits) - 1) as f64
    }

    /// Maps a world point onto the integer grid. Out-of-range input is clamped.
    #[must_use]
    pub fn quantize(&self, p: (f64, f64)) -> PointU {
        let scale = self.max_value() / (WORLD_MAX - WORLD_MIN);
        let q = |v: f64| {
            let v = if v.is_nan() { 0.0 } else { v.clamp(WORLD_MIN, WORLD_MAX) };
            ((v - WORLD_MIN) * scale).round() as u32
        };
        PointU { x: q(p.0), y: q(p.1) }
    }

    /// Maps a grid point back to world coordinates.
    #[must_use]
    pub fn dequantize(&self, q: PointU) -> (f64, f64) {
        let step = (WORLD_MAX - WORLD_MIN) / self.max_value();
        (
            WORLD_MIN + f64::from(q.x) * step,
            WORLD_MIN + f64::from(q.y) * step,
        )
    }

    /// Rounds `p` to the nearest representable point.
    ///
    /// `snap` is idempotent and `decode(encode(snap(p))) == snap(p)` exactly.
    #[must_use]
    pub fn snap(&self, p: (f64, f64)) -> (f64, f64) {
        self.dequantize(self.quantize(p))
    }
}

fn write_delta<W: Write>(w: &mut W, prev: PointU, cur: PointU) -> IoResult<()> {
    write_varint(w, i64::from(cur.x) - i64::from(prev.x))?;
    write_varint(w, i64::from(cur.y) - i64::from(prev.y))?;
    Ok(())
}

fn read_delta<R: Read>(r: &mut R, prev: PointU) -> Result<PointU, CodingError> {
    let dx = read_varint(r)?;
    let dy = read_varint(r)?;
    Ok(PointU {
        x: (i64::from(prev.x) + dx) as u32,
        y: (i64::from(prev.y) + dy) as u32,
    })
}

/// Writes a single point as a delta from the base point.
pub fn encode_point<W: Write>(
    w: &mut W,
    params: &GeometryCodingParams,
    p: (f64, f64),
) -> IoResult<()> {
    write_delta(w, params.base(), params.quantize(p))
}

/// Reads a single point written by [`encode_point`].
pub fn decode_point<R: Read>(
    r: &mut R,
    params: &GeometryCodingParams,
) -> Result<(f64, f64), CodingError> {
    Ok(params.dequantize(read_delta(r, params.base())?))
}

/// Writes `count(varuint)` followed by delta-coded points.
///
/// The first point is a delta from the base point, each following point a
/// delta from its predecessor.
pub fn encode_points<W: Write>(
    w: &mut W,
    params: &GeometryCodingParams,
    points: &[(f64, f64)],
) -> IoResult<()> {
    write_varuint(w, points.len() as u64)?;
    let mut prev = params.base();
    for &p in points {
        let q = params.quantize(p);
        write_delta(w, prev, q)?;
        prev = q;
    }
    Ok(())
}

/// Reads a point sequence written by [`encode_points`].
pub fn decode_points<R: Read>(
    r: &mut R,
    params: &GeometryCodingParams,
) -> Result<Vec<(f64, f64)>, CodingError> {
    let count = read_varuint(r)? as usize;
    let mut out = Vec::with_capacity(count.min(MAX_PREALLOC_POINTS));
    let mut prev = params.base();
    for _ in 0..count {
        prev = read_delta(r, prev)?;
        out.push(params.dequantize(prev));
    }
    Ok(out)
}
