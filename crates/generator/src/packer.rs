//! Per-scale geometry encoding.
//!
//! Lines go to `geom<i>` as a point sequence. Areas go to `trg<i>` either
//! as a single triangle strip or, when no strip exists or the polygon has
//! holes, as a triangle list. Once a feature fails to strip at one scale,
//! its coarser scales are written as lists without searching again:
//!
//! ```text
//! geom<i>: count(varuint) | points
//! trg<i>:  kind(u8) = 0 | count(varuint) | points in strip order
//!          kind(u8) = 1 | rings(varuint) | count(varuint) = 3 * triangles | points
//! ```
//!
//! Points are delta coded against the file's [`GeometryCodingParams`].
//! Bytes go straight to the section sink; nothing is held per feature
//! except the offsets.

use coding::{encode_points, write_varuint, GeometryCodingParams};
use container::SectionSink;
use geometry::polygon::{is_closed, limit_rect, MIN_CLOSED_RING_POINTS};
use geometry::scales::is_good_for_level;
use geometry::{find_single_strip, triangulate, PointD, Triangle};
use std::io::{self, Write};
use tracing::debug;

use crate::simplifier::ScaleSimplifier;

/// `trg<i>` entry holding one triangle strip.
pub const STRIP_KIND: u8 = 0;
/// `trg<i>` entry holding a triangle list.
pub const LIST_KIND: u8 = 1;

/// What was written for one scale of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedGeometry {
    Line { points: usize },
    Strip { points: usize },
    Triangles { rings: usize, triangles: usize },
}

/// A closed ring that may be triangulated at `level`.
///
/// Rings under [`MIN_CLOSED_RING_POINTS`] points never qualify.
#[must_use]
pub fn is_good_area(ring: &[PointD], level: u8) -> bool {
    ring.len() >= MIN_CLOSED_RING_POINTS && is_good_for_level(level, &limit_rect(ring))
}

/// Drops the closing point of a closed ring.
fn open_ring(ring: &[PointD]) -> &[PointD] {
    if is_closed(ring) {
        &ring[..ring.len() - 1]
    } else {
        ring
    }
}

/// Encodes the geometry of one feature, scale by scale.
pub struct GeometryPacker<'a> {
    coding: &'a GeometryCodingParams,
    simplifier: ScaleSimplifier,
    is_coast: bool,
    offsets: Vec<Option<u64>>,
    packed: Vec<Option<PackedGeometry>>,
    // Set once a finer scale found no strip; coarser scales go straight to lists.
    strip_failed: bool,
    scratch: Vec<(f64, f64)>,
}

impl<'a> GeometryPacker<'a> {
    pub fn new(
        coding: &'a GeometryCodingParams,
        simplifier: ScaleSimplifier,
        is_coast: bool,
        scales_count: usize,
    ) -> Self {
        Self {
            coding,
            simplifier,
            is_coast,
            offsets: vec![None; scales_count],
            packed: vec![None; scales_count],
            strip_failed: false,
            scratch: Vec::new(),
        }
    }

    /// Bit `i` is set when scale `i` has geometry.
    #[must_use]
    pub fn scale_mask(&self) -> u8 {
        self.offsets
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_some())
            .fold(0u8, |m, (i, _)| m | (1 << i))
    }

    /// Section offsets of the scales that have geometry, coarsest first.
    pub fn offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.offsets.iter().flatten().copied()
    }

    #[must_use]
    pub fn packed(&self, scale: usize) -> Option<PackedGeometry> {
        self.packed.get(scale).copied().flatten()
    }

    /// True if no scale received any geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.iter().all(Option::is_none)
    }

    fn write_points(&mut self, sink: &mut SectionSink, points: &[PointD]) -> io::Result<()> {
        self.scratch.clear();
        self.scratch.extend(points.iter().map(|p| (p.x, p.y)));
        encode_points(sink, self.coding, &self.scratch)
    }

    /// Writes a line's points for `scale`. Fewer than two points write nothing.
    pub fn add_line(&mut self, sink: &mut SectionSink, scale: usize, points: &[PointD]) -> io::Result<()> {
        if points.len() < 2 {
            return Ok(());
        }
        let offset = sink.pos();
        self.write_points(sink, points)?;
        self.offsets[scale] = Some(offset);
        self.packed[scale] = Some(PackedGeometry::Line {
            points: points.len(),
        });
        Ok(())
    }

    /// Writes an area for `scale` at zoom `level`.
    ///
    /// `outer` is the already simplified, closed outer ring; `holes` are the
    /// source hole rings, simplified and size-tested here one by one.
    pub fn add_area(
        &mut self,
        sink: &mut SectionSink,
        scale: usize,
        level: u8,
        outer: &[PointD],
        holes: &[Vec<PointD>],
    ) -> io::Result<()> {
        // Coast outlines are kept regardless of size; the point count rule still holds.
        let outer_good = outer.len() >= MIN_CLOSED_RING_POINTS
            && (self.is_coast || is_good_area(outer, level));

        if outer_good && holes.is_empty() && !self.strip_failed {
            let ring = open_ring(outer);
            match find_single_strip(ring) {
                Some(order) => {
                    let strip: Vec<PointD> = order.iter().map(|&i| ring[i]).collect();
                    return self.write_strip(sink, scale, &strip);
                }
                None => {
                    debug!(scale, points = ring.len(), "no single strip, using triangle list");
                    self.strip_failed = true;
                }
            }
        }

        let hole_level = if self.is_coast && scale == 0 {
            level.saturating_add(1)
        } else {
            level
        };
        let kept_holes: Vec<Vec<PointD>> = holes
            .iter()
            .filter_map(|hole| {
                let simplified = self.simplifier.simplify(hole, level);
                if is_good_area(&simplified, hole_level) {
                    Some(open_ring(&simplified).to_vec())
                } else {
                    debug!(scale, points = simplified.len(), "hole ring dropped");
                    None
                }
            })
            .collect();

        let (rings, triangles) = if outer_good {
            (1 + kept_holes.len(), triangulate(open_ring(outer), &kept_holes))
        } else {
            let triangles: Vec<Triangle> = kept_holes
                .iter()
                .flat_map(|hole| triangulate(hole, &[]))
                .collect();
            (kept_holes.len(), triangles)
        };

        if rings == 0 || triangles.is_empty() {
            return Ok(());
        }
        self.write_triangles(sink, scale, rings, &triangles)
    }

    fn write_strip(&mut self, sink: &mut SectionSink, scale: usize, strip: &[PointD]) -> io::Result<()> {
        let offset = sink.pos();
        sink.write_all(&[STRIP_KIND])?;
        self.write_points(sink, strip)?;
        self.offsets[scale] = Some(offset);
        self.packed[scale] = Some(PackedGeometry::Strip {
            points: strip.len(),
        });
        Ok(())
    }

    fn write_triangles(
        &mut self,
        sink: &mut SectionSink,
        scale: usize,
        rings: usize,
        triangles: &[Triangle],
    ) -> io::Result<()> {
        let offset = sink.pos();
        sink.write_all(&[LIST_KIND])?;
        write_varuint(sink, rings as u64)?;
        let points: Vec<PointD> = triangles.iter().flat_map(|t| t.iter().copied()).collect();
        self.write_points(sink, &points)?;
        self.offsets[scale] = Some(offset);
        self.packed[scale] = Some(PackedGeometry::Triangles {
            rings,
            triangles: triangles.len(),
        });
        Ok(())
    }
}
