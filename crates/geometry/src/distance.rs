//! Point-to-segment distance metrics used by the simplifier.

use crate::{PointD, RectD};

/// Absolute tolerance for "lies on the rect side" checks.
pub const SIDE_EPS: f64 = 1e-7;

/// Squared distance from a point to a segment.
pub trait SegmentDistance {
    fn squared_distance(&self, a: PointD, b: PointD, p: PointD) -> f64;
}

/// Plain Euclidean distance to the closest point of segment `a-b`.
///
/// A degenerate segment (`a == b`) measures the distance to `a`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredSegmentDistance;

impl SegmentDistance for SquaredSegmentDistance {
    fn squared_distance(&self, a: PointD, b: PointD, p: PointD) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return p.squared_length_to(&a);
        }

        let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        p.squared_length_to(&PointD::new(a.x + t * dx, a.y + t * dy))
    }
}

/// Distance for coastline cells.
///
/// Points lying on a side of the cell rectangle report an infinite distance
/// so they always survive simplification. Neighbouring cells then share the
/// exact same border vertices and no gap opens between them.
#[derive(Debug, Clone, Copy)]
pub struct RectBoundedDistance {
    rect: RectD,
    eps: f64,
}

impl RectBoundedDistance {
    pub fn new(rect: RectD) -> Self {
        Self {
            rect,
            eps: SIDE_EPS,
        }
    }

    fn is_on_side(&self, p: PointD) -> bool {
        let near = |a: f64, b: f64| (a - b).abs() <= self.eps;
        near(p.x, self.rect.min_x)
            || near(p.x, self.rect.max_x)
            || near(p.y, self.rect.min_y)
            || near(p.y, self.rect.max_y)
    }
}

impl SegmentDistance for RectBoundedDistance {
    fn squared_distance(&self, a: PointD, b: PointD, p: PointD) -> f64 {
        if self.is_on_side(p) {
            return f64::INFINITY;
        }
        SquaredSegmentDistance.squared_distance(a, b, p)
    }
}
