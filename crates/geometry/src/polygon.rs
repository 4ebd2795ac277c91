//! Ring predicates.
//!
//! Unless stated otherwise a ring here is *open*: the closing point equal to
//! the first one has already been removed.

use crate::{PointD, RectD};

/// Minimum number of points of a closed ring (closing point included).
pub const MIN_CLOSED_RING_POINTS: usize = 4;

/// Returns `true` if `points` has at least two points and first == last.
#[must_use]
pub fn is_closed(points: &[PointD]) -> bool {
    points.len() >= 2 && points.first() == points.last()
}

/// Twice the signed area of an open ring (positive for counter-clockwise).
#[must_use]
pub fn signed_area2(ring: &[PointD]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Even-odd containment test of `p` against an open ring.
#[must_use]
pub fn point_in_ring(p: PointD, ring: &[PointD]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn orientation(a: PointD, b: PointD, c: PointD) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: PointD, b: PointD, p: PointD) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Returns `true` if segments `a-b` and `c-d` share any point, touching included.
#[must_use]
pub fn segments_intersect(a: PointD, b: PointD, c: PointD, d: PointD) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);

    if ((o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0))
        && ((o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0))
    {
        return true;
    }

    (o1 == 0.0 && on_segment(a, b, c))
        || (o2 == 0.0 && on_segment(a, b, d))
        || (o3 == 0.0 && on_segment(c, d, a))
        || (o4 == 0.0 && on_segment(c, d, b))
}

/// Returns `true` if `i` and `j` are neighbours on a ring of `n` points.
#[must_use]
pub fn are_adjacent(i: usize, j: usize, n: usize) -> bool {
    (i + 1) % n == j || (j + 1) % n == i
}

/// Returns `true` if the diagonal between vertices `i` and `j` lies inside the ring.
///
/// The diagonal must not touch any edge that is not incident to `i` or `j`,
/// and its midpoint must be inside the ring.
#[must_use]
pub fn is_diagonal_visible(ring: &[PointD], i: usize, j: usize) -> bool {
    let n = ring.len();
    if i == j || n < 3 {
        return false;
    }
    let (a, b) = (ring[i], ring[j]);
    if a == b {
        return false;
    }

    for k in 0..n {
        let l = (k + 1) % n;
        if k == i || k == j || l == i || l == j {
            continue;
        }
        if segments_intersect(a, b, ring[k], ring[l]) {
            return false;
        }
    }

    point_in_ring(PointD::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0), ring)
}

/// Bounding rect of a ring; convenience wrapper over [`RectD::from_points`].
#[must_use]
pub fn limit_rect(points: &[PointD]) -> RectD {
    RectD::from_points(points)
}
