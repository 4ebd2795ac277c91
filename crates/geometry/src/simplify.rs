//! Recursive point reduction.
//!
//! Both endpoints are always kept. The interior point farthest from the
//! chord between the current endpoints is kept if its squared distance
//! exceeds the tolerance, and both halves are processed the same way;
//! otherwise every interior point of the range is dropped.
//!
//! Pending ranges are held on an explicit stack so long inputs cannot
//! exhaust the call stack.

use crate::{PointD, SegmentDistance};

/// Reduces `points` against `tolerance_sq` (a squared distance) measured by `dist`.
///
/// Never returns more points than it was given. Inputs of two points or
/// fewer are returned unchanged. A closed input (first == last) stays closed
/// because both endpoints are kept.
pub fn simplify_points<D: SegmentDistance>(
    dist: &D,
    tolerance_sq: f64,
    points: &[PointD],
) -> Vec<PointD> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut ranges = vec![(0usize, last)];
    while let Some((first, last)) = ranges.pop() {
        if last <= first + 1 {
            continue;
        }

        let (a, b) = (points[first], points[last]);
        let mut max_dist = f64::NEG_INFINITY;
        let mut max_idx = first;
        for (i, p) in points.iter().enumerate().take(last).skip(first + 1) {
            let d = dist.squared_distance(a, b, *p);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > tolerance_sq {
            keep[max_idx] = true;
            // Right half pushed first so the left half is processed first.
            ranges.push((max_idx, last));
            ranges.push((first, max_idx));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}
