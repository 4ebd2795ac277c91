//! Single triangle-strip search.
//!
//! From a start vertex `s` the strip visits `s, s+1, s-1, s+2, s-2, ...`
//! (indices modulo the ring size). Consecutive triples form the triangles,
//! so each new vertex shares an edge with the previous triangle. Every
//! pair of consecutive strip vertices that are not ring neighbours is an
//! interior diagonal, and all of them must be visible for the strip to
//! cover exactly the ring.

use crate::polygon::{are_adjacent, is_diagonal_visible};
use crate::PointD;

/// Rings with more vertices than this are never searched; the search is
/// cubic in the ring size.
pub const MAX_STRIP_POINTS: usize = 1000;

/// Vertex order of the strip starting at `start` over a ring of `n` points.
fn strip_order(n: usize, start: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(n);
    order.push(start);
    let mut k = 1;
    while order.len() < n {
        let step = (k + 1) / 2;
        let idx = if k % 2 == 1 {
            (start + step) % n
        } else {
            (start + n - step % n) % n
        };
        order.push(idx);
        k += 1;
    }
    order
}

/// Looks for a start vertex from which the open `ring` can be emitted as one strip.
///
/// Returns the strip's vertex indices into `ring`, or `None` when the ring
/// has fewer than 3 or more than [`MAX_STRIP_POINTS`] points, or no start
/// vertex yields only visible diagonals.
#[must_use]
pub fn find_single_strip(ring: &[PointD]) -> Option<Vec<usize>> {
    let n = ring.len();
    if !(3..=MAX_STRIP_POINTS).contains(&n) {
        return None;
    }

    (0..n).map(|start| strip_order(n, start)).find(|order| {
        order
            .windows(2)
            .all(|w| are_adjacent(w[0], w[1], n) || is_diagonal_visible(ring, w[0], w[1]))
    })
}
