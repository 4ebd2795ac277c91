//! Triangle-list fallback for areas that cannot be emitted as one strip.

use geo::{Coord, LineString, Polygon, TriangulateEarcut};

use crate::PointD;

/// Three vertices of one output triangle.
pub type Triangle = [PointD; 3];

fn to_line_string(ring: &[PointD]) -> LineString<f64> {
    LineString::from(ring.iter().map(|&p| Coord::from(p)).collect::<Vec<_>>())
}

/// Triangulates the area of `outer` minus `holes`.
///
/// Rings may be given open or closed. Degenerate input yields no triangles.
#[must_use]
pub fn triangulate(outer: &[PointD], holes: &[Vec<PointD>]) -> Vec<Triangle> {
    if outer.len() < 3 {
        return Vec::new();
    }

    let polygon = Polygon::new(
        to_line_string(outer),
        holes
            .iter()
            .filter(|h| h.len() >= 3)
            .map(|h| to_line_string(h))
            .collect(),
    );

    polygon
        .earcut_triangles()
        .into_iter()
        .map(|t| {
            let [a, b, c] = t.to_array();
            [a.into(), b.into(), c.into()]
        })
        .collect()
}
