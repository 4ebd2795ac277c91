use geometry::scales::epsilon_for_simplify;
use geometry::{simplify_points, PointD, RectBoundedDistance, RectD, SquaredSegmentDistance};

/// Reduces point sequences to the detail of one zoom level.
///
/// Coastline features measure distances with [`RectBoundedDistance`] over
/// the feature's bounding rectangle so cell-border vertices survive; every
/// other feature uses plain segment distance.
#[derive(Debug, Clone, Copy)]
pub enum ScaleSimplifier {
    Plain,
    Coast(RectBoundedDistance),
}

impl ScaleSimplifier {
    pub fn new(is_coast: bool, rect: RectD) -> Self {
        if is_coast {
            ScaleSimplifier::Coast(RectBoundedDistance::new(rect))
        } else {
            ScaleSimplifier::Plain
        }
    }

    /// Simplified copy of `points` for `level`.
    ///
    /// The tolerance is the pixel size one level finer than `level`, so it
    /// grows as the level gets coarser.
    #[must_use]
    pub fn simplify(&self, points: &[PointD], level: u8) -> Vec<PointD> {
        let eps = epsilon_for_simplify(level);
        let tolerance_sq = eps * eps;
        match self {
            ScaleSimplifier::Plain => simplify_points(&SquaredSegmentDistance, tolerance_sq, points),
            ScaleSimplifier::Coast(dist) => simplify_points(dist, tolerance_sq, points),
        }
    }
}
