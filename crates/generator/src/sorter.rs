//! Spatial ordering of raw features.
//!
//! Each feature is reduced to one representative point, the point is put on
//! a 32-bit world grid, and the grid coordinates are bit-interleaved into a
//! Z-order (Morton) key. Features close on the map get close keys, so
//! emitting them in key order keeps neighbours close in the file.

use coding::GeometryCodingParams;
use feature::FeatureRecord;
use geometry::PointD;
use tracing::warn;

/// Spreads the 32 bits of `v` over the even bits of a `u64`.
fn spread_bits(v: u32) -> u64 {
    let mut x = u64::from(v);
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

/// Collects `(key, offset)` pairs in one pass over the raw file.
pub struct SpatialSorter {
    grid: GeometryCodingParams,
    entries: Vec<(u64, u64)>,
    sum_x: f64,
    sum_y: f64,
    skipped: u64,
}

impl Default for SpatialSorter {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialSorter {
    pub fn new() -> Self {
        Self {
            grid: GeometryCodingParams::new(32, (0.0, 0.0)),
            entries: Vec::new(),
            sum_x: 0.0,
            sum_y: 0.0,
            skipped: 0,
        }
    }

    /// Z-order key of a world point.
    #[must_use]
    pub fn key(&self, p: PointD) -> u64 {
        let q = self.grid.quantize((p.x, p.y));
        spread_bits(q.x) | (spread_bits(q.y) << 1)
    }

    /// Records the feature stored at `offset`.
    ///
    /// Returns `false` (and logs) when the feature has no representative
    /// point; such features are left out of the sorted order.
    pub fn add(&mut self, record: &FeatureRecord, offset: u64) -> bool {
        let Some(mid) = record.representative_point() else {
            warn!(offset, "feature has no representative point, excluded from sort");
            self.skipped += 1;
            return false;
        };
        self.sum_x += mid.x;
        self.sum_y += mid.y;
        self.entries.push((self.key(mid), offset));
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Features excluded because they had no representative point.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Average of all representative points, `None` before the first feature.
    #[must_use]
    pub fn center(&self) -> Option<PointD> {
        if self.entries.is_empty() {
            return None;
        }
        let n = self.entries.len() as f64;
        Some(PointD::new(self.sum_x / n, self.sum_y / n))
    }

    /// Sorts by key; equal keys keep ascending offset order.
    pub fn sort(&mut self) {
        self.entries.sort_by_key(|&(key, offset)| (key, offset));
    }

    /// The `(key, offset)` pairs, in sorted order after [`sort`](Self::sort).
    #[must_use]
    pub fn entries(&self) -> &[(u64, u64)] {
        &self.entries
    }
}
