//! Scale levels and their geometric tolerances.
//!
//! One scale level halves the visible world span. At level `l` a 256-pixel
//! tile covers `360 / 2^l` world units, so one pixel is `360 / 2^(l + 8)`.

use crate::RectD;

/// Finest scale stored in region (country) files.
pub const UPPER_SCALE: u8 = 17;

/// Finest scale stored in overview (world) files.
pub const UPPER_WORLD_SCALE: u8 = 9;

const WORLD_SPAN: f64 = 360.0;
const TILE_SIZE_BITS: i32 = 8;

/// Size of one pixel at `level`, in world units.
#[must_use]
pub fn epsilon_for_level(level: u8) -> f64 {
    WORLD_SPAN / 2f64.powi(i32::from(level) + TILE_SIZE_BITS)
}

/// Simplification tolerance for `level`, one level finer than its pixel size.
///
/// Decreases monotonically as `level` grows: coarser levels simplify more.
#[must_use]
pub fn epsilon_for_simplify(level: u8) -> f64 {
    epsilon_for_level(level.saturating_add(1))
}

/// Returns `true` if a shape bounded by `rect` is worth drawing at `level`.
///
/// Everything is kept at the upper scale.
#[must_use]
pub fn is_good_for_level(level: u8, rect: &RectD) -> bool {
    level >= UPPER_SCALE || rect.size_x().max(rect.size_y()) > epsilon_for_level(level)
}
