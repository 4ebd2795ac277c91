//! Map kinds and the zoom thresholds each kind is generated for.

use geometry::scales::{UPPER_SCALE, UPPER_WORLD_SCALE};
use serde::{Deserialize, Serialize};

/// Dense threshold set used for region (country) files.
pub const COUNTRY_SCALES: [u8; 4] = [10, 12, 14, UPPER_SCALE];

/// Sparse threshold set used for world overview files.
pub const WORLD_SCALES: [u8; 4] = [3, 5, 7, UPPER_WORLD_SCALE];

/// Coordinate bit depth for country files.
pub const DEFAULT_COORD_BITS: u8 = 27;

/// Kind of file being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapType {
    World = 0,
    WorldCoasts = 1,
    Country = 2,
}

impl MapType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(MapType::World),
            1 => Some(MapType::WorldCoasts),
            2 => Some(MapType::Country),
            _ => None,
        }
    }

    /// Zoom thresholds, coarsest first.
    #[must_use]
    pub fn scales(self) -> &'static [u8] {
        match self {
            MapType::Country => &COUNTRY_SCALES,
            MapType::World | MapType::WorldCoasts => &WORLD_SCALES,
        }
    }

    /// Bit depth for this map type, derived from the country depth `base_bits`.
    ///
    /// World files stop at a coarser zoom so they need fewer bits: one bit
    /// less for every two zoom levels below the finest.
    #[must_use]
    pub fn coord_bits(self, base_bits: u8) -> u8 {
        match self {
            MapType::Country => base_bits,
            MapType::World | MapType::WorldCoasts => {
                base_bits.saturating_sub((UPPER_SCALE - UPPER_WORLD_SCALE) / 2).max(1)
            }
        }
    }

    /// Whether the file carries the source id to feature id map.
    #[must_use]
    pub fn has_external_ids(self) -> bool {
        matches!(self, MapType::World | MapType::Country)
    }

    /// The single finest scale index on which roads keep raw points, if any.
    #[must_use]
    pub fn raw_road_scale(self) -> Option<usize> {
        match self {
            MapType::Country => Some(COUNTRY_SCALES.len() - 1),
            MapType::World | MapType::WorldCoasts => None,
        }
    }
}

/// Zoom range `(lo, hi)` covered by scale index `i`.
///
/// Index 0 covers `0..=scales[0]`; index `i` covers
/// `scales[i - 1] + 1..=scales[i]`.
///
/// # Panics
///
/// Panics if `i` is out of bounds.
#[must_use]
pub fn scale_window(scales: &[u8], i: usize) -> (u8, u8) {
    let lo = if i == 0 { 0 } else { scales[i - 1] + 1 };
    (lo, scales[i])
}
