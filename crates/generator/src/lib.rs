//! # Generator - raw features to a multi-scale map file
//!
//! Turns the unordered raw feature file into a sectioned container
//! organised by spatial locality and by zoom level.
//!
//! ## Pipeline
//!
//! ```text
//! raw features ──► SpatialSorter ──► (key, offset) sorted
//!                      │ centroid
//!                      ▼
//!              GeometryCodingParams (fixed for the whole file)
//!                      │
//! re-read by offset ───┴──► MultiScaleCollector ─┬─► dat / addr / meta / metaidx / extids
//!                            │ per scale, finest  │
//!                            ▼ to coarsest        │
//!                    ScaleSimplifier ─► GeometryPacker ─► geom<i> / trg<i>
//!                                                 │
//!                                                 ▼
//!                                       ContainerWriter::finish
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module         | Purpose                                               |
//! |----------------|-------------------------------------------------------|
//! | [`sorter`]     | Representative points, Z-order keys, stable sort      |
//! | [`simplifier`] | Per-level point reduction with the right metric       |
//! | [`packer`]     | Lines, strips and triangle lists into scale sections  |
//! | [`collector`]  | Scale loop, feature ids, attribute sections           |
//! | [`header`]     | `version` and `header` sections                       |
//! | [`reader`]     | Decoding of finished files                            |
//!
//! The build either completes and renames the finished file into place or
//! fails with a [`BuildError`]; staged sections are removed on every path.

pub mod collector;
mod error;
pub mod header;
pub mod packer;
pub mod reader;
pub mod simplifier;
pub mod sorter;

use std::path::Path;

use coding::{FileReader, GeometryCodingParams};
use config::{BuildConfig, MapType, RegionData};
use feature::RawFeatureReader;
use geometry::RectD;
use tracing::{info, warn};

pub use collector::{BuildSummary, FeatureSink, MultiScaleCollector};
pub use error::BuildError;
pub use header::{DataHeader, VersionInfo, FORMAT_VERSION};
pub use packer::{GeometryPacker, PackedGeometry};
pub use reader::{DecodedFeature, MapReader, ScaleGeometry};
pub use simplifier::ScaleSimplifier;
pub use sorter::SpatialSorter;

pub const VERSION_TAG: &str = "version";
pub const HEADER_TAG: &str = "header";
pub const REGION_INFO_TAG: &str = "rgninfo";
pub const DATA_TAG: &str = "dat";
/// Prefix of the per-scale line sections `geom0`, `geom1`, ...
pub const GEOMETRY_TAG: &str = "geom";
/// Prefix of the per-scale area sections `trg0`, `trg1`, ...
pub const TRIANGLE_TAG: &str = "trg";
pub const METADATA_TAG: &str = "meta";
pub const METADATA_INDEX_TAG: &str = "metaidx";
pub const ADDRESS_TAG: &str = "addr";
pub const EXTERNAL_IDS_TAG: &str = "extids";

/// Source of the border rectangle that overrides observed bounds.
pub trait BoundsProvider {
    fn borders_rect(&self) -> Option<RectD>;
}

impl BoundsProvider for Option<RectD> {
    fn borders_rect(&self) -> Option<RectD> {
        *self
    }
}

impl BoundsProvider for RectD {
    fn borders_rect(&self) -> Option<RectD> {
        Some(*self)
    }
}

/// Per-build inputs other than the files themselves.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo<'a> {
    pub map_type: MapType,
    pub config: &'a BuildConfig,
    pub region: &'a RegionData,
    /// Build date as `YYMMDD`, stored in the `version` section.
    pub version_date: u32,
}

/// Builds the map file at `output` from the raw feature file at `raw_path`.
///
/// 1. One sequential pass computes a sort key per feature and the centroid
///    used as the coding base point.
/// 2. Features are re-read by offset in key order and handed to a
///    [`MultiScaleCollector`].
/// 3. Bounds are replaced by `borders` when it has a rectangle.
///
/// # Errors
///
/// [`BuildError::NoFeatures`] if no feature has a location, otherwise any
/// I/O failure or limit breach. On error nothing is left at `output`.
pub fn generate_final_features(
    raw_path: &Path,
    output: &Path,
    info: &BuildInfo<'_>,
    borders: &dyn BoundsProvider,
) -> Result<BuildSummary, BuildError> {
    let file = FileReader::open(raw_path).map_err(|e| BuildError::coding("open raw features", raw_path, e))?;
    let raw = RawFeatureReader::from_reader(file);

    let mut sorter = SpatialSorter::new();
    raw.for_each(|record, offset| {
        sorter.add(&record, offset);
    })?;
    let Some(center) = sorter.center() else {
        return Err(BuildError::NoFeatures);
    };
    sorter.sort();
    info!(
        features = sorter.len(),
        skipped = sorter.skipped(),
        raw = %raw_path.display(),
        "sorted features"
    );

    let coord_bits = info.map_type.coord_bits(info.config.coord_bits);
    let coding = GeometryCodingParams::new(coord_bits, (center.x, center.y));
    let header = DataHeader::new(info.map_type, coding);

    let mut collector = MultiScaleCollector::new(
        output,
        header,
        &info.config.classificator,
        info.region,
        info.version_date,
    )?;
    for &(_, offset) in sorter.entries() {
        let (record, _) = raw.read_at(offset)?;
        collector.accept_feature(&record)?;
    }

    match borders.borders_rect() {
        Some(rect) => collector.set_bounds(rect),
        None => warn!(output = %output.display(), "no borders, using bounds of written features"),
    }

    collector.finish()
}

#[cfg(test)]
mod tests;
