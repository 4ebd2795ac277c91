mod header_tests;
mod sorter_tests;

use crate::*;
use anyhow::Result;
use config::{BuildConfig, Classificator, MapType, RegionData, TypeInfo};
use feature::{FeatureRecord, RawFeatureWriter};
use geometry::{PointD, RectD};
use std::path::{Path, PathBuf};

// -------------------- Fixtures --------------------

pub(crate) const CITY: u32 = 1;
pub(crate) const ROAD: u32 = 2;
pub(crate) const WATER: u32 = 3;
pub(crate) const COAST: u32 = 4;
pub(crate) const BENCH: u32 = 5;
pub(crate) const STREAM: u32 = 6;

pub(crate) fn p(x: f64, y: f64) -> PointD {
    PointD::new(x, y)
}

/// Closed axis-aligned square, counter-clockwise.
pub(crate) fn square(x: f64, y: f64, side: f64) -> Vec<PointD> {
    vec![
        p(x, y),
        p(x + side, y),
        p(x + side, y + side),
        p(x, y + side),
        p(x, y),
    ]
}

pub(crate) fn classificator() -> Classificator {
    Classificator::from_types([
        TypeInfo::new(CITY, "place-city", 4, 17),
        TypeInfo::new(ROAD, "highway-primary", 0, 17).road(),
        TypeInfo::new(WATER, "natural-water", 0, 17),
        TypeInfo::new(COAST, "natural-coastline", 0, 17).coastline(),
        TypeInfo::new(BENCH, "amenity-bench", 16, 17),
        TypeInfo::new(STREAM, "waterway-stream", 0, 17),
    ])
    .expect("valid test classificator")
}

pub(crate) fn test_config() -> BuildConfig {
    BuildConfig {
        classificator: classificator(),
        ..BuildConfig::default()
    }
}

pub(crate) fn write_raw(path: &Path, features: &[FeatureRecord]) -> Result<Vec<u64>> {
    let mut w = RawFeatureWriter::create(path)?;
    let mut offsets = Vec::with_capacity(features.len());
    for f in features {
        offsets.push(w.append(f)?);
    }
    w.finish()?;
    Ok(offsets)
}

/// Writes `features` to a raw file in `dir` and builds `map.mwm` from it.
pub(crate) fn build_map(
    dir: &Path,
    features: &[FeatureRecord],
    map_type: MapType,
    borders: Option<RectD>,
) -> Result<(PathBuf, BuildSummary)> {
    let raw = dir.join("features.raw");
    write_raw(&raw, features)?;
    let out = dir.join("map.mwm");
    let config = test_config();
    let mut region = RegionData::default();
    region.set("name", "Testland");
    let info = BuildInfo {
        map_type,
        config: &config,
        region: &region,
        version_date: 261018,
    };
    let summary = generate_final_features(&raw, &out, &info, &borders)?;
    Ok((out, summary))
}

/// Feature id that `source_id` was written under.
pub(crate) fn id_of(reader: &MapReader, source_id: u64) -> Result<u32> {
    let ids = reader.external_ids()?.ok_or_else(|| anyhow::anyhow!("no extids section"))?;
    let pos = ids
        .binary_search_by_key(&source_id, |&(s, _)| s)
        .map_err(|_| anyhow::anyhow!("source id {} not written", source_id))?;
    Ok(ids[pos].1)
}
