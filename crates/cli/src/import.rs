//! GeoJSON to raw feature conversion.
//!
//! Every GeoJSON feature becomes one raw record per simple geometry part.
//! Attributes come from the feature's properties:
//!
//! ```text
//! types      [u32, ...]                 classification codes (required)
//! metadata   {"<u8 key>": "value", ...}
//! address    {street, house_number, postcode, locality}
//! source_id  u64
//! ```
//!
//! Coordinates are taken as `[x, y]` world positions. Polygon rings are
//! closed if the source left them open.

use anyhow::{anyhow, bail, Context, Result};
use feature::{AddressData, FeatureRecord, Geometry, Metadata, RawFeatureWriter};
use geojson::{GeoJson, JsonObject, JsonValue, Value};
use geometry::PointD;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Counters reported after an import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub written: u64,
    pub skipped: u64,
}

#[derive(Debug, Default, Clone)]
struct Attributes {
    types: Vec<u32>,
    metadata: Metadata,
    address: AddressData,
    source_id: Option<u64>,
}

impl Attributes {
    fn record(&self, geometry: Geometry) -> FeatureRecord {
        let mut rec = FeatureRecord::new(geometry, self.types.clone());
        rec.metadata = self.metadata.clone();
        rec.address = self.address.clone();
        rec.source_id = self.source_id;
        rec
    }
}

fn position(coords: &[f64]) -> Result<PointD> {
    match coords {
        [x, y, ..] => Ok(PointD::new(*x, *y)),
        _ => bail!("position has {} coordinates, need at least 2", coords.len()),
    }
}

fn line(coords: &[Vec<f64>]) -> Result<Vec<PointD>> {
    coords.iter().map(|c| position(c)).collect()
}

fn ring(coords: &[Vec<f64>]) -> Result<Vec<PointD>> {
    let mut points = line(coords)?;
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last {
            points.push(first);
        }
    }
    Ok(points)
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Result<Geometry> {
    Ok(Geometry::Area(rings.iter().map(|r| ring(r)).collect::<Result<_>>()?))
}

/// Splits a GeoJSON geometry into simple point, line and area parts.
pub(crate) fn geometries(value: &Value) -> Result<Vec<Geometry>> {
    Ok(match value {
        Value::Point(c) => vec![Geometry::Point(position(c)?)],
        Value::MultiPoint(cs) => cs
            .iter()
            .map(|c| position(c).map(Geometry::Point))
            .collect::<Result<_>>()?,
        Value::LineString(cs) => vec![Geometry::Line(line(cs)?)],
        Value::MultiLineString(ls) => ls
            .iter()
            .map(|l| line(l).map(Geometry::Line))
            .collect::<Result<_>>()?,
        Value::Polygon(rings) => vec![polygon(rings)?],
        Value::MultiPolygon(polys) => polys.iter().map(|p| polygon(p)).collect::<Result<_>>()?,
        Value::GeometryCollection(items) => {
            let mut out = Vec::new();
            for g in items {
                out.extend(geometries(&g.value)?);
            }
            out
        }
    })
}

fn as_u64(v: &JsonValue, what: &str) -> Result<u64> {
    v.as_u64().ok_or_else(|| anyhow!("{} must be a non-negative integer, got {}", what, v))
}

fn as_string(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn attributes(props: Option<&JsonObject>) -> Result<Attributes> {
    let mut attrs = Attributes::default();
    let Some(props) = props else {
        return Ok(attrs);
    };

    if let Some(types) = props.get("types") {
        let list = types.as_array().ok_or_else(|| anyhow!("types must be an array"))?;
        for t in list {
            let code = as_u64(t, "type code")?;
            attrs.types.push(u32::try_from(code).context("type code exceeds u32")?);
        }
    }

    if let Some(meta) = props.get("metadata") {
        let obj = meta.as_object().ok_or_else(|| anyhow!("metadata must be an object"))?;
        for (key, value) in obj {
            let code: u8 = key
                .parse()
                .with_context(|| format!("metadata key {:?} is not a u8", key))?;
            attrs.metadata.set(code, as_string(value));
        }
    }

    if let Some(addr) = props.get("address") {
        let obj = addr.as_object().ok_or_else(|| anyhow!("address must be an object"))?;
        let field = |name: &str| obj.get(name).map(as_string);
        attrs.address = AddressData {
            street: field("street"),
            house_number: field("house_number"),
            postcode: field("postcode"),
            locality: field("locality"),
        };
    }

    if let Some(id) = props.get("source_id") {
        attrs.source_id = Some(as_u64(id, "source_id")?);
    }
    Ok(attrs)
}

/// Converts the GeoJSON document at `input` into a raw feature file at `output`.
///
/// Features without geometry or without `types` are skipped with a
/// warning; malformed coordinates or properties fail the import.
pub fn import_geojson(input: &Path, output: &Path) -> Result<ImportStats> {
    let text = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let doc: GeoJson = text
        .parse()
        .with_context(|| format!("parsing {}", input.display()))?;
    let features = match doc {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => bail!("{} holds a bare geometry, expected features", input.display()),
    };

    let mut writer = RawFeatureWriter::create(output)?;
    let mut stats = ImportStats::default();
    for (index, f) in features.iter().enumerate() {
        let attrs = attributes(f.properties.as_ref()).with_context(|| format!("feature {}", index))?;
        let Some(geometry) = &f.geometry else {
            warn!(index, "feature has no geometry, skipped");
            stats.skipped += 1;
            continue;
        };
        if attrs.types.is_empty() {
            warn!(index, "feature has no types, skipped");
            stats.skipped += 1;
            continue;
        }
        for part in geometries(&geometry.value).with_context(|| format!("feature {}", index))? {
            writer.append(&attrs.record(part))?;
            stats.written += 1;
        }
    }
    writer.finish()?;

    info!(
        input = %input.display(),
        output = %output.display(),
        written = stats.written,
        skipped = stats.skipped,
        "import finished"
    );
    Ok(stats)
}
