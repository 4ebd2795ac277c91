use anyhow::{Context, Result};
use feature::GeomType;
use generator::MapReader;
use std::io::Write;
use std::path::Path;

/// Prints the section directory, version, header and feature counts of a map file.
pub fn inspect<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    let reader = MapReader::open(path).with_context(|| format!("opening {}", path.display()))?;

    writeln!(out, "sections:")?;
    for e in reader.container().entries() {
        writeln!(
            out,
            "  {:<8} offset={:<10} len={:<10} crc32={:#010x}",
            e.tag, e.offset, e.len, e.crc32
        )?;
    }

    let version = reader.version();
    writeln!(out, "version: format={} date={}", version.format, version.date)?;

    let header = reader.header();
    let b = header.bounds();
    let (bx, by) = header.coding().base_point();
    writeln!(out, "map_type: {:?}", header.map_type())?;
    writeln!(out, "scales: {:?}", header.scales())?;
    writeln!(out, "coord_bits: {}", header.coding().coord_bits())?;
    writeln!(out, "base_point: ({:.7}, {:.7})", bx, by)?;
    writeln!(
        out,
        "bounds: ({:.7}, {:.7}) - ({:.7}, {:.7})",
        b.min_x, b.min_y, b.max_x, b.max_y
    )?;

    let features = reader.features()?;
    let count = |t: GeomType| features.iter().filter(|f| f.geom_type == t).count();
    writeln!(
        out,
        "features: {} (points={} lines={} areas={})",
        features.len(),
        count(GeomType::Point),
        count(GeomType::Line),
        count(GeomType::Area)
    )?;
    Ok(())
}
