use super::*;
use std::fs;
use tempfile::tempdir;

const SAMPLE: &str = r#"
coord_bits = 25

[[classificator.types]]
code = 1
name = "highway-primary"
min_scale = 6
road = true

[[classificator.types]]
code = 2
name = "natural-coastline"
min_scale = 0
max_scale = 17
coastline = true

[[classificator.types]]
code = 3
name = "amenity-cafe"
min_scale = 15
max_scale = 17
"#;

fn sample() -> BuildConfig {
    BuildConfig::from_toml_str(SAMPLE).unwrap()
}

// -------------------- BuildConfig --------------------

#[test]
fn parses_sample_config() {
    let cfg = sample();
    assert_eq!(cfg.coord_bits, 25);
    assert_eq!(cfg.classificator.len(), 3);
    let road = cfg.classificator.get(1).unwrap();
    assert_eq!(road.max_scale, 17, "max_scale defaults to the finest zoom");
    assert!(road.road);
}

#[test]
fn empty_config_uses_defaults() {
    let cfg = BuildConfig::from_toml_str("").unwrap();
    assert_eq!(cfg, BuildConfig::default());
    assert_eq!(cfg.coord_bits, DEFAULT_COORD_BITS);
    assert!(cfg.classificator.is_empty());
}

#[test]
fn rejects_bad_values() {
    assert!(matches!(
        BuildConfig::from_toml_str("coord_bits = 0"),
        Err(ConfigError::Invalid(_))
    ));
    assert!(BuildConfig::from_toml_str("coord_bits = 33").is_err());

    let inverted = r#"
[[classificator.types]]
code = 9
name = "x"
min_scale = 12
max_scale = 4
"#;
    assert!(BuildConfig::from_toml_str(inverted).is_err());

    let duplicate = r#"
[[classificator.types]]
code = 9
name = "x"
min_scale = 1
[[classificator.types]]
code = 9
name = "y"
min_scale = 1
"#;
    assert!(BuildConfig::from_toml_str(duplicate).is_err());
}

#[test]
fn load_reports_path_on_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    match BuildConfig::load(&path) {
        Err(ConfigError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected io error, got {:?}", other),
    }
}

#[test]
fn load_from_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("mapgen.toml");
    fs::write(&path, SAMPLE)?;
    assert_eq!(BuildConfig::load(&path)?, sample());
    Ok(())
}

// -------------------- Classificator --------------------

#[test]
fn drawable_range_is_union_of_known_types() {
    let c = sample().classificator;
    assert_eq!(c.drawable_range(&[1, 3]), Some((6, 17)));
    assert_eq!(c.drawable_range(&[3, 999]), Some((15, 17)));
    assert_eq!(c.drawable_range(&[999]), None);
    assert_eq!(c.drawable_range(&[]), None);
}

#[test]
fn drawable_in_window() {
    let c = sample().classificator;
    assert!(!c.is_drawable_in_range(&[3], 0, 14));
    assert!(c.is_drawable_in_range(&[3], 15, 17));
    assert!(c.is_drawable_in_range(&[1], 0, 6));
    assert!(!c.is_drawable_in_range(&[1], 0, 5));
}

#[test]
fn road_and_coastline_predicates() {
    let c = sample().classificator;
    assert!(c.is_road(&[3, 1]));
    assert!(!c.is_road(&[2, 3]));
    assert!(c.is_coastline(&[2]));
    assert!(!c.is_coastline(&[999]));
}

// -------------------- Scales --------------------

#[test]
fn scale_presets_per_map_type() {
    assert_eq!(MapType::Country.scales(), &[10, 12, 14, 17]);
    assert_eq!(MapType::World.scales(), &[3, 5, 7, 9]);
    assert_eq!(MapType::WorldCoasts.scales(), MapType::World.scales());
}

#[test]
fn world_files_use_fewer_coord_bits() {
    assert_eq!(MapType::Country.coord_bits(27), 27);
    assert_eq!(MapType::World.coord_bits(27), 23);
    assert_eq!(MapType::WorldCoasts.coord_bits(27), 23);
    assert_eq!(MapType::World.coord_bits(2), 1);
}

#[test]
fn scale_windows_partition_zoom_range() {
    let scales = MapType::Country.scales();
    assert_eq!(scale_window(scales, 0), (0, 10));
    assert_eq!(scale_window(scales, 1), (11, 12));
    assert_eq!(scale_window(scales, 3), (15, 17));
}

#[test]
fn map_type_flags() {
    assert!(MapType::Country.has_external_ids());
    assert!(MapType::World.has_external_ids());
    assert!(!MapType::WorldCoasts.has_external_ids());
    assert_eq!(MapType::Country.raw_road_scale(), Some(3));
    assert_eq!(MapType::World.raw_road_scale(), None);
    for t in [MapType::World, MapType::WorldCoasts, MapType::Country] {
        assert_eq!(MapType::from_u8(t as u8), Some(t));
    }
    assert_eq!(MapType::from_u8(7), None);
}

// -------------------- Region & borders --------------------

#[test]
fn region_data_loads_and_encodes() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("region.toml");
    fs::write(&path, "name = \"Malta\"\nlanguages = \"mt,en\"\n")?;

    let region = RegionData::load(&path)?;
    assert_eq!(region.get("name"), Some("Malta"));

    let mut buf = Vec::new();
    region.write_to(&mut buf)?;
    // count, then "languages" before "name" in key order.
    assert_eq!(buf[0], 2);
    assert_eq!(buf[1] as usize, "languages".len());
    assert_eq!(&buf[2..11], b"languages");

    let mut empty = Vec::new();
    RegionData::default().write_to(&mut empty)?;
    assert_eq!(empty, vec![0]);
    Ok(())
}

#[test]
fn borders_load_and_validate() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let good = dir.path().join("good.toml");
    fs::write(&good, "min_x = 14.0\nmin_y = 35.7\nmax_x = 14.6\nmax_y = 36.1\n")?;
    let rect = load_borders(&good)?;
    assert_eq!(rect, RectD::new(14.0, 35.7, 14.6, 36.1));

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "min_x = 5.0\nmin_y = 0.0\nmax_x = 1.0\nmax_y = 1.0\n")?;
    assert!(matches!(load_borders(&bad), Err(ConfigError::Invalid(_))));

    let garbage = dir.path().join("garbage.toml");
    fs::write(&garbage, "min_x = \"west\"")?;
    assert!(matches!(load_borders(&garbage), Err(ConfigError::Parse { .. })));
    Ok(())
}
