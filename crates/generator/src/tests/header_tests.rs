use super::*;
use coding::{CodingError, GeometryCodingParams};
use std::io::Cursor;

#[test]
fn header_round_trips() -> Result<()> {
    let coding = GeometryCodingParams::new(23, (10.0, 20.0));
    let mut header = DataHeader::new(MapType::World, coding);
    header.set_bounds(RectD::new(-1.0, -2.0, 3.0, 4.0));

    let mut buf = Vec::new();
    header.save(&mut buf)?;
    let loaded = DataHeader::load(&mut Cursor::new(buf))?;
    assert_eq!(loaded, header);
    assert_eq!(loaded.scales(), MapType::World.scales());
    Ok(())
}

#[test]
fn header_rejects_unordered_scales() -> Result<()> {
    let header = DataHeader::new(MapType::Country, GeometryCodingParams::new(27, (0.0, 0.0)));
    let mut buf = Vec::new();
    header.save(&mut buf)?;
    // map_type, count, then the scales.
    buf.swap(2, 3);
    assert!(DataHeader::load(&mut Cursor::new(buf)).is_err());
    Ok(())
}

/// Header bytes for a Country map with the given scales.
fn raw_header(scales: &[u8]) -> Vec<u8> {
    let mut buf = vec![MapType::Country as u8, scales.len() as u8];
    buf.extend_from_slice(scales);
    buf.push(27);
    buf.extend(std::iter::repeat(0u8).take(6 * 8));
    buf
}

#[test]
fn header_accepts_up_to_eight_scales() -> Result<()> {
    let header = DataHeader::load(&mut Cursor::new(raw_header(&[3, 5, 7, 9, 11, 13, 15, 17])))?;
    assert_eq!(header.scales_count(), 8);
    Ok(())
}

#[test]
fn header_rejects_more_scales_than_the_mask_holds() {
    let scales: Vec<u8> = (1..=9).collect();
    assert!(DataHeader::load(&mut Cursor::new(raw_header(&scales))).is_err());
}

#[test]
fn map_with_nine_scales_fails_to_open() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.mwm");
    let mut w = container::ContainerWriter::create(&path)?;
    let mut version = Vec::new();
    VersionInfo::current(261018).write_to(&mut version)?;
    w.write_section(VERSION_TAG, &version)?;
    let scales: Vec<u8> = (1..=9).collect();
    w.write_section(HEADER_TAG, &raw_header(&scales))?;
    // One framed line record with every mask bit set: len, kind, no types, mask, 8 offsets.
    w.write_section(DATA_TAG, &[11, 1, 0, 0xff, 0, 0, 0, 0, 0, 0, 0, 0])?;
    w.finish()?;

    assert!(MapReader::open(&path).is_err());
    Ok(())
}

#[test]
fn oversized_string_length_is_corrupt_not_allocated() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.mwm");
    let mut w = container::ContainerWriter::create(&path)?;
    let mut version = Vec::new();
    VersionInfo::current(261018).write_to(&mut version)?;
    w.write_section(VERSION_TAG, &version)?;
    let mut header = Vec::new();
    DataHeader::new(MapType::Country, GeometryCodingParams::new(27, (0.0, 0.0))).save(&mut header)?;
    w.write_section(HEADER_TAG, &header)?;
    // One pair whose key claims about a terabyte but carries two bytes.
    let mut region = Vec::new();
    coding::write_varuint(&mut region, 1)?;
    coding::write_varuint(&mut region, 1 << 40)?;
    region.extend_from_slice(b"ab");
    w.write_section(REGION_INFO_TAG, &region)?;
    w.finish()?;

    let reader = MapReader::open(&path)?;
    assert!(reader.region().is_err());
    Ok(())
}

#[test]
fn header_rejects_unknown_map_type() -> Result<()> {
    let header = DataHeader::new(MapType::Country, GeometryCodingParams::new(27, (0.0, 0.0)));
    let mut buf = Vec::new();
    header.save(&mut buf)?;
    buf[0] = 9;
    assert!(DataHeader::load(&mut Cursor::new(buf)).is_err());
    Ok(())
}

#[test]
fn version_round_trips_and_checks_magic() -> Result<()> {
    let mut buf = Vec::new();
    VersionInfo::current(261018).write_to(&mut buf)?;
    assert_eq!(&buf[..3], b"MGV");
    let v = VersionInfo::read_from(&mut Cursor::new(buf.clone()))?;
    assert_eq!(v.format, FORMAT_VERSION);
    assert_eq!(v.date, 261018);

    buf[0] = b'X';
    let err = VersionInfo::read_from(&mut Cursor::new(buf)).unwrap_err();
    assert!(matches!(err, CodingError::Io(_)));
    Ok(())
}
