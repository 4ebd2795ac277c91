use super::*;
use std::io::{Cursor, Read, Write};
use tempfile::tempdir;

const DATA: &[u8] = b"Quick brown fox jumps over a lazy dog...";

/// Exercises the same reads against any reader holding `DATA`.
fn check_reader<R: Reader>(r: &R) {
    assert_eq!(r.size(), DATA.len() as u64);

    let mut head = [0u8; 5];
    r.read_at(0, &mut head).unwrap();
    assert_eq!(&head, b"Quick");

    let mut mid = [0u8; 3];
    r.read_at(6, &mut mid).unwrap();
    assert_eq!(&mid, b"bro");

    let mut tail = [0u8; 3];
    r.read_at(DATA.len() as u64 - 3, &mut tail).unwrap();
    assert_eq!(&tail, b"...");

    // Past the end
    let mut over = [0u8; 4];
    assert!(matches!(
        r.read_at(DATA.len() as u64 - 2, &mut over),
        Err(CodingError::OutOfBounds { .. })
    ));

    let sub = SubReader::new(r, 6, 5).unwrap();
    let mut word = [0u8; 5];
    sub.read_at(0, &mut word).unwrap();
    assert_eq!(&word, b"brown");

    let mut src = ReaderSource::new(r);
    src.skip(10).unwrap();
    let mut rest = String::new();
    src.read_to_string(&mut rest).unwrap();
    assert_eq!(rest.as_bytes(), &DATA[10..]);
    assert_eq!(src.remaining(), 0);
}

// -------------------- Readers --------------------

#[test]
fn mem_reader_smoke() {
    check_reader(&MemReader::new(DATA));
}

#[test]
fn file_reader_smoke() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reader_test.dat");
    std::fs::write(&path, DATA).unwrap();

    let reader = FileReader::open(&path).unwrap();
    assert_eq!(reader.path(), path.as_path());
    check_reader(&reader);
}

#[test]
fn sub_reader_over_prefixed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prefixed.dat");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(b"BlaBla ").unwrap();
    f.write_all(DATA).unwrap();
    drop(f);

    let file = FileReader::open(&path).unwrap();
    let sub = SubReader::skip(&file, 7).unwrap();
    check_reader(&sub);
}

#[test]
fn empty_sub_reader() {
    let mem = MemReader::new(&[]);
    let sub = SubReader::new(mem, 0, 0).unwrap();
    assert_eq!(sub.size(), 0);
    assert!(sub.read_all().unwrap().is_empty());
}

#[test]
fn sub_reader_rejects_window_past_end() {
    let mem = MemReader::new(DATA);
    assert!(SubReader::new(mem, 30, 20).is_err());
}

#[test]
fn file_reader_missing_file_fails() {
    let dir = tempdir().unwrap();
    let res = FileReader::open(dir.path().join("skjhfaxniauiuq2bmnszmn093sklsd"));
    assert!(matches!(res, Err(CodingError::Io(_))));
}

#[test]
fn reader_source_skip_past_end_fails() {
    let mut src = ReaderSource::new(MemReader::new(b"abc"));
    assert!(src.skip(4).is_err());
    src.skip(3).unwrap();
    assert_eq!(src.pos(), 3);
}

// -------------------- Varints --------------------

#[test]
fn varuint_boundaries() {
    for (v, len) in [(0u64, 1usize), (127, 1), (128, 2), (16_383, 2), (16_384, 3), (u64::MAX, 10)] {
        let mut buf = Vec::new();
        assert_eq!(write_varuint(&mut buf, v).unwrap(), len);
        assert_eq!(read_varuint(&mut Cursor::new(&buf)).unwrap(), v);
    }
}

#[test]
fn zigzag_orders_small_magnitudes_first() {
    assert_eq!(zigzag_encode(0), 0);
    assert_eq!(zigzag_encode(-1), 1);
    assert_eq!(zigzag_encode(1), 2);
    assert_eq!(zigzag_encode(-2), 3);
    assert_eq!(zigzag_decode(zigzag_encode(i64::MIN)), i64::MIN);
    assert_eq!(zigzag_decode(zigzag_encode(i64::MAX)), i64::MAX);
}

#[test]
fn truncated_varint_is_an_error() {
    let res = read_varuint(&mut Cursor::new(&[0x80u8, 0x80]));
    assert!(matches!(res, Err(CodingError::Io(_))));
}

#[test]
fn overlong_varint_is_rejected() {
    let res = read_varuint(&mut Cursor::new(&[0xffu8; 11]));
    assert!(matches!(res, Err(CodingError::VarintOverflow)));
}

// -------------------- Point coding --------------------

#[test]
fn snap_is_idempotent() {
    let params = GeometryCodingParams::new(27, (10.0, 20.0));
    let p = (37.617_635_1, 55.755_814_3);
    let s = params.snap(p);
    assert_eq!(params.snap(s), s);
    assert!((s.0 - p.0).abs() < 1e-5);
    assert!((s.1 - p.1).abs() < 1e-5);
}

#[test]
fn snapped_points_decode_exactly() {
    let params = GeometryCodingParams::new(23, (1.5, -2.5));
    let points: Vec<(f64, f64)> = [(0.1, 0.2), (-179.9, 89.0), (45.25, -12.125), (45.25, -12.125)]
        .iter()
        .map(|&p| params.snap(p))
        .collect();

    let mut buf = Vec::new();
    encode_points(&mut buf, &params, &points).unwrap();
    let decoded = decode_points(&mut Cursor::new(&buf), &params).unwrap();
    assert_eq!(decoded, points);
}

#[test]
fn single_point_is_delta_from_base() {
    let params = GeometryCodingParams::new(27, (5.0, 5.0));
    let mut buf = Vec::new();
    encode_point(&mut buf, &params, params.base_point()).unwrap();
    // Zero deltas on both axes.
    assert_eq!(buf, vec![0, 0]);
    let back = decode_point(&mut Cursor::new(&buf), &params).unwrap();
    assert_eq!(back, params.base_point());
}

#[test]
fn out_of_world_points_are_clamped() {
    let params = GeometryCodingParams::new(16, (0.0, 0.0));
    let q = params.quantize((500.0, -500.0));
    assert_eq!(q, PointU { x: 65_535, y: 0 });
}

#[test]
#[should_panic(expected = "coord_bits must be in 1..=32")]
fn zero_coord_bits_panics() {
    GeometryCodingParams::new(0, (0.0, 0.0));
}
