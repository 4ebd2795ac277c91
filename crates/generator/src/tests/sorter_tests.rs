use super::*;
use feature::Geometry;

#[test]
fn key_grows_along_each_axis() {
    let sorter = SpatialSorter::new();
    assert_eq!(sorter.key(p(-180.0, -180.0)), 0);
    assert!(sorter.key(p(10.0, 5.0)) < sorter.key(p(20.0, 5.0)));
    assert!(sorter.key(p(10.0, 5.0)) < sorter.key(p(10.0, 6.0)));
}

#[test]
fn neighbours_get_closer_keys_than_distant_points() {
    let sorter = SpatialSorter::new();
    let a = sorter.key(p(13.40, 52.50));
    let b = sorter.key(p(13.41, 52.51));
    let far = sorter.key(p(-70.0, -30.0));
    assert!(a.abs_diff(b) < a.abs_diff(far));
}

#[test]
fn equal_keys_keep_offset_order() {
    let mut sorter = SpatialSorter::new();
    let rec = FeatureRecord::new(Geometry::Point(p(1.0, 1.0)), vec![CITY]);
    for offset in [300, 20, 150] {
        assert!(sorter.add(&rec, offset));
    }
    sorter.sort();
    let offsets: Vec<u64> = sorter.entries().iter().map(|&(_, o)| o).collect();
    assert_eq!(offsets, vec![20, 150, 300]);
}

#[test]
fn center_averages_representative_points() {
    let mut sorter = SpatialSorter::new();
    sorter.add(&FeatureRecord::new(Geometry::Point(p(0.0, 0.0)), vec![CITY]), 0);
    // Closing point is not counted: the mid of this square is (3, 5).
    sorter.add(&FeatureRecord::new(Geometry::Area(vec![square(2.0, 4.0, 2.0)]), vec![WATER]), 40);
    let c = sorter.center().expect("two features");
    assert!((c.x - 1.5).abs() < 1e-12);
    assert!((c.y - 2.5).abs() < 1e-12);
    assert_eq!(sorter.len(), 2);
}

#[test]
fn features_without_location_are_skipped() {
    let mut sorter = SpatialSorter::new();
    assert!(!sorter.add(&FeatureRecord::new(Geometry::Area(vec![]), vec![WATER]), 0));
    assert!(!sorter.add(&FeatureRecord::new(Geometry::Line(vec![]), vec![ROAD]), 12));
    assert!(sorter.is_empty());
    assert_eq!(sorter.skipped(), 2);
    assert!(sorter.center().is_none());
}
