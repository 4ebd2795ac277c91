use super::polygon::*;
use super::scales::*;
use super::*;

fn pts(coords: &[(f64, f64)]) -> Vec<PointD> {
    coords.iter().map(|&c| c.into()).collect()
}

fn square(side: f64) -> Vec<PointD> {
    pts(&[(0.0, 0.0), (side, 0.0), (side, side), (0.0, side), (0.0, 0.0)])
}

// -------------------- Distance --------------------

#[test]
fn squared_distance_projects_onto_segment() {
    let d = SquaredSegmentDistance;
    let a = PointD::new(0.0, 0.0);
    let b = PointD::new(10.0, 0.0);
    assert_eq!(d.squared_distance(a, b, PointD::new(5.0, 3.0)), 9.0);
    // Beyond the end measures to the endpoint.
    assert_eq!(d.squared_distance(a, b, PointD::new(13.0, 4.0)), 25.0);
    // Degenerate segment measures to the point.
    assert_eq!(d.squared_distance(a, a, PointD::new(3.0, 4.0)), 25.0);
}

#[test]
fn rect_bounded_distance_pins_side_points() {
    let rect = RectD::new(0.0, 0.0, 10.0, 10.0);
    let d = RectBoundedDistance::new(rect);
    let a = PointD::new(0.0, 5.0);
    let b = PointD::new(10.0, 5.0);
    assert_eq!(d.squared_distance(a, b, PointD::new(5.0, 10.0)), f64::INFINITY);
    assert_eq!(d.squared_distance(a, b, PointD::new(5.0, 6.0)), 1.0);
}

// -------------------- Simplify --------------------

#[test]
fn collinear_line_reduces_to_endpoints() {
    let line: Vec<PointD> = (0..100).map(|i| PointD::new(i as f64 * 0.01, i as f64 * 0.02)).collect();
    let out = simplify_points(&SquaredSegmentDistance, epsilon_for_simplify(3).powi(2), &line);
    assert_eq!(out, vec![line[0], line[99]]);
}

#[test]
fn two_points_are_returned_unchanged_for_any_tolerance() {
    let line = pts(&[(1.0, 1.0), (2.0, 2.0)]);
    for tol in [0.0, 1.0, f64::MAX] {
        assert_eq!(simplify_points(&SquaredSegmentDistance, tol, &line), line);
    }
}

#[test]
fn simplify_never_adds_points() {
    let zigzag: Vec<PointD> = (0..50)
        .map(|i| PointD::new(i as f64, if i % 2 == 0 { 0.0 } else { 1.0 }))
        .collect();
    for tol in [0.0, 0.1, 0.5, 10.0] {
        let out = simplify_points(&SquaredSegmentDistance, tol, &zigzag);
        assert!(out.len() <= zigzag.len());
        assert_eq!(out.first(), zigzag.first());
        assert_eq!(out.last(), zigzag.last());
    }
    // Zero tolerance keeps every point that deviates at all.
    assert_eq!(simplify_points(&SquaredSegmentDistance, 0.0, &zigzag), zigzag);
}

#[test]
fn significant_corner_is_kept() {
    let line = pts(&[(0.0, 0.0), (5.0, 4.9), (10.0, 10.0), (15.0, 0.0)]);
    let out = simplify_points(&SquaredSegmentDistance, 1.0, &line);
    assert_eq!(out, pts(&[(0.0, 0.0), (10.0, 10.0), (15.0, 0.0)]));
}

#[test]
fn closed_ring_stays_closed() {
    let ring = pts(&[
        (0.0, 0.0),
        (5.0, 0.001),
        (10.0, 0.0),
        (10.0, 10.0),
        (0.0, 10.0),
        (0.0, 0.0),
    ]);
    for tol in [0.0, 0.01, 1.0, 1000.0] {
        let out = simplify_points(&SquaredSegmentDistance, tol, &ring);
        assert!(is_closed(&out), "tolerance {} opened the ring: {:?}", tol, out);
    }
}

#[test]
fn simplify_is_deterministic() {
    let line: Vec<PointD> = (0..200)
        .map(|i| PointD::new(i as f64, ((i * 7919) % 13) as f64 * 0.1))
        .collect();
    let a = simplify_points(&SquaredSegmentDistance, 0.05, &line);
    let b = simplify_points(&SquaredSegmentDistance, 0.05, &line);
    assert_eq!(a, b);
}

#[test]
fn coastline_metric_keeps_cell_border_points() {
    let rect = RectD::new(0.0, 0.0, 10.0, 10.0);
    // Nearly straight run along the top side of the cell.
    let line = pts(&[(0.0, 5.0), (3.0, 10.0), (6.0, 10.0), (10.0, 5.0)]);
    let plain = simplify_points(&SquaredSegmentDistance, 100.0, &line);
    let coast = simplify_points(&RectBoundedDistance::new(rect), 100.0, &line);
    assert_eq!(plain.len(), 2);
    assert_eq!(coast, line);
}

// -------------------- Scales --------------------

#[test]
fn tolerance_grows_toward_coarse_levels() {
    for level in 0..UPPER_SCALE {
        assert!(epsilon_for_simplify(level) > epsilon_for_simplify(level + 1));
    }
}

#[test]
fn good_for_level_respects_upper_scale() {
    let tiny = RectD::new(0.0, 0.0, 1e-9, 1e-9);
    assert!(!is_good_for_level(10, &tiny));
    assert!(is_good_for_level(UPPER_SCALE, &tiny));
    let big = RectD::new(0.0, 0.0, 1.0, 1.0);
    assert!(is_good_for_level(0, &RectD::new(0.0, 0.0, 2.0, 2.0)));
    assert!(is_good_for_level(10, &big));
}

// -------------------- Rect --------------------

#[test]
fn rect_from_points_and_empty() {
    let r = RectD::from_points(&square(2.0));
    assert_eq!(r, RectD::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(r.center(), PointD::new(1.0, 1.0));
    assert!(RectD::empty().is_empty());
    assert_eq!(RectD::empty().size_x(), 0.0);

    let mut total = RectD::empty();
    total.add_rect(&RectD::empty());
    assert!(total.is_empty());
    total.add_rect(&r);
    assert_eq!(total, r);
}

// -------------------- Polygon predicates --------------------

#[test]
fn point_in_ring_even_odd() {
    let sq = square(4.0);
    let ring = &sq[..4];
    assert!(point_in_ring(PointD::new(2.0, 2.0), ring));
    assert!(!point_in_ring(PointD::new(5.0, 2.0), ring));
}

#[test]
fn concave_diagonal_is_not_visible() {
    // Arrow-head: vertex 2 is a reflex notch.
    let ring = pts(&[(0.0, 0.0), (4.0, 0.0), (2.0, 1.0), (4.0, 4.0), (0.0, 4.0)]);
    assert!(!is_diagonal_visible(&ring, 1, 3));
    assert!(is_diagonal_visible(&ring, 0, 2));
}

// -------------------- Strip --------------------

#[test]
fn square_ring_makes_single_strip() {
    let sq = square(1.0);
    let ring = &sq[..4];
    let order = find_single_strip(ring).expect("square must strip");
    assert_eq!(order, vec![0, 1, 3, 2]);
}

#[test]
fn strip_needs_three_points() {
    assert!(find_single_strip(&pts(&[(0.0, 0.0), (1.0, 0.0)])).is_none());
}

#[test]
fn strip_covers_every_vertex_once() {
    let hexagon: Vec<PointD> = (0..6)
        .map(|i| {
            let a = i as f64 * std::f64::consts::PI / 3.0;
            PointD::new(a.cos(), a.sin())
        })
        .collect();
    let mut order = find_single_strip(&hexagon).unwrap();
    order.sort_unstable();
    assert_eq!(order, (0..6).collect::<Vec<_>>());
}

fn circle(n: usize) -> Vec<PointD> {
    (0..n)
        .map(|i| {
            let a = i as f64 * std::f64::consts::TAU / n as f64;
            PointD::new(a.cos(), a.sin())
        })
        .collect()
}

#[test]
fn oversized_ring_is_not_searched() {
    assert!(find_single_strip(&circle(MAX_STRIP_POINTS + 1)).is_none());
    assert!(find_single_strip(&circle(64)).is_some());
}

// -------------------- Tesselation --------------------

#[test]
fn square_with_hole_triangulates_around_hole() {
    let outer = square(10.0);
    let hole = pts(&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)]);

    let solid = triangulate(&outer, &[]);
    assert_eq!(solid.len(), 2);

    let holed = triangulate(&outer, &[hole]);
    assert!(holed.len() > 2);
    let area: f64 = holed
        .iter()
        .map(|t| signed_area2(&t[..]).abs() / 2.0)
        .sum();
    assert!((area - 96.0).abs() < 1e-9);
}

#[test]
fn degenerate_outer_ring_yields_nothing() {
    assert!(triangulate(&pts(&[(0.0, 0.0), (1.0, 1.0)]), &[]).is_empty());
}
