//! Tests d'intégration des zones tampon planaires et géodésiques

use geo::{Contains, Coord, Point};
use geochain::{
    registry, Buffer, BufferParams, Cursor, GeodesicBuffer, Geodesy, Geometry, Relation,
    SimpleCursor, SimpleRelation, SpatialReference, Union,
};
use geochain_core::cursor::drain;

fn parcels() -> Vec<Geometry> {
    vec![
        Geometry::rect(0.0, 0.0, 10.0, 10.0),
        Geometry::rect(12.0, 0.0, 20.0, 6.0),
        Geometry::polyline(vec![vec![Coord { x: 0.0, y: 30.0 }, Coord { x: 25.0, y: 30.0 }]]),
        Geometry::point(40.0, 40.0),
    ]
}

#[test]
fn test_buffer_is_monotonic() {
    let sr = SpatialReference::from_code(2154).unwrap();
    let op = Buffer::local();
    for geometry in parcels() {
        let small = op.execute(&geometry, Some(&sr), 1.0, None).unwrap();
        let large = op.execute(&geometry, Some(&sr), 3.0, None).unwrap();
        assert!(
            SimpleRelation::local().execute_pair(&large, &small, Some(&sr), Relation::Contains),
            "{:?}",
            geometry.geometry_type()
        );
        assert!(large.area() > small.area());
    }
}

#[test]
fn test_union_buffer_matches_union_of_buffers() {
    let sr = SpatialReference::from_code(2154).unwrap();
    let params = BufferParams::new(vec![1.5], registry().settings()).unwrap();

    let mut merged = Buffer::local().execute_cursor(
        Box::new(SimpleCursor::from_geometries(parcels())),
        Some(sr.clone()),
        params.clone().with_union(true),
        None,
    );
    let merged = drain(&mut merged).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].id, 0);

    let separate = Buffer::local().execute_cursor(
        Box::new(SimpleCursor::from_geometries(parcels())),
        Some(sr.clone()),
        params,
        None,
    );
    let mut unioned = Union::local().execute_cursor(separate, None);
    let expected = unioned.next().unwrap().unwrap().payload;
    assert!(unioned.next().unwrap().is_none());

    let (a, b) = (merged[0].payload.area(), expected.area());
    assert!((a - b).abs() < 1e-6 * b, "{a} vs {b}");
    assert!(SimpleRelation::local().execute_pair(&merged[0].payload, &expected, Some(&sr), Relation::Equals));
}

#[test]
fn test_per_geometry_distances() {
    let input = SimpleCursor::from_geometries(vec![Geometry::point(0.0, 0.0), Geometry::point(100.0, 0.0)]);
    let params = BufferParams::new(vec![1.0, 5.0], registry().settings()).unwrap();
    let mut cursor = Buffer::local().execute_cursor(Box::new(input), None, params, None);
    let out = drain(&mut cursor).unwrap();
    assert!(out[0].payload.area() < std::f64::consts::PI * 1.0 + 1e-9);
    assert!(out[1].payload.area() > std::f64::consts::PI * 25.0 * 0.98);
}

#[test]
fn test_geodesic_circle_radius() {
    let wgs84 = SpatialReference::wgs84();
    let center = Coord { x: 2.35, y: 48.85 };
    let circle = GeodesicBuffer::local()
        .execute(&Geometry::point(center.x, center.y), &wgs84, 5_000.0, None, None)
        .unwrap();
    let geodesy = Geodesy::for_reference(&wgs84);
    for v in circle.vertices() {
        let d = geodesy.distance(center, v);
        assert!((d - 5_000.0).abs() < 1e-6, "vertex at {d} m");
    }
    let area = circle.to_multi_polygon().unwrap();
    assert!(area.contains(&Point::from(center)));
}

#[test]
fn test_geodesic_buffer_cursor_with_union() {
    let wgs84 = SpatialReference::wgs84();
    let input = SimpleCursor::from_geometries(vec![Geometry::point(0.0, 0.0), Geometry::point(0.01, 0.0)]);
    let params = BufferParams::new(vec![1_000.0], registry().settings())
        .unwrap()
        .with_union(true);
    let mut cursor = GeodesicBuffer::local().execute_cursor(Box::new(input), wgs84, params, None);
    let out = drain(&mut cursor).unwrap();
    assert_eq!(out.len(), 1);
    // les deux disques de 1 km, distants d'environ 1.1 km, se recouvrent
    assert_eq!(out[0].payload.to_multi_polygon().unwrap().0.len(), 1);
}
