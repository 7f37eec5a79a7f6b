//! Tests d'intégration du modèle : curseurs, références spatiales, simplicité

use geochain_core::geo::coord;
use geochain_core::kernel::{self, Relation};
use geochain_core::{
    CoordinateSystemType, Cursor, Geometry, GeometryType, SimpleCursor, SimpleState,
    SpatialReference,
};

fn square(x0: f64, y0: f64, size: f64) -> Geometry {
    Geometry::polygon(
        vec![
            coord! { x: x0, y: y0 },
            coord! { x: x0 + size, y: y0 },
            coord! { x: x0 + size, y: y0 + size },
            coord! { x: x0, y: y0 + size },
            coord! { x: x0, y: y0 },
        ],
        vec![],
    )
}

#[test]
fn test_cursor_over_mixed_geometries() {
    let mut cursor = SimpleCursor::from_geometries(vec![
        Geometry::point(1.0, 1.0),
        square(0.0, 0.0, 2.0),
        Geometry::rect(0.0, 0.0, 1.0, 1.0),
    ]);

    let mut kinds = Vec::new();
    while let Some(element) = cursor.next().unwrap() {
        kinds.push((element.id, element.payload.geometry_type()));
    }
    assert_eq!(
        kinds,
        vec![
            (0, GeometryType::Point),
            (1, GeometryType::Polygon),
            (2, GeometryType::Envelope)
        ]
    );
    assert!(cursor.next().unwrap().is_none());
}

#[test]
fn test_simple_state_is_cached_and_reset() {
    let mut polygon = square(0.0, 0.0, 10.0);
    assert_eq!(polygon.simple_state(), SimpleState::Unknown);
    let state = polygon.check_simple(0.001);
    assert_eq!(state, SimpleState::StrongSimple);
    assert_eq!(polygon.simple_state(), SimpleState::StrongSimple);

    let moved = polygon.map_coords(|c| coord! { x: c.x + 1.0, y: c.y });
    assert_eq!(moved.simple_state(), SimpleState::Unknown);
}

#[test]
fn test_reference_equality_rules() {
    let by_code = SpatialReference::from_code(3857).unwrap();
    let by_parse = SpatialReference::parse("EPSG:3857").unwrap();
    assert_eq!(by_code, by_parse);

    let a = SpatialReference::from_proj4("+proj=laea +lat_0=10 +lon_0=20 +ellps=GRS80").unwrap();
    let b = SpatialReference::from_proj4("+lon_0=20  +proj=laea +ellps=GRS80 +lat_0=10").unwrap();
    let c = SpatialReference::from_proj4("+proj=laea +lat_0=11 +lon_0=20 +ellps=GRS80").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, by_code);
}

#[test]
fn test_local_reference_from_wkt() {
    let sr = SpatialReference::from_wkt(r#"LOCAL_CS["plant",UNIT["foot",0.3048]]"#).unwrap();
    assert_eq!(sr.coordinate_system_type(), CoordinateSystemType::Local);
    assert!(!sr.is_georeferenced());
    assert!((sr.tolerance() - 0.001 / 0.3048).abs() < 1e-12);
}

#[test]
fn test_relations_on_nested_squares() {
    let outer = square(0.0, 0.0, 10.0);
    let inner = square(2.0, 2.0, 2.0);
    let far = square(20.0, 20.0, 1.0);
    assert!(kernel::relate(Relation::Contains, &outer, &inner, 0.001));
    assert!(kernel::relate(Relation::Within, &inner, &outer, 0.001));
    assert!(kernel::relate(Relation::Disjoint, &outer, &far, 0.001));
    assert!(!kernel::relate(Relation::Intersects, &inner, &far, 0.001));
}
