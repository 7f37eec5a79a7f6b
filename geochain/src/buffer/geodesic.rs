//! Zone tampon géodésique
//!
//! Les coordonnées sont des longitudes/latitudes en degrés. Les disques sont construits
//! par problèmes directs autour du centre, les segments deviennent des capsules dont les
//! côtés suivent la normale à la géodésique aux deux extrémités. Les longitudes sont
//! déroulées localement puis le résultat est replié dans [-180, 180].

use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use geochain_core::kernel::{empty_area, union_all};
use geochain_core::{Geometry, Shape};

use super::vertices_per_circle;
use crate::geodesy::{unwrap_near, Geodesy};
use crate::projection::fold_into_360_range;

/// Longueur maximale d'un segment avant construction des capsules
const MAX_SEGMENT_M: f64 = 100_000.0;

/// Paramètres d'une zone tampon géodésique
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicArcs {
    /// Écart maximal corde/arc en mètres
    pub max_deviation_m: Option<f64>,
    pub max_vertices_in_full_circle: usize,
}

impl GeodesicArcs {
    pub fn vertices(&self, radius_m: f64) -> usize {
        vertices_per_circle(radius_m, self.max_deviation_m, self.max_vertices_in_full_circle)
    }
}

fn signed_area(ring: &[Coord]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}

fn into_area(mut ring: Vec<Coord>) -> MultiPolygon {
    if signed_area(&ring) < 0.0 {
        ring.reverse();
    }
    MultiPolygon::new(vec![Polygon::new(LineString::new(ring), vec![])])
}

/// Disque géodésique de rayon `radius_m`. Un disque qui contient un pôle est fermé
/// par un détour le long du parallèle polaire.
pub fn circle(geodesy: &Geodesy, center: Coord, radius_m: f64, vertices: usize) -> MultiPolygon {
    let mut ring = Vec::with_capacity(vertices + 4);
    let mut previous = center.x;
    for i in 0..vertices {
        let azimuth = 180.0 - 360.0 * i as f64 / vertices as f64;
        let mut p = geodesy.direct(center, azimuth, radius_m);
        p.x = unwrap_near(p.x, previous);
        previous = p.x;
        ring.push(p);
    }
    let first = ring[0];
    let winding = previous - first.x;
    if winding.abs() > 180.0 {
        let shift = 360.0 * winding.signum();
        let pole = if center.y >= 0.0 { 90.0 } else { -90.0 };
        ring.push(Coord {
            x: first.x + shift,
            y: first.y,
        });
        ring.push(Coord {
            x: first.x + shift,
            y: pole,
        });
        ring.push(Coord { x: first.x, y: pole });
    }
    ring.push(first);
    into_area(ring)
}

/// Capsule géodésique autour du segment [a, b]
pub fn capsule(geodesy: &Geodesy, a: Coord, b: Coord, radius_m: f64, vertices: usize) -> MultiPolygon {
    let (length, azi1, azi2) = geodesy.inverse_degrees(a, b);
    if length == 0.0 {
        return circle(geodesy, a, radius_m, vertices);
    }
    let half = (vertices / 2).max(2);
    let mut ring = Vec::with_capacity(2 * half + 3);
    // droite -> avant -> gauche autour de b
    for i in 0..=half {
        let azimuth = azi2 + 90.0 - 180.0 * i as f64 / half as f64;
        let p = geodesy.direct(b, azimuth, radius_m);
        ring.push(Coord {
            x: unwrap_near(p.x, b.x),
            y: p.y,
        });
    }
    // gauche -> arrière -> droite autour de a
    for i in 0..=half {
        let azimuth = azi1 - 90.0 - 180.0 * i as f64 / half as f64;
        let p = geodesy.direct(a, azimuth, radius_m);
        ring.push(Coord {
            x: unwrap_near(p.x, a.x),
            y: p.y,
        });
    }
    ring.push(ring[0]);
    into_area(ring)
}

/// Longitudes rendues continues le long du chemin
fn unwrap_path(path: &[Coord]) -> Vec<Coord> {
    let mut out: Vec<Coord> = Vec::with_capacity(path.len());
    for c in path {
        let x = match out.last() {
            Some(prev) => unwrap_near(c.x, prev.x),
            None => c.x,
        };
        out.push(Coord { x, y: c.y });
    }
    out
}

fn path_parts(
    geodesy: &Geodesy,
    path: &[Coord],
    radius_m: f64,
    vertices: usize,
    out: &mut Vec<MultiPolygon>,
) {
    let path = geodesy.densify_path(&unwrap_path(path), MAX_SEGMENT_M);
    match path.as_slice() {
        [] => {}
        [single] => out.push(circle(geodesy, *single, radius_m, vertices)),
        _ => out.extend(
            path.windows(2)
                .map(|w| capsule(geodesy, w[0], w[1], radius_m, vertices)),
        ),
    }
}

fn unwrap_area(area: &MultiPolygon) -> MultiPolygon {
    MultiPolygon::new(
        area.0
            .iter()
            .map(|p| {
                Polygon::new(
                    LineString::new(unwrap_path(&p.exterior().0)),
                    p.interiors()
                        .iter()
                        .map(|r| LineString::new(unwrap_path(&r.0)))
                        .collect(),
                )
            })
            .collect(),
    )
}

fn ring_parts(geodesy: &Geodesy, area: &MultiPolygon, radius_m: f64, vertices: usize) -> Vec<MultiPolygon> {
    let mut parts = Vec::new();
    for polygon in &area.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            path_parts(geodesy, &ring.0, radius_m, vertices, &mut parts);
        }
    }
    parts
}

fn buffer_unfolded(geodesy: &Geodesy, geometry: &Geometry, distance_m: f64, arcs: GeodesicArcs) -> MultiPolygon {
    let radius = distance_m.abs();
    let vertices = arcs.vertices(radius);

    if distance_m < 0.0 {
        let Some(area) = geometry.to_multi_polygon() else {
            return empty_area();
        };
        let area = unwrap_area(&area);
        let boundary = union_all(ring_parts(geodesy, &area, radius, vertices));
        return area.difference(&boundary);
    }

    match geometry.shape() {
        Shape::Point(p) => circle(geodesy, p.0, radius, vertices),
        Shape::MultiPoint(mp) => union_all(
            mp.0.iter()
                .map(|p| circle(geodesy, p.0, radius, vertices))
                .collect(),
        ),
        Shape::Polyline(mls) => {
            let mut parts = Vec::new();
            for line in &mls.0 {
                path_parts(geodesy, &line.0, radius, vertices, &mut parts);
            }
            union_all(parts)
        }
        Shape::Polygon(_) | Shape::Envelope(_) => {
            let area = unwrap_area(&geometry.to_multi_polygon().unwrap_or_else(empty_area));
            let mut parts = ring_parts(geodesy, &area, radius, vertices);
            parts.push(area);
            union_all(parts)
        }
        Shape::Collection(members) => union_all(
            members
                .iter()
                .map(|m| buffer_unfolded(geodesy, m, distance_m, arcs))
                .collect(),
        ),
    }
}

/// Zone tampon géodésique d'une géométrie géographique, repliée dans [-180, 180].
///
/// Mêmes règles que la zone tampon planaire pour les distances nulles ou négatives.
pub fn buffer(geodesy: &Geodesy, geometry: &Geometry, distance_m: f64, arcs: GeodesicArcs) -> MultiPolygon {
    if geometry.is_empty() {
        return empty_area();
    }
    if distance_m == 0.0 {
        return geometry.to_multi_polygon().unwrap_or_else(empty_area);
    }
    let unfolded = buffer_unfolded(geodesy, geometry, distance_m, arcs);
    if unfolded.0.is_empty() {
        return unfolded;
    }
    match fold_into_360_range(&Geometry::from(unfolded)).into_shape() {
        Shape::Polygon(mp) => mp,
        _ => empty_area(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{BoundingRect, Contains, Point};
    use geochain_core::Ellipsoid;

    const ARCS: GeodesicArcs = GeodesicArcs {
        max_deviation_m: None,
        max_vertices_in_full_circle: 96,
    };

    fn geodesy() -> Geodesy {
        Geodesy::new(Ellipsoid::WGS84)
    }

    #[test]
    fn test_circle_radius_is_geodesic() {
        let g = geodesy();
        let center = Coord { x: 2.35, y: 48.85 };
        let disc = circle(&g, center, 10_000.0, 96);
        for c in disc.0[0].exterior().coords() {
            assert!((g.distance(center, *c) - 10_000.0).abs() < 1e-6);
        }
        assert!(disc.contains(&Point::from(center)));
    }

    #[test]
    fn test_circle_around_pole() {
        let g = geodesy();
        let disc = circle(&g, Coord { x: 0.0, y: 89.5 }, 200_000.0, 96);
        let bbox = disc.bounding_rect().unwrap();
        assert!((bbox.max().y - 90.0).abs() < 1e-12);
        assert!(bbox.width() > 359.0);
    }

    #[test]
    fn test_buffer_across_antimeridian_is_folded() {
        let g = geodesy();
        let line = Geometry::polyline(vec![vec![
            Coord { x: 179.5, y: 0.0 },
            Coord { x: -179.5, y: 0.0 },
        ]]);
        let out = buffer(&g, &line, 20_000.0, ARCS);
        let bbox = out.bounding_rect().unwrap();
        assert!(bbox.min().x >= -180.0 && bbox.max().x <= 180.0);
        assert_eq!(out.0.len(), 2);
        assert!(out.contains(&Point::new(179.9, 0.0)));
        assert!(out.contains(&Point::new(-179.9, 0.0)));
    }

    #[test]
    fn test_polygon_buffer_contains_polygon() {
        let g = geodesy();
        let square = Geometry::rect(0.0, 0.0, 1.0, 1.0).envelope_as_polygon();
        let out = buffer(&g, &square, 5_000.0, ARCS);
        assert!(out.contains(&square.to_multi_polygon().unwrap()));
        assert!(out.contains(&Point::new(-0.04, 0.5)));
        assert!(!out.contains(&Point::new(-0.06, 0.5)));
    }

    #[test]
    fn test_zero_and_negative() {
        let g = geodesy();
        let p = Geometry::point(0.0, 0.0);
        assert!(buffer(&g, &p, 0.0, ARCS).0.is_empty());
        assert!(buffer(&g, &p, -10.0, ARCS).0.is_empty());
        let square = Geometry::rect(0.0, 0.0, 1.0, 1.0).envelope_as_polygon();
        let eroded = buffer(&g, &square, -5_000.0, ARCS);
        assert!(eroded.contains(&Point::new(0.5, 0.5)));
        assert!(!eroded.contains(&Point::new(0.02, 0.5)));
    }
}
