//! Repli des géométries géographiques dans [-180, 180]
//!
//! Les surfaces sont découpées par bandes de 360° ; chaque morceau est ramené dans
//! la bande centrale puis les morceaux sont réunis. Les lignes sont découpées de la
//! même façon, les points simplement ramenés.

use geo::{BooleanOps, Coord, MapCoords, MultiLineString, MultiPoint, MultiPolygon, Point, Rect};
use geochain_core::kernel::union_all;
use geochain_core::{Geometry, Shape};

use crate::geodesy::wrap_longitude;

/// Indices k des bandes [-180 + 360k, 180 + 360k] couvertes par [xmin, xmax]
fn band_range(xmin: f64, xmax: f64) -> std::ops::RangeInclusive<i64> {
    let first = ((xmin + 180.0) / 360.0).floor() as i64;
    let last = (((xmax + 180.0) / 360.0).ceil() as i64 - 1).max(first);
    first..=last
}

fn band(k: i64, envelope: Rect) -> Rect {
    let offset = 360.0 * k as f64;
    Rect::new(
        Coord {
            x: -180.0 + offset,
            y: envelope.min().y - 1.0,
        },
        Coord {
            x: 180.0 + offset,
            y: envelope.max().y + 1.0,
        },
    )
}

fn shift(dx: f64) -> impl Fn(Coord) -> Coord + Copy {
    move |c| Coord { x: c.x + dx, y: c.y }
}

fn fold_area(area: &MultiPolygon, envelope: Rect) -> MultiPolygon {
    let pieces = band_range(envelope.min().x, envelope.max().x)
        .map(|k| {
            let clip = MultiPolygon::new(vec![band(k, envelope).to_polygon()]);
            area.intersection(&clip).map_coords(shift(-360.0 * k as f64))
        })
        .collect();
    union_all(pieces)
}

fn fold_lines(lines: &MultiLineString, envelope: Rect) -> MultiLineString {
    let mut out = Vec::new();
    for k in band_range(envelope.min().x, envelope.max().x) {
        let clipped = band(k, envelope).to_polygon().clip(lines, false);
        out.extend(clipped.map_coords(shift(-360.0 * k as f64)).0);
    }
    MultiLineString::new(out)
}

fn fold_points(points: &MultiPoint) -> MultiPoint {
    points.map_coords(|c| Coord {
        x: wrap_longitude(c.x),
        y: c.y,
    })
}

/// Vrai si une coordonnée sort de [-180, 180]
pub fn needs_folding(geometry: &Geometry) -> bool {
    geometry
        .envelope()
        .is_some_and(|e| e.min().x < -180.0 || e.max().x > 180.0)
}

/// Ramène une géométrie géographique dans [-180, 180]. Une enveloppe qui déborde
/// devient un polygone ; une géométrie déjà dans l'intervalle est rendue telle quelle.
pub fn fold_into_360_range(geometry: &Geometry) -> Geometry {
    let Some(envelope) = geometry.envelope() else {
        return geometry.clone();
    };
    if !needs_folding(geometry) {
        return geometry.clone();
    }
    match geometry.shape() {
        Shape::Point(p) => Geometry::from(Point::new(wrap_longitude(p.x()), p.y())),
        Shape::MultiPoint(mp) => Geometry::from(fold_points(mp)),
        Shape::Polyline(mls) => Geometry::from(fold_lines(mls, envelope)),
        Shape::Polygon(mp) => Geometry::from(fold_area(mp, envelope)),
        Shape::Envelope(r) => {
            Geometry::from(fold_area(&MultiPolygon::new(vec![r.to_polygon()]), envelope))
        }
        Shape::Collection(members) => {
            Geometry::collection(members.iter().map(fold_into_360_range).collect())
        }
    }
}
