//! Opérateur d'enveloppe convexe

use geochain_core::kernel::convex_hull;
use geochain_core::tracker::{self, Tracker};
use geochain_core::{Cursor, Element, Geometry, GeometryCursor, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct ConvexHull;

impl ConvexHull {
    /// Polygone convexe minimal ; segment ou point pour les entrées dégénérées
    pub fn execute(&self, geometry: &Geometry) -> Geometry {
        convex_hull(geometry)
    }

    pub fn execute_cursor(&self, cursor: GeometryCursor, tracker: Option<Tracker>) -> GeometryCursor {
        Box::new(ConvexHullCursor {
            upstream: cursor,
            tracker,
            index: 0,
        })
    }
}

struct ConvexHullCursor {
    upstream: GeometryCursor,
    tracker: Option<Tracker>,
    index: i64,
}

impl Cursor for ConvexHullCursor {
    type Item = Geometry;

    fn has_next(&self) -> bool {
        self.upstream.has_next()
    }

    fn next(&mut self) -> Result<Option<Element<Geometry>>> {
        tracker::check(self.tracker.as_deref(), self.index, -1)?;
        let Some(element) = self.upstream.next()? else {
            return Ok(None);
        };
        self.index += 1;
        let hull = convex_hull(&element.payload);
        Ok(Some(element.with_geometry(hull)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use geochain_core::cursor::drain_payloads;
    use geochain_core::{GeometryType, SimpleCursor};

    #[test]
    fn test_hull_of_points_and_line() {
        let points = Geometry::multi_point([
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 4.0, y: 0.0 },
            Coord { x: 2.0, y: 1.0 },
            Coord { x: 4.0, y: 4.0 },
            Coord { x: 0.0, y: 4.0 },
        ]);
        let line = Geometry::polyline(vec![vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }]]);
        let input = SimpleCursor::from_geometries(vec![points, line]);
        let mut cursor = ConvexHull.execute_cursor(Box::new(input), None);
        let out = drain_payloads(&mut cursor).unwrap();
        assert_eq!(out[0].geometry_type(), GeometryType::Polygon);
        assert!((out[0].area() - 16.0).abs() < 1e-12);
        assert_eq!(out[1].geometry_type(), GeometryType::Polyline);
    }
}
