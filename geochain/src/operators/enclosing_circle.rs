//! Opérateur de cercle englobant
//!
//! Avec une référence géographique ou projetée, les sommets passent dans un Lambert
//! azimutal équivalent centré sur la géométrie ; le cercle y est calculé puis ramené.

use std::f64::consts::PI;

use geochain_core::tracker::{self, ProgressTracker, Tracker};
use geochain_core::{Cursor, Element, Geometry, GeometryCursor, Result, Shape, SpatialReference};

use crate::buffer::planar;
use crate::buffer::vertices_per_circle;
use crate::enclosing::minimum_enclosing_circle;
use crate::projection::{fold_into_360_range, project, ProjectionTransformation};
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct EnclosingCircle {
    seed: u64,
    max_vertices_in_full_circle: usize,
}

impl EnclosingCircle {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            seed: settings.enclosing_circle_seed,
            max_vertices_in_full_circle: settings.max_vertices_in_full_circle,
        }
    }

    /// Cercle minimal contenant tous les sommets de `geometry`.
    ///
    /// Un point, une géométrie d'au plus un sommet ou des sommets tous confondus sont
    /// rendus tels quels.
    pub fn execute(
        &self,
        geometry: &Geometry,
        sr: Option<&SpatialReference>,
        tracker: Option<&dyn ProgressTracker>,
    ) -> Result<Geometry> {
        tracker::check(tracker, 0, 1)?;
        if matches!(geometry.shape(), Shape::Point(_)) || geometry.point_count() <= 1 {
            return Ok(geometry.clone());
        }

        let frame = match sr {
            Some(sr) if sr.is_georeferenced() => Some(ProjectionTransformation::equal_area(geometry, sr)?),
            _ => None,
        };
        let vertices = Geometry::multi_point(geometry.vertices());
        let vertices = match &frame {
            Some(forward) => project(&vertices, forward, None)?,
            None => vertices,
        };
        let Some(circle) = minimum_enclosing_circle(&vertices.vertices(), self.seed) else {
            return Ok(geometry.clone());
        };
        if circle.radius == 0.0 {
            tracing::warn!("all vertices coincide, returning the input unchanged");
            return Ok(geometry.clone());
        }

        // polygone circonscrit : il contient tous les sommets
        let count = vertices_per_circle(circle.radius, None, self.max_vertices_in_full_circle);
        let radius = circle.radius / (PI / count as f64).cos();
        let polygon = Geometry::from(planar::circle(circle.center, radius, count));
        tracing::debug!(radius = circle.radius, vertices = count, "enclosing circle found");

        match (&frame, sr) {
            (Some(forward), Some(sr)) => {
                let back = project(&polygon, &forward.reverse(), None)?;
                Ok(if sr.is_geographic() {
                    fold_into_360_range(&back)
                } else {
                    back
                })
            }
            _ => Ok(polygon),
        }
    }

    pub fn execute_cursor(
        &self,
        cursor: GeometryCursor,
        sr: Option<SpatialReference>,
        tracker: Option<Tracker>,
    ) -> GeometryCursor {
        Box::new(EnclosingCircleCursor {
            operator: self.clone(),
            upstream: cursor,
            sr,
            tracker,
            index: 0,
        })
    }
}

struct EnclosingCircleCursor {
    operator: EnclosingCircle,
    upstream: GeometryCursor,
    sr: Option<SpatialReference>,
    tracker: Option<Tracker>,
    index: i64,
}

impl Cursor for EnclosingCircleCursor {
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
        let circle = self.operator.execute(&element.payload, self.sr.as_ref(), None)?;
        Ok(Some(element.with_geometry(circle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Contains, Coord, Intersects, Point};

    fn operator() -> EnclosingCircle {
        EnclosingCircle::new(&Settings::default())
    }

    #[test]
    fn test_degenerate_inputs_unchanged() {
        let op = operator();
        let p = Geometry::point(1.0, 1.0);
        assert_eq!(op.execute(&p, None, None).unwrap(), p);
        let mp = Geometry::multi_point([Coord { x: 2.0, y: 2.0 }, Coord { x: 2.0, y: 2.0 }]);
        assert_eq!(op.execute(&mp, None, None).unwrap(), mp);
    }

    #[test]
    fn test_planar_circle_contains_vertices() {
        let op = operator();
        let square = Geometry::rect(0.0, 0.0, 2.0, 2.0);
        let circle = op.execute(&square, None, None).unwrap();
        let area = circle.to_multi_polygon().unwrap();
        for v in square.vertices() {
            assert!(area.intersects(&Point::from(v)));
        }
        assert!(area.contains(&Point::new(1.0, 1.0)));
        let radius = 2f64.sqrt();
        assert!(circle.area() < std::f64::consts::PI * radius * radius * 1.01);
    }

    #[test]
    fn test_geographic_circle() {
        let op = operator();
        let sr = SpatialReference::wgs84();
        let line = Geometry::polyline(vec![vec![
            Coord { x: 2.0, y: 45.0 },
            Coord { x: 2.2, y: 45.1 },
            Coord { x: 2.1, y: 45.3 },
        ]]);
        let circle = op.execute(&line, Some(&sr), None).unwrap();
        let area = circle.to_multi_polygon().unwrap();
        for v in line.vertices() {
            assert!(area.intersects(&Point::from(v)));
        }
    }
}
