//! Opérateur de généralisation par surface

use geochain_core::tracker::{self, ProgressTracker, Tracker};
use geochain_core::{Cursor, Element, Geometry, GeometryCursor, GeometryError, Result};

use crate::generalize::{generalize, generalize_max_points, GeneralizeType};

/// Cible de réduction d'un curseur
#[derive(Debug, Clone, Copy)]
enum Target {
    Percent(f64),
    MaxPoints(usize),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GeneralizeByArea;

fn check_percent(percent_reduction: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&percent_reduction) {
        return Err(GeometryError::invalid_argument(format!(
            "percent reduction must be within [0, 100], got {percent_reduction}"
        )));
    }
    Ok(())
}

impl GeneralizeByArea {
    /// Retire `percent_reduction` % des sommets de chaque chemin, les plus petits
    /// triangles d'abord
    pub fn execute(
        &self,
        geometry: &Geometry,
        percent_reduction: f64,
        remove_degenerate_parts: bool,
        kind: GeneralizeType,
        tracker: Option<&dyn ProgressTracker>,
    ) -> Result<Geometry> {
        tracker::check(tracker, 0, 1)?;
        check_percent(percent_reduction)?;
        Ok(generalize(geometry, percent_reduction, remove_degenerate_parts, kind))
    }

    /// Réduit la géométrie à environ `max_point_count` sommets
    pub fn execute_max_points(
        &self,
        geometry: &Geometry,
        max_point_count: usize,
        remove_degenerate_parts: bool,
        kind: GeneralizeType,
        tracker: Option<&dyn ProgressTracker>,
    ) -> Result<Geometry> {
        tracker::check(tracker, 0, 1)?;
        Ok(generalize_max_points(geometry, max_point_count, remove_degenerate_parts, kind))
    }

    pub fn execute_cursor(
        &self,
        cursor: GeometryCursor,
        percent_reduction: f64,
        remove_degenerate_parts: bool,
        kind: GeneralizeType,
        tracker: Option<Tracker>,
    ) -> Result<GeometryCursor> {
        check_percent(percent_reduction)?;
        Ok(Box::new(GeneralizeCursor {
            upstream: cursor,
            target: Target::Percent(percent_reduction),
            remove_degenerate_parts,
            kind,
            tracker,
            index: 0,
        }))
    }

    pub fn execute_max_points_cursor(
        &self,
        cursor: GeometryCursor,
        max_point_count: usize,
        remove_degenerate_parts: bool,
        kind: GeneralizeType,
        tracker: Option<Tracker>,
    ) -> GeometryCursor {
        Box::new(GeneralizeCursor {
            upstream: cursor,
            target: Target::MaxPoints(max_point_count),
            remove_degenerate_parts,
            kind,
            tracker,
            index: 0,
        })
    }
}

struct GeneralizeCursor {
    upstream: GeometryCursor,
    target: Target,
    remove_degenerate_parts: bool,
    kind: GeneralizeType,
    tracker: Option<Tracker>,
    index: i64,
}

impl Cursor for GeneralizeCursor {
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
        let out = match self.target {
            Target::Percent(p) => generalize(&element.payload, p, self.remove_degenerate_parts, self.kind),
            Target::MaxPoints(n) => {
                generalize_max_points(&element.payload, n, self.remove_degenerate_parts, self.kind)
            }
        };
        tracing::trace!(
            id = element.id,
            before = element.payload.point_count(),
            after = out.point_count(),
            "element generalized"
        );
        Ok(Some(element.with_geometry(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use geochain_core::cursor::drain;
    use geochain_core::SimpleCursor;

    fn zigzag() -> Geometry {
        Geometry::polyline(vec![(0..11)
            .map(|i| Coord {
                x: i as f64,
                y: if i % 2 == 0 { 0.0 } else { 0.1 },
            })
            .collect()])
    }

    #[test]
    fn test_percent_bounds() {
        assert!(GeneralizeByArea
            .execute(&zigzag(), 120.0, false, GeneralizeType::Neither, None)
            .is_err());
        let same = GeneralizeByArea
            .execute(&zigzag(), 0.0, false, GeneralizeType::Neither, None)
            .unwrap();
        assert_eq!(same.point_count(), 11);
    }

    #[test]
    fn test_cursor_keeps_ids() {
        let input = SimpleCursor::from_geometries(vec![zigzag(), Geometry::point(1.0, 2.0)]);
        let cursor = GeneralizeByArea.execute_max_points_cursor(
            Box::new(input),
            4,
            false,
            GeneralizeType::Neither,
            None,
        );
        let mut cursor = cursor;
        let out = drain(&mut cursor).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, 0);
        assert!(out[0].payload.point_count() <= 5);
        assert_eq!(out[1].payload, Geometry::point(1.0, 2.0));
    }
}
