//! Opérateur de points aléatoires

use geochain_core::tracker::{self, ProgressTracker, Tracker};
use geochain_core::{Cursor, Element, Geometry, GeometryCursor, GeometryError, Result, SpatialReference};

use super::parameter_at;
use crate::sampling::random_points;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct RandomPoints {
    settings: Settings,
}

impl RandomPoints {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Multipoint de `points_per_km2` points par km² dans `geometry`
    pub fn execute(
        &self,
        geometry: &Geometry,
        points_per_km2: f64,
        seed: u64,
        sr: Option<&SpatialReference>,
        tracker: Option<&dyn ProgressTracker>,
    ) -> Result<Geometry> {
        random_points(geometry, points_per_km2, seed, sr, &self.settings, tracker).map(Geometry::from)
    }

    /// Forme curseur : le générateur est réinitialisé avec `seed` pour chaque géométrie
    pub fn execute_cursor(
        &self,
        cursor: GeometryCursor,
        points_per_km2: Vec<f64>,
        seed: u64,
        sr: Option<SpatialReference>,
        tracker: Option<Tracker>,
    ) -> Result<GeometryCursor> {
        if points_per_km2.is_empty() {
            return Err(GeometryError::invalid_argument(
                "at least one point density is required",
            ));
        }
        Ok(Box::new(RandomPointsCursor {
            upstream: cursor,
            densities: points_per_km2,
            seed,
            sr,
            settings: self.settings.clone(),
            tracker,
            index: 0,
        }))
    }
}

struct RandomPointsCursor {
    upstream: GeometryCursor,
    densities: Vec<f64>,
    seed: u64,
    sr: Option<SpatialReference>,
    settings: Settings,
    tracker: Option<Tracker>,
    index: usize,
}

impl Cursor for RandomPointsCursor {
    type Item = Geometry;

    fn has_next(&self) -> bool {
        self.upstream.has_next()
    }

    fn next(&mut self) -> Result<Option<Element<Geometry>>> {
        tracker::check(self.tracker.as_deref(), self.index as i64, -1)?;
        let Some(element) = self.upstream.next()? else {
            return Ok(None);
        };
        let density = parameter_at(&self.densities, self.index, "point density")?;
        self.index += 1;
        let points = random_points(
            &element.payload,
            density,
            self.seed,
            self.sr.as_ref(),
            &self.settings,
            self.tracker.as_deref(),
        )?;
        Ok(Some(element.with_geometry(Geometry::from(points))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geochain_core::cursor::drain_payloads;
    use geochain_core::SimpleCursor;

    #[test]
    fn test_cursor_reseeds_per_geometry() {
        let op = RandomPoints::new(&Settings::default());
        let square = Geometry::rect(0.0, 0.0, 0.2, 0.2);
        let input = SimpleCursor::from_geometries(vec![square.clone(), square]);
        let mut cursor = op
            .execute_cursor(Box::new(input), vec![5.0], 1977, Some(SpatialReference::wgs84()), None)
            .unwrap();
        let out = drain_payloads(&mut cursor).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], out[1]);
        assert!(out[0].point_count() > 0);
    }

    #[test]
    fn test_empty_density_list() {
        let op = RandomPoints::new(&Settings::default());
        let input = SimpleCursor::<Geometry>::new(vec![]);
        assert!(op
            .execute_cursor(Box::new(input), vec![], 1, None, None)
            .is_err());
    }
}
