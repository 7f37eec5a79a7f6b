//! Opérateur de zone tampon planaire

use geochain_core::tracker::{self, ProgressTracker, Tracker};
use geochain_core::{Cursor, Element, Geometry, GeometryCursor, GeometryError, Result, SpatialReference};

use super::parameter_at;
use super::union::UnionCursor;
use crate::buffer::planar::{self, ArcDiscretization};
use crate::settings::Settings;

/// Paramètres de la forme curseur des zones tampon (planaire et géodésique)
#[derive(Debug, Clone, PartialEq)]
pub struct BufferParams {
    /// Une distance pour tout le flux, ou une par géométrie
    pub distances: Vec<f64>,
    /// Écart corde/arc maximal (unité de la référence, mètres en géodésique)
    pub max_deviation: Option<f64>,
    pub max_vertices_in_full_circle: usize,
    /// Réunit toutes les zones en une seule géométrie
    pub union: bool,
}

impl BufferParams {
    /// Paramètres avec la discrétisation des réglages ; une liste vide est refusée
    pub fn new(distances: Vec<f64>, settings: &Settings) -> Result<Self> {
        if distances.is_empty() {
            return Err(GeometryError::invalid_argument(
                "at least one buffer distance is required",
            ));
        }
        Ok(Self {
            distances,
            max_deviation: settings.max_deviation,
            max_vertices_in_full_circle: settings.max_vertices_in_full_circle,
            union: false,
        })
    }

    pub fn with_union(mut self, union: bool) -> Self {
        self.union = union;
        self
    }

    pub fn with_max_deviation(mut self, max_deviation: Option<f64>) -> Self {
        self.max_deviation = max_deviation;
        self
    }

    pub(crate) fn distance(&self, index: usize) -> Result<f64> {
        parameter_at(&self.distances, index, "buffer distance")
    }
}

#[derive(Debug, Clone)]
pub struct Buffer {
    arcs: ArcDiscretization,
}

impl Buffer {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            arcs: ArcDiscretization {
                max_deviation: settings.max_deviation,
                max_vertices_in_full_circle: settings.max_vertices_in_full_circle,
            },
        }
    }

    /// Zone tampon planaire d'une géométrie.
    ///
    /// Une distance inférieure à la tolérance de la référence est traitée comme nulle.
    pub fn execute(
        &self,
        geometry: &Geometry,
        sr: Option<&SpatialReference>,
        distance: f64,
        tracker: Option<&dyn ProgressTracker>,
    ) -> Result<Geometry> {
        tracker::check(tracker, 0, 1)?;
        Ok(buffer_one(geometry, sr, distance, self.arcs))
    }

    /// Forme curseur ; avec `params.union` un seul élément (id 0) est produit
    pub fn execute_cursor(
        &self,
        cursor: GeometryCursor,
        sr: Option<SpatialReference>,
        params: BufferParams,
        tracker: Option<Tracker>,
    ) -> GeometryCursor {
        let union = params.union;
        let buffered: GeometryCursor = Box::new(BufferCursor {
            upstream: cursor,
            sr,
            arcs: ArcDiscretization {
                max_deviation: params.max_deviation,
                max_vertices_in_full_circle: params.max_vertices_in_full_circle,
            },
            params,
            tracker: tracker.clone(),
            index: 0,
        });
        if union {
            Box::new(UnionCursor::new(buffered, tracker))
        } else {
            buffered
        }
    }
}

fn buffer_one(
    geometry: &Geometry,
    sr: Option<&SpatialReference>,
    distance: f64,
    arcs: ArcDiscretization,
) -> Geometry {
    let tolerance = sr.map_or(0.0, SpatialReference::tolerance);
    let distance = if distance.abs() <= tolerance { 0.0 } else { distance };
    Geometry::from(planar::buffer(geometry, distance, arcs))
}

struct BufferCursor {
    upstream: GeometryCursor,
    sr: Option<SpatialReference>,
    params: BufferParams,
    arcs: ArcDiscretization,
    tracker: Option<Tracker>,
    index: usize,
}

impl Cursor for BufferCursor {
    type Item = Geometry;

    fn has_next(&self) -> bool {
        self.upstream.has_next()
    }

    fn next(&mut self) -> Result<Option<Element<Geometry>>> {
        tracker::check(self.tracker.as_deref(), self.index as i64, -1)?;
        let Some(element) = self.upstream.next()? else {
            return Ok(None);
        };
        let distance = self.params.distance(self.index)?;
        self.index += 1;
        let out = buffer_one(&element.payload, self.sr.as_ref(), distance, self.arcs);
        tracing::trace!(id = element.id, distance, "element buffered");
        Ok(Some(element.with_geometry(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geochain_core::cursor::drain;
    use geochain_core::SimpleCursor;

    fn points() -> GeometryCursor {
        Box::new(SimpleCursor::from_geometries(vec![
            Geometry::point(0.0, 0.0),
            Geometry::point(1.0, 0.0),
            Geometry::point(10.0, 0.0),
        ]))
    }

    #[test]
    fn test_empty_distance_list_rejected() {
        assert!(BufferParams::new(vec![], &Settings::default()).is_err());
    }

    #[test]
    fn test_parallel_distances_overrun() {
        let op = Buffer::new(&Settings::default());
        let params = BufferParams::new(vec![1.0, 2.0], &Settings::default()).unwrap();
        let mut cursor = op.execute_cursor(points(), None, params, None);
        assert!(cursor.next().unwrap().is_some());
        assert!(cursor.next().unwrap().is_some());
        assert!(matches!(
            cursor.next().unwrap_err(),
            GeometryError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_union_yields_single_element() {
        let op = Buffer::new(&Settings::default());
        let params = BufferParams::new(vec![1.0], &Settings::default())
            .unwrap()
            .with_union(true);
        let mut cursor = op.execute_cursor(points(), None, params, None);
        let out = drain(&mut cursor).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 0);
        let Some(area) = out[0].payload.to_multi_polygon() else {
            panic!("expected polygon");
        };
        // les deux premiers disques se recouvrent
        assert_eq!(area.0.len(), 2);
    }

    #[test]
    fn test_distance_below_tolerance_is_zero() {
        let op = Buffer::new(&Settings::default());
        let sr = SpatialReference::from_code(3857).unwrap();
        let out = op
            .execute(&Geometry::point(0.0, 0.0), Some(&sr), 1e-4, None)
            .unwrap();
        assert!(out.is_empty());
        let out = op
            .execute(&Geometry::point(0.0, 0.0), Some(&sr), 1.0, None)
            .unwrap();
        assert!(!out.is_empty());
    }
}
