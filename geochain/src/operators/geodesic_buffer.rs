//! Opérateur de zone tampon géodésique
//!
//! Les références projetées passent par WGS84 : la géométrie y est projetée, la zone
//! construite sur l'ellipsoïde puis ramenée dans la référence d'origine.

use geochain_core::tracker::{self, ProgressTracker, Tracker};
use geochain_core::{Cursor, Element, Geometry, GeometryCursor, GeometryError, Result, SpatialReference};

use super::union::UnionCursor;
use super::BufferParams;
use crate::buffer::geodesic::{self, GeodesicArcs};
use crate::geodesy::Geodesy;
use crate::projection::{project, ProjectionTransformation};
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct GeodesicBuffer {
    max_vertices_in_full_circle: usize,
}

impl GeodesicBuffer {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            max_vertices_in_full_circle: settings.max_vertices_in_full_circle,
        }
    }

    /// Zone tampon de `distance_m` mètres sur l'ellipsoïde de `sr`
    pub fn execute(
        &self,
        geometry: &Geometry,
        sr: &SpatialReference,
        distance_m: f64,
        max_deviation_m: Option<f64>,
        tracker: Option<&dyn ProgressTracker>,
    ) -> Result<Geometry> {
        tracker::check(tracker, 0, 1)?;
        let arcs = GeodesicArcs {
            max_deviation_m,
            max_vertices_in_full_circle: self.max_vertices_in_full_circle,
        };
        buffer_one(geometry, sr, distance_m, arcs)
    }

    /// Forme curseur ; `params.max_deviation` est exprimé en mètres
    pub fn execute_cursor(
        &self,
        cursor: GeometryCursor,
        sr: SpatialReference,
        params: BufferParams,
        tracker: Option<Tracker>,
    ) -> GeometryCursor {
        let union = params.union;
        let buffered: GeometryCursor = Box::new(GeodesicBufferCursor {
            upstream: cursor,
            sr,
            arcs: GeodesicArcs {
                max_deviation_m: params.max_deviation,
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
    sr: &SpatialReference,
    distance_m: f64,
    arcs: GeodesicArcs,
) -> Result<Geometry> {
    if !sr.is_georeferenced() {
        return Err(GeometryError::reference_missing(
            "geodesic buffer requires a geographic or projected spatial reference",
        ));
    }
    if !distance_m.is_finite() {
        return Err(GeometryError::invalid_argument(format!(
            "buffer distance must be finite, got {distance_m}"
        )));
    }
    let geodesy = Geodesy::for_reference(sr);
    if sr.is_geographic() {
        return Ok(Geometry::from(geodesic::buffer(&geodesy, geometry, distance_m, arcs)));
    }

    let wgs84 = SpatialReference::wgs84();
    let forward = ProjectionTransformation::new(sr, &wgs84);
    let geographic = project(geometry, &forward, None)?;
    let buffered = Geometry::from(geodesic::buffer(&geodesy, &geographic, distance_m, arcs));
    project(&buffered, &forward.reverse(), None)
}

struct GeodesicBufferCursor {
    upstream: GeometryCursor,
    sr: SpatialReference,
    params: BufferParams,
    arcs: GeodesicArcs,
    tracker: Option<Tracker>,
    index: usize,
}

impl Cursor for GeodesicBufferCursor {
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
        let out = buffer_one(&element.payload, &self.sr, distance, self.arcs)?;
        tracing::trace!(id = element.id, distance, "element buffered on the ellipsoid");
        Ok(Some(element.with_geometry(out)))
    }
}
