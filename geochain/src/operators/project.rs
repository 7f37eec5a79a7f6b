//! Opérateur de projection

use geochain_core::tracker::{self, ProgressTracker, Tracker};
use geochain_core::{
    CrsGeometry, CrsGeometryCursor, Cursor, Element, Geometry, GeometryCursor, Result,
    SpatialReference,
};

use crate::projection::{project, project_owned, ProjectionTransformation};

#[derive(Debug, Default, Clone, Copy)]
pub struct Project;

impl Project {
    /// Projette une copie de la géométrie
    pub fn execute(
        &self,
        geometry: &Geometry,
        transform: &ProjectionTransformation,
        tracker: Option<&dyn ProgressTracker>,
    ) -> Result<Geometry> {
        project(geometry, transform, tracker)
    }

    /// Projette sur place la géométrie reçue
    pub fn execute_owned(&self, geometry: Geometry, transform: &ProjectionTransformation) -> Result<Geometry> {
        project_owned(geometry, transform)
    }

    pub fn execute_cursor(
        &self,
        cursor: GeometryCursor,
        transform: ProjectionTransformation,
        tracker: Option<Tracker>,
    ) -> GeometryCursor {
        Box::new(ProjectCursor {
            upstream: cursor,
            transform,
            tracker,
            index: 0,
        })
    }

    /// Projette des géométries portant chacune leur référence vers une cible unique
    pub fn execute_crs_cursor(
        &self,
        cursor: CrsGeometryCursor,
        to: SpatialReference,
        tracker: Option<Tracker>,
    ) -> GeometryCursor {
        Box::new(CrsProjectCursor {
            upstream: cursor,
            to,
            transform: None,
            tracker,
            index: 0,
        })
    }
}

struct ProjectCursor {
    upstream: GeometryCursor,
    transform: ProjectionTransformation,
    tracker: Option<Tracker>,
    index: i64,
}

impl Cursor for ProjectCursor {
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
        let projected = project(&element.payload, &self.transform, None)?;
        tracing::trace!(id = element.id, "element projected");
        Ok(Some(element.with_geometry(projected)))
    }
}

struct CrsProjectCursor {
    upstream: CrsGeometryCursor,
    to: SpatialReference,
    /// Dernière transformation utilisée, réutilisée tant que la source ne change pas
    transform: Option<ProjectionTransformation>,
    tracker: Option<Tracker>,
    index: i64,
}

impl CrsProjectCursor {
    fn transform_from(&mut self, from: &SpatialReference) -> &ProjectionTransformation {
        if self.transform.as_ref().is_some_and(|t| t.from() != Some(from)) {
            self.transform = None;
        }
        self.transform
            .get_or_insert_with(|| ProjectionTransformation::new(from, &self.to))
    }
}

impl Cursor for CrsProjectCursor {
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
        let CrsGeometry {
            geometry,
            spatial_reference,
        } = &element.payload;
        let projected = project(geometry, self.transform_from(spatial_reference), None)?;
        Ok(Some(element.replace(projected)))
    }
}
