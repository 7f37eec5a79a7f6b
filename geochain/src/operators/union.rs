//! Union de surfaces

use geo::{BooleanOps, MultiPolygon};
use geochain_core::kernel::union_all;
use geochain_core::tracker::{self, Tracker};
use geochain_core::{Cursor, Element, Geometry, GeometryCursor, GeometryError, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct Union;

fn area_of(geometry: &Geometry) -> Result<MultiPolygon> {
    geometry.to_multi_polygon().ok_or_else(|| {
        GeometryError::unsupported_geometry(format!(
            "union expects Polygon or Envelope, got {}",
            geometry.geometry_type()
        ))
    })
}

impl Union {
    /// Union de deux surfaces
    pub fn execute(&self, a: &Geometry, b: &Geometry) -> Result<Geometry> {
        Ok(Geometry::from(area_of(a)?.union(&area_of(b)?)))
    }

    /// Réunit tout le flux amont en un élément d'id 0
    pub fn execute_cursor(&self, cursor: GeometryCursor, tracker: Option<Tracker>) -> GeometryCursor {
        Box::new(UnionCursor::new(cursor, tracker))
    }
}

/// Curseur d'agrégation : vide l'amont au premier `next()` puis rend l'union
pub(crate) struct UnionCursor {
    upstream: GeometryCursor,
    tracker: Option<Tracker>,
    done: bool,
}

impl UnionCursor {
    pub(crate) fn new(upstream: GeometryCursor, tracker: Option<Tracker>) -> Self {
        Self {
            upstream,
            tracker,
            done: false,
        }
    }
}

impl Cursor for UnionCursor {
    type Item = Geometry;

    fn has_next(&self) -> bool {
        !self.done && self.upstream.has_next()
    }

    fn next(&mut self) -> Result<Option<Element<Geometry>>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;
        let mut parts = Vec::new();
        let mut step = 0;
        loop {
            tracker::check(self.tracker.as_deref(), step, -1)?;
            let Some(element) = self.upstream.next()? else {
                break;
            };
            parts.push(area_of(&element.payload)?);
            step += 1;
        }
        if parts.is_empty() {
            return Ok(None);
        }
        let count = parts.len();
        let merged = union_all(parts);
        tracing::debug!(inputs = count, parts = merged.0.len(), "union computed");
        Ok(Some(Element::geometry(Geometry::from(merged), 0)))
    }
}
