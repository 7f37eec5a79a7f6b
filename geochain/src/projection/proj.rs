//! Transformation de coordonnées avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.

use std::rc::Rc;

use geo::Coord;
use geochain_core::{GeometryError, Result, SpatialReference};
use proj::Proj;

/// Transformation PROJ entre deux références
#[derive(Clone)]
pub struct ProjTransform {
    proj: Rc<Proj>,
    source: String,
    target: String,
}

impl std::fmt::Debug for ProjTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjTransform")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish()
    }
}

impl ProjTransform {
    /// Crée une transformation entre deux références
    pub fn new(from: &SpatialReference, to: &SpatialReference) -> Result<Self> {
        let source = from.engine_definition();
        let target = to.engine_definition();

        let proj = Proj::new_known_crs(&source, &target, None).map_err(|e| {
            GeometryError::projection(format!(
                "Failed to create projection from {} to {}: {}",
                from, to, e
            ))
        })?;

        Ok(Self {
            proj: Rc::new(proj),
            source,
            target,
        })
    }

    /// Transforme un tableau de coordonnées (conversion batch)
    pub fn transform(&self, coords: &mut [Coord]) -> Result<()> {
        // Copier les coordonnées pour transformation in-place
        let mut buffer: Vec<(f64, f64)> = coords.iter().map(|c| (c.x, c.y)).collect();

        // Transformation batch - beaucoup plus rapide que point par point
        self.proj
            .convert_array(&mut buffer)
            .map_err(|e| GeometryError::projection(format!("Batch coordinate transformation failed: {e}")))?;

        for (c, (x, y)) in coords.iter_mut().zip(buffer) {
            c.x = x;
            c.y = y;
        }
        Ok(())
    }

    pub fn description(&self) -> String {
        format!("{} -> {}", self.source, self.target)
    }
}
