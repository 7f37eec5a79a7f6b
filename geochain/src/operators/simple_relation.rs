//! Relation topologique d'une géométrie avec des candidats

use std::collections::HashMap;

use geochain_core::kernel::relate;
use geochain_core::tracker::{self, ProgressTracker};
use geochain_core::{Cursor, Geometry, GeometryCursor, Relation, Result, SpatialReference};

#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleRelation;

impl SimpleRelation {
    /// Évalue `relation` entre `geometry` et chaque candidat ; la clé est l'id du candidat.
    ///
    /// La tolérance de `sr` (0 sans référence) s'applique à l'égalité.
    pub fn execute(
        &self,
        geometry: &Geometry,
        candidates: &mut GeometryCursor,
        sr: Option<&SpatialReference>,
        tracker: Option<&dyn ProgressTracker>,
        relation: Relation,
    ) -> Result<HashMap<i64, bool>> {
        let tolerance = sr.map_or(0.0, SpatialReference::tolerance);
        let mut results = HashMap::new();
        let mut step = 0;
        loop {
            tracker::check(tracker, step, -1)?;
            let Some(candidate) = candidates.next()? else {
                break;
            };
            step += 1;
            let value = relate(relation, geometry, &candidate.payload, tolerance);
            tracing::trace!(id = candidate.id, relation = relation.name(), value, "relation evaluated");
            results.insert(candidate.id, value);
        }
        Ok(results)
    }

    /// Forme à deux géométries
    pub fn execute_pair(
        &self,
        a: &Geometry,
        b: &Geometry,
        sr: Option<&SpatialReference>,
        relation: Relation,
    ) -> bool {
        let tolerance = sr.map_or(0.0, SpatialReference::tolerance);
        relate(relation, a, b, tolerance)
    }
}
