//! Projection de géométries entre références spatiales
//!
//! [`project`] copie, [`project_owned`] transforme le tampon de coordonnées reçu sans
//! en allouer un second. Vers une cible coupée à ±180° (géographique, Mercator), les
//! géométries géographiques sont d'abord repliées dans [-180, 180]. Vers une cible
//! continue à travers l'antiméridien (azimutale, transverse), elles sont projetées
//! sans découpe pour rester d'un seul tenant. Un résultat géographique est toujours
//! ramené dans [-180, 180].

mod engine;
mod fold;
pub mod lite;
#[cfg(feature = "reproject")]
mod proj;
mod transformation;

use geo::Coord;
use geochain_core::sref::ProjectionMethod;
use geochain_core::tracker::{self, ProgressTracker};
use geochain_core::{Geometry, Result, SpatialReference};

pub use engine::CoordinateEngine;
pub use fold::{fold_into_360_range, needs_folding};
pub use transformation::ProjectionTransformation;

/// Projette une copie de `geometry`
pub fn project(
    geometry: &Geometry,
    transform: &ProjectionTransformation,
    tracker: Option<&dyn ProgressTracker>,
) -> Result<Geometry> {
    if geometry.is_empty() {
        return Ok(geometry.clone());
    }
    let (from, to) = transform.references()?;
    if transform.is_identity() {
        return Ok(geometry.clone());
    }
    tracker::check(tracker, 0, 1)?;

    let prepared = if from.is_geographic() && !continuous_across_antimeridian(to) {
        fold_into_360_range(geometry)
    } else {
        geometry.clone()
    };
    let projected = project_owned(prepared, transform)?;
    if to.is_geographic() && needs_folding(&projected) {
        return Ok(fold_into_360_range(&projected));
    }
    Ok(projected)
}

/// Vrai si la cible ramène l'écart de longitude dans [-π, π] : une surface à cheval
/// sur ±180° y reste contiguë sans repli préalable
fn continuous_across_antimeridian(to: &SpatialReference) -> bool {
    matches!(
        to.method(),
        Some(ProjectionMethod::LambertAzimuthalEqualArea { .. } | ProjectionMethod::TransverseMercator { .. })
    )
}

/// Projette sur place : la géométrie est consommée et ses coordonnées réécrites.
///
/// Aucun repli en longitude n'est fait ici ; l'appelant qui en a besoin passe par
/// [`project`].
pub fn project_owned(geometry: Geometry, transform: &ProjectionTransformation) -> Result<Geometry> {
    if geometry.is_empty() {
        return Ok(geometry);
    }
    transform.references()?;
    if transform.is_identity() {
        return Ok(geometry);
    }
    let engine = transform.engine()?;
    let mut apply = |coords: &mut [Coord]| engine.transform(coords);
    let projected = geometry.envelope_as_polygon().try_transform_coords(&mut apply)?;
    tracing::trace!(engine = engine.description(), "geometry projected");
    Ok(projected)
}
