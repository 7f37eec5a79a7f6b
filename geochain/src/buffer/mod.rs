//! Algorithmes de zone tampon
//!
//! - [`planar`] : disques et capsules dans le plan de la référence
//! - [`geodesic`] : disques et capsules géodésiques sur l'ellipsoïde
//!
//! Le résultat est toujours une surface : union de la géométrie d'origine (si elle est
//! surfacique) avec un disque par sommet isolé et une capsule par segment.

pub mod geodesic;
pub mod planar;

use std::f64::consts::TAU;

/// Nombre minimal de sommets d'un cercle
pub const MIN_VERTICES_IN_FULL_CIRCLE: usize = 12;

/// Nombre de sommets d'un cercle de rayon `radius`.
///
/// Avec un écart maximal, le pas angulaire est `2 * acos(1 - deviation / radius)` ; le
/// plafond `max_vertices` l'emporte toujours.
pub fn vertices_per_circle(radius: f64, max_deviation: Option<f64>, max_vertices: usize) -> usize {
    let cap = max_vertices.max(MIN_VERTICES_IN_FULL_CIRCLE);
    let radius = radius.abs();
    match max_deviation {
        Some(deviation) if deviation > 0.0 && deviation < radius => {
            let step = 2.0 * (1.0 - deviation / radius).acos();
            let needed = (TAU / step).ceil() as usize;
            needed.clamp(MIN_VERTICES_IN_FULL_CIRCLE, cap)
        }
        Some(deviation) if deviation >= radius => MIN_VERTICES_IN_FULL_CIRCLE,
        _ => cap,
    }
}
