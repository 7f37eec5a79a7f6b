//! Tirage de points aléatoires à densité surfacique constante
//!
//! Les points sont tirés uniformément dans l'enveloppe de la géométrie exprimée dans un
//! Lambert azimutal équivalent centré sur elle, ramenés dans la référence d'origine
//! puis découpés par la surface (trous et parties multiples compris).
//!
//! Le découpage se fait sur les arêtes de la surface telle qu'elle est dessinée, sans
//! densification géodésique : une arête géodésique bombée vers le pôle laisserait
//! passer des points hors du polygone planaire.

use geo::{Coord, LineString, MultiPoint, MultiPolygon, Point, Polygon, Rect};
use geochain_core::kernel::clip_points;
use geochain_core::tracker::{self, ProgressTracker};
use geochain_core::{Geometry, GeometryError, GeometryType, Result, Shape, SpatialReference};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geodesy::wrap_longitude;
use crate::projection::{fold_into_360_range, project_owned, ProjectionTransformation};
use crate::settings::Settings;

/// Nombre maximal de coordonnées d'un tirage
const MAX_COORDINATES: f64 = (i32::MAX - 8) as f64;

/// Anneau de l'enveloppe, chaque côté découpé en `steps` segments
fn densified_envelope(envelope: Rect, steps: usize) -> Geometry {
    let (min, max) = (envelope.min(), envelope.max());
    let corners = [
        min,
        Coord { x: max.x, y: min.y },
        max,
        Coord { x: min.x, y: max.y },
    ];
    let steps = steps.max(1);
    let mut ring = Vec::with_capacity(4 * steps + 1);
    for i in 0..4 {
        let (a, b) = (corners[i], corners[(i + 1) % 4]);
        for s in 0..steps {
            let t = s as f64 / steps as f64;
            ring.push(Coord {
                x: a.x + (b.x - a.x) * t,
                y: a.y + (b.y - a.y) * t,
            });
        }
    }
    ring.push(min);
    Geometry::from(Polygon::new(LineString::new(ring), vec![]))
}

/// Nombre de points pour une aire en m² ; `CapacityExceeded` au-delà de la capacité
pub fn point_count(area_m2: f64, points_per_km2: f64) -> Result<usize> {
    let count = (area_m2 / 1_000_000.0 * points_per_km2).ceil();
    if !count.is_finite() || count * 2.0 > MAX_COORDINATES {
        return Err(GeometryError::CapacityExceeded(
            "Random Point count outside of available".into(),
        ));
    }
    Ok(count as usize)
}

/// Surface de découpage ; repliée dans [-180, 180] pour une référence géographique
fn clipping_area(area: MultiPolygon, sr: &SpatialReference) -> MultiPolygon {
    if !sr.is_geographic() {
        return area;
    }
    match fold_into_360_range(&Geometry::from(area)).into_shape() {
        Shape::Polygon(mp) => mp,
        _ => MultiPolygon::new(Vec::new()),
    }
}

/// Points aléatoires dans `geometry` (Polygon ou Envelope), `points_per_km2` par km².
///
/// Le tirage est déterministe pour une graine donnée.
pub fn random_points(
    geometry: &Geometry,
    points_per_km2: f64,
    seed: u64,
    sr: Option<&SpatialReference>,
    settings: &Settings,
    tracker: Option<&dyn ProgressTracker>,
) -> Result<MultiPoint> {
    if !matches!(
        geometry.geometry_type(),
        GeometryType::Polygon | GeometryType::Envelope
    ) {
        return Err(GeometryError::unsupported_geometry(
            "Geometry input must be of type Polygon or Envelope",
        ));
    }
    let sr = match sr {
        Some(sr) if sr.is_georeferenced() => sr,
        _ => {
            return Err(GeometryError::reference_missing(
                "Spatial reference must be defined and must have unit definition",
            ))
        }
    };
    if !points_per_km2.is_finite() || points_per_km2 < 0.0 {
        return Err(GeometryError::invalid_argument(format!(
            "points per square kilometre must be a finite non-negative number, got {points_per_km2}"
        )));
    }
    let (Some(area), Some(envelope)) = (geometry.to_multi_polygon(), geometry.envelope()) else {
        return Ok(MultiPoint::new(Vec::new()));
    };
    tracker::check(tracker, 0, 1)?;

    let forward = ProjectionTransformation::equal_area(geometry, sr)?;
    let frame = project_owned(
        densified_envelope(envelope, settings.envelope_densify_steps),
        &forward,
    )?
    .envelope()
    .ok_or_else(|| GeometryError::projection("sampling frame vanished during projection"))?;

    let frame_area = frame.width() * frame.height();
    let count = point_count(frame_area, points_per_km2)?;
    tracing::debug!(count, frame_area, "drawing random points");

    let mut rng = StdRng::seed_from_u64(seed);
    let (min, width, height) = (frame.min(), frame.width(), frame.height());
    let samples: Vec<Point> = (0..count)
        .map(|_| {
            let x = min.x + rng.gen::<f64>() * width;
            let y = min.y + rng.gen::<f64>() * height;
            Point::new(x, y)
        })
        .collect();

    let backward = forward.reverse();
    let Shape::MultiPoint(samples) = project_owned(Geometry::from(MultiPoint::new(samples)), &backward)?.into_shape() else {
        return Err(GeometryError::projection("samples changed type during projection"));
    };
    tracker::check(tracker, 1, 1)?;

    let samples = if sr.is_geographic() {
        MultiPoint::new(
            samples
                .0
                .into_iter()
                .map(|p| Point::new(wrap_longitude(p.x()), p.y()))
                .collect(),
        )
    } else {
        samples
    };
    let clipper = clipping_area(area, sr);
    let kept = clip_points(&samples, &clipper);
    if kept.0.is_empty() && count > 0 {
        tracing::warn!(count, "no random point fell inside the geometry");
    }
    tracing::debug!(kept = kept.0.len(), drawn = count, "random points clipped");
    Ok(kept)
}
