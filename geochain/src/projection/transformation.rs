//! Paire ordonnée (source, cible) et moteur de coordonnées associé

use std::cell::OnceCell;

use geo::Coord;
use geochain_core::{Geometry, GeometryError, Result, SpatialReference};

use super::engine::CoordinateEngine;
use crate::geodesy::Geodesy;

pub(crate) const MISSING_REFERENCES: &str =
    "From and To Spatial references required to Project Geometry";

/// Transformation de projection
///
/// Le moteur est construit au premier usage puis réutilisé. [`reverse`](Self::reverse)
/// réutilise les constantes déjà dérivées quand le moteur le permet.
#[derive(Debug, Clone)]
pub struct ProjectionTransformation {
    from: Option<SpatialReference>,
    to: Option<SpatialReference>,
    engine: OnceCell<CoordinateEngine>,
}

impl ProjectionTransformation {
    pub fn new(from: &SpatialReference, to: &SpatialReference) -> Self {
        Self::from_optional(Some(from.clone()), Some(to.clone()))
    }

    /// Transformation dont une référence peut manquer ; l'erreur est levée à l'usage
    pub fn from_optional(from: Option<SpatialReference>, to: Option<SpatialReference>) -> Self {
        Self {
            from,
            to,
            engine: OnceCell::new(),
        }
    }

    /// Vers un Lambert azimutal équivalent centré sur le centre géodésique de
    /// l'enveloppe de `geometry`
    pub fn equal_area(geometry: &Geometry, sr: &SpatialReference) -> Result<Self> {
        let (lon, lat) = geodesic_center(geometry, sr)?;
        let target = SpatialReference::create_equal_area(lon, lat)?;
        tracing::trace!(lon, lat, "equal-area frame");
        Ok(Self::new(sr, &target))
    }

    /// Vers la zone UTM contenant le centre de `geometry`
    pub fn utm(geometry: &Geometry, sr: &SpatialReference) -> Result<Self> {
        let (lon, lat) = geodesic_center(geometry, sr)?;
        let target = SpatialReference::create_utm(lon, lat)?;
        Ok(Self::new(sr, &target))
    }

    pub fn from(&self) -> Option<&SpatialReference> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&SpatialReference> {
        self.to.as_ref()
    }

    /// Les deux références, ou `ReferenceMissing`
    pub fn references(&self) -> Result<(&SpatialReference, &SpatialReference)> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(GeometryError::reference_missing(MISSING_REFERENCES)),
        }
    }

    /// Vrai si source et cible désignent le même CRS
    pub fn is_identity(&self) -> bool {
        matches!((&self.from, &self.to), (Some(a), Some(b)) if a == b)
    }

    /// Transformation cible → source
    pub fn reverse(&self) -> Self {
        let reversed = Self::from_optional(self.to.clone(), self.from.clone());
        if let Some(engine) = self.engine.get().and_then(CoordinateEngine::reversed) {
            let _ = reversed.engine.set(engine);
        }
        reversed
    }

    /// Moteur de coordonnées, construit au premier appel
    pub fn engine(&self) -> Result<&CoordinateEngine> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine);
        }
        let (from, to) = self.references()?;
        let engine = CoordinateEngine::new(from, to)?;
        Ok(self.engine.get_or_init(|| engine))
    }

    /// Transforme un tableau de coordonnées sur place
    pub fn transform_coords(&self, coords: &mut [Coord]) -> Result<()> {
        self.engine()?.transform(coords)
    }
}

/// Centre géodésique (lon, lat) de l'enveloppe de `geometry`, en degrés WGS84
fn geodesic_center(geometry: &Geometry, sr: &SpatialReference) -> Result<(f64, f64)> {
    let envelope = geometry
        .envelope()
        .ok_or_else(|| GeometryError::invalid_argument("cannot center a frame on an empty geometry"))?;
    let wgs84 = SpatialReference::wgs84();
    let envelope = if sr.is_geographic() {
        envelope
    } else {
        // l'enveloppe projetée reste contiguë : pas de repli en longitude ici
        let corners = Geometry::from(envelope).envelope_as_polygon();
        let to_wgs84 = ProjectionTransformation::new(sr, &wgs84);
        let mut transform = |coords: &mut [Coord]| to_wgs84.transform_coords(coords);
        corners
            .try_transform_coords(&mut transform)?
            .envelope()
            .ok_or_else(|| GeometryError::projection("envelope vanished during projection"))?
    };
    let geodesy = Geodesy::new(if sr.is_geographic() { sr.ellipsoid() } else { wgs84.ellipsoid() });
    let center = geodesy.envelope_center(envelope);
    Ok((center.x, center.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reference() {
        let t = ProjectionTransformation::from_optional(Some(SpatialReference::wgs84()), None);
        let err = t.engine().unwrap_err();
        assert!(matches!(err, GeometryError::ReferenceMissing(ref m) if m == MISSING_REFERENCES));
    }

    #[test]
    fn test_reverse_reuses_engine() {
        let l93 = SpatialReference::from_code(2154).unwrap();
        let t = ProjectionTransformation::new(&l93, &SpatialReference::wgs84());
        t.engine().unwrap();
        let r = t.reverse();
        assert!(r.engine.get().is_some());
        assert_eq!(r.from().map(|s| s.code()), Some(4326));

        let mut coords = [Coord { x: 2.35, y: 48.85 }];
        r.transform_coords(&mut coords).unwrap();
        t.transform_coords(&mut coords).unwrap();
        assert!((coords[0].x - 2.35).abs() < 1e-9 && (coords[0].y - 48.85).abs() < 1e-9);
    }

    #[test]
    fn test_equal_area_center() {
        let square = Geometry::rect(0.0, 0.0, 10.0, 10.0);
        let t = ProjectionTransformation::equal_area(&square, &SpatialReference::wgs84()).unwrap();
        let target = t.to().unwrap();
        match target.method() {
            Some(geochain_core::ProjectionMethod::LambertAzimuthalEqualArea { lon0, lat0, .. }) => {
                assert!((lon0 - 5.0).abs() < 1e-6, "lon0={}", lon0);
                assert!(lat0 > 4.9 && lat0 < 5.1, "lat0={}", lat0);
            }
            other => panic!("unexpected method {other:?}"),
        }
    }

    #[test]
    fn test_utm_frame() {
        let parcel = Geometry::rect(2.3, 48.8, 2.4, 48.9);
        let t = ProjectionTransformation::utm(&parcel, &SpatialReference::wgs84()).unwrap();
        assert_eq!(t.to().unwrap().code(), 32631);
    }
}
