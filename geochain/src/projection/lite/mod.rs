//! Reprojection légère en Rust pur (sans moteur externe)
//!
//! Chaque CRS est « compilé » en [`LiteProjection`] (constantes précalculées) ;
//! une transformation passe par les coordonnées géographiques en radians :
//! source → (lon, lat) → cible. Aucun changement de datum n'est appliqué.
//!
//! Méthodes supportées :
//! - longitude/latitude
//! - Web Mercator (3857, 900913, 102100) et Mercator ellipsoïdal
//! - Transverse Mercator (UTM 326xx/327xx, `+proj=tmerc`, `+proj=utm`)
//! - Lambert conique conforme (Lambert 93, CC42-CC50, Californie VI en pieds US)
//! - Lambert azimutal équivalent, ellipsoïdal ou sphérique (3035, 2163)

mod laea;
mod lcc;
mod mercator;
mod tmerc;

use geo::Coord;
use geochain_core::sref::{CrsDefinition, ProjectionMethod};
use geochain_core::{GeometryError, Result};

pub use laea::LambertAzimuthal;
pub use lcc::LambertConic;
pub use mercator::{Mercator, WEB_MERCATOR_MAX_LAT};
pub use tmerc::TransverseMercator;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Calcule la latitude isométrique
pub(crate) fn isometric_latitude(lat: f64, e: f64) -> f64 {
    let sin_lat = lat.sin();
    let term = ((1.0 - e * sin_lat) / (1.0 + e * sin_lat)).powf(e / 2.0);
    ((std::f64::consts::FRAC_PI_4 + lat / 2.0).tan() * term).ln()
}

/// Calcule la latitude depuis la latitude isométrique (itératif)
pub(crate) fn latitude_from_isometric(iso_lat: f64, e: f64) -> f64 {
    let mut lat = 2.0 * iso_lat.exp().atan() - std::f64::consts::FRAC_PI_2;

    for _ in 0..15 {
        let sin_lat = lat.sin();
        let term = ((1.0 + e * sin_lat) / (1.0 - e * sin_lat)).powf(e / 2.0);
        let new_lat = 2.0 * (iso_lat.exp() * term).atan() - std::f64::consts::FRAC_PI_2;

        if (new_lat - lat).abs() < 1e-12 {
            return new_lat;
        }
        lat = new_lat;
    }
    lat
}

/// Calcule la grande normale (rayon de courbure dans le plan vertical)
pub(crate) fn grande_normale(lat: f64, a: f64, e2: f64) -> f64 {
    a / (1.0 - e2 * lat.sin().powi(2)).sqrt()
}

/// Ramène un écart de longitude dans [-π, π]
pub(crate) fn adjust_lon(dlon: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    if (-PI..=PI).contains(&dlon) {
        dlon
    } else {
        dlon - TAU * ((dlon + PI) / TAU).floor()
    }
}

/// Projection aux constantes précalculées
#[derive(Debug, Clone, PartialEq)]
pub enum LiteProjection {
    Geographic,
    Mercator(Mercator),
    TransverseMercator(TransverseMercator),
    LambertConic(LambertConic),
    LambertAzimuthal(LambertAzimuthal),
}

impl LiteProjection {
    /// `None` si la méthode n'a pas d'implémentation locale
    pub fn compile(definition: &CrsDefinition) -> Option<Self> {
        let e = definition.ellipsoid;
        let projection = match definition.method? {
            ProjectionMethod::LongLat => Self::Geographic,
            ProjectionMethod::WebMercator => Self::Mercator(Mercator::web()),
            ProjectionMethod::Mercator { lon0, k0, x0, y0 } => {
                Self::Mercator(Mercator::new(e, lon0, k0, x0, y0))
            }
            ProjectionMethod::TransverseMercator { lon0, lat0, k0, x0, y0 } => {
                Self::TransverseMercator(TransverseMercator::new(e, lon0, lat0, k0, x0, y0))
            }
            ProjectionMethod::LambertConformalConic { lon0, lat0, lat1, lat2, x0, y0 } => {
                Self::LambertConic(LambertConic::new(e, lon0, lat0, lat1, lat2, x0, y0))
            }
            ProjectionMethod::LambertAzimuthalEqualArea { lon0, lat0, x0, y0 } => {
                Self::LambertAzimuthal(LambertAzimuthal::new(e, lon0, lat0, x0, y0))
            }
        };
        Some(projection)
    }

    /// Coordonnées projetées (mètres) vers géographiques
    pub fn to_geographic(&self, x: f64, y: f64) -> Geographic {
        match self {
            Self::Geographic => Geographic::from_degrees(x, y),
            Self::Mercator(p) => p.inverse(x, y),
            Self::TransverseMercator(p) => p.inverse(x, y),
            Self::LambertConic(p) => p.inverse(x, y),
            Self::LambertAzimuthal(p) => p.inverse(x, y),
        }
    }

    /// Coordonnées géographiques vers projetées (mètres)
    pub fn from_geographic(&self, geo: Geographic) -> (f64, f64) {
        match self {
            Self::Geographic => geo.to_degrees(),
            Self::Mercator(p) => p.forward(geo),
            Self::TransverseMercator(p) => p.forward(geo),
            Self::LambertConic(p) => p.forward(geo),
            Self::LambertAzimuthal(p) => p.forward(geo),
        }
    }

    fn is_geographic(&self) -> bool {
        matches!(self, Self::Geographic)
    }
}

/// Transformation source → cible calculée en Rust pur
#[derive(Debug, Clone, PartialEq)]
pub struct LiteTransform {
    source: LiteProjection,
    source_unit: f64,
    target: LiteProjection,
    target_unit: f64,
}

impl LiteTransform {
    /// `None` si l'un des deux CRS n'est pas calculable localement
    pub fn new(source: &CrsDefinition, target: &CrsDefinition) -> Option<Self> {
        Some(Self {
            source: LiteProjection::compile(source)?,
            source_unit: source.unit_to_meter,
            target: LiteProjection::compile(target)?,
            target_unit: target.unit_to_meter,
        })
    }

    /// Transformation inverse, sans recalcul des constantes
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            source_unit: self.target_unit,
            target: self.source.clone(),
            target_unit: self.source_unit,
        }
    }

    /// Transforme un point (x, y) de la source vers la cible
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        // Étape 1: Source → Géographique
        let geo = if self.source.is_geographic() {
            self.source.to_geographic(x, y)
        } else {
            self.source
                .to_geographic(x * self.source_unit, y * self.source_unit)
        };

        // Étape 2: Géographique → Cible
        let (tx, ty) = self.target.from_geographic(geo);
        if self.target.is_geographic() {
            (tx, ty)
        } else {
            (tx / self.target_unit, ty / self.target_unit)
        }
    }

    /// Transforme un tableau de coordonnées sur place
    pub fn transform(&self, coords: &mut [Coord]) -> Result<()> {
        for c in coords.iter_mut() {
            let (x, y) = self.transform_point(c.x, c.y);
            if !x.is_finite() || !y.is_finite() {
                return Err(GeometryError::projection(format!(
                    "coordinate ({}, {}) cannot be projected",
                    c.x, c.y
                )));
            }
            c.x = x;
            c.y = y;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geochain_core::sref::catalog;

    fn transform(from: u32, to: u32) -> LiteTransform {
        LiteTransform::new(&catalog::lookup(from).unwrap(), &catalog::lookup(to).unwrap()).unwrap()
    }

    #[test]
    fn test_lambert93_to_wgs84() {
        // Paris (environ)
        let t = transform(2154, 4326);
        let (lon, lat) = t.transform_point(652381.0, 6862047.0);

        // Paris est à environ 2.35°E, 48.85°N
        assert!((lon - 2.35).abs() < 0.1, "lon={}", lon);
        assert!((lat - 48.85).abs() < 0.1, "lat={}", lat);
    }

    #[test]
    fn test_utm_to_wgs84() {
        // Fort-de-France, Martinique (environ 14.6°N, -61.0°W)
        let t = transform(32620, 4326);
        let (lon, lat) = t.transform_point(708000.0, 1615000.0);

        assert!((lon - (-61.0)).abs() < 0.5, "lon={}", lon);
        assert!((lat - 14.6).abs() < 0.5, "lat={}", lat);
    }

    #[test]
    fn test_lambert93_to_3857_through_geographic() {
        let t = transform(2154, 3857);
        let (x, y) = t.transform_point(652381.0, 6862047.0);
        assert!((x - 261600.0).abs() < 2000.0, "x={}", x);
        assert!((y - 6250000.0).abs() < 10000.0, "y={}", y);
    }

    #[test]
    fn test_us_feet_origin() {
        let t = transform(4326, 2230);
        let (x, y) = t.transform_point(-116.25, 32.0 + 10.0 / 60.0);
        assert!((x - 6_561_666.667).abs() < 1e-3, "x={}", x);
        assert!((y - 1_640_416.667).abs() < 1e-3, "y={}", y);
    }

    #[test]
    fn test_reversed_round_trip() {
        let forward = transform(4326, 3946);
        let back = forward.reversed();
        let mut coords = vec![Coord { x: 4.85, y: 45.75 }, Coord { x: 3.1, y: 46.2 }];
        let original = coords.clone();
        forward.transform(&mut coords).unwrap();
        back.transform(&mut coords).unwrap();
        for (a, b) in coords.iter().zip(&original) {
            assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_adjust_lon() {
        use std::f64::consts::PI;
        assert!((adjust_lon(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert_eq!(adjust_lon(1.0), 1.0);
    }
}
