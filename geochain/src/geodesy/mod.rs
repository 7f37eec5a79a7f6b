//! Géodésie sur l'ellipsoïde d'une référence spatiale
//!
//! Problèmes direct et inverse résolus par `geographiclib-rs`. Les coordonnées sont
//! des `Coord { x: lon, y: lat }` en degrés.

mod densify;

use std::fmt;

use geo::{Coord, Rect};
use geochain_core::{Ellipsoid, SpatialReference};
use geographiclib_rs::{DirectGeodesic, Geodesic, InverseGeodesic};

/// Résultat du problème inverse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseResult {
    /// Azimut de 1 vers 2 au point 1, radians dans (-π, π]
    pub az12_rad: f64,
    /// Azimut de 2 vers 1 au point 2, radians dans (-π, π]
    pub az21_rad: f64,
    /// Longueur de la géodésique en mètres
    pub distance_m: f64,
}

/// Solveur géodésique lié à un ellipsoïde
pub struct Geodesy {
    ellipsoid: Ellipsoid,
    geod: Geodesic,
}

impl fmt::Debug for Geodesy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geodesy")
            .field("ellipsoid", &self.ellipsoid)
            .finish()
    }
}

impl Geodesy {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self {
            ellipsoid,
            geod: Geodesic::new(ellipsoid.a(), ellipsoid.f()),
        }
    }

    /// Ellipsoïde de la référence si elle est géographique, WGS84 sinon
    pub fn for_reference(sr: &SpatialReference) -> Self {
        if sr.is_geographic() {
            Self::new(sr.ellipsoid())
        } else {
            Self::new(Ellipsoid::WGS84)
        }
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Problème inverse entre deux points
    pub fn inverse(&self, p1: Coord, p2: Coord) -> InverseResult {
        let (s12, azi1, azi2, _a12): (f64, f64, f64, f64) =
            self.geod.inverse(p1.y, p1.x, p2.y, p2.x);
        InverseResult {
            az12_rad: normalize_azimuth(azi1).to_radians(),
            az21_rad: normalize_azimuth(azi2 + 180.0).to_radians(),
            distance_m: s12,
        }
    }

    /// Distance géodésique en mètres
    pub fn distance(&self, p1: Coord, p2: Coord) -> f64 {
        let s12: f64 = self.geod.inverse(p1.y, p1.x, p2.y, p2.x);
        s12
    }

    /// Azimuts (degrés) aux deux extrémités et distance
    pub fn inverse_degrees(&self, p1: Coord, p2: Coord) -> (f64, f64, f64) {
        let (s12, azi1, azi2, _a12): (f64, f64, f64, f64) =
            self.geod.inverse(p1.y, p1.x, p2.y, p2.x);
        (s12, azi1, azi2)
    }

    /// Problème direct ; la longitude reste proche de celle du départ
    pub fn direct(&self, p: Coord, azimuth_deg: f64, distance_m: f64) -> Coord {
        let (lat2, lon2): (f64, f64) = self.geod.direct(p.y, p.x, azimuth_deg, distance_m);
        Coord {
            x: unwrap_near(lon2, p.x),
            y: lat2,
        }
    }

    /// Point à mi-chemin sur la géodésique
    pub fn midpoint(&self, p1: Coord, p2: Coord) -> Coord {
        let (s12, azi1, _) = self.inverse_degrees(p1, p2);
        if s12 == 0.0 {
            return p1;
        }
        self.direct(p1, azi1, s12 / 2.0)
    }

    /// Centre géodésique d'une enveloppe géographique : milieu des milieux des
    /// deux diagonales
    pub fn envelope_center(&self, envelope: Rect) -> Coord {
        let (min, max) = (envelope.min(), envelope.max());
        let lower_right = Coord { x: max.x, y: min.y };
        let upper_left = Coord { x: min.x, y: max.y };
        let m1 = self.midpoint(lower_right, upper_left);
        let m2 = self.midpoint(min, max);
        let center = self.midpoint(m1, m2);
        Coord {
            x: unwrap_near(center.x, (min.x + max.x) / 2.0),
            y: center.y,
        }
    }
}

/// Azimut en degrés ramené dans (-180, 180]
pub fn normalize_azimuth(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    if r > 180.0 {
        r - 360.0
    } else {
        r
    }
}

/// Longitude décalée de k·360 pour être au plus près de `reference`
pub fn unwrap_near(lon: f64, reference: f64) -> f64 {
    lon + 360.0 * ((reference - lon) / 360.0).round()
}

/// Longitude ramenée dans [-180, 180]
pub fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_inverse_along_equator() {
        let g = Geodesy::new(Ellipsoid::WGS84);
        let r = g.inverse(Coord { x: 0.0, y: 0.0 }, Coord { x: -1.0, y: 0.0 });
        assert!((r.distance_m - 111319.4907932264).abs() < 1e-6, "d={}", r.distance_m);
        assert!((r.az12_rad + FRAC_PI_2).abs() < 1e-12);
        assert!((r.az21_rad - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_direct_keeps_longitude_continuous() {
        let g = Geodesy::new(Ellipsoid::WGS84);
        let p = g.direct(Coord { x: 179.9, y: 0.0 }, 90.0, 50_000.0);
        assert!(p.x > 180.0, "x={}", p.x);
        let back = g.inverse(Coord { x: 179.9, y: 0.0 }, p);
        assert!((back.distance_m - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_midpoint_and_center() {
        let g = Geodesy::new(Ellipsoid::WGS84);
        let m = g.midpoint(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 });
        assert!((m.x - 5.0).abs() < 1e-9 && m.y.abs() < 1e-9);
        let c = g.envelope_center(Rect::new(Coord { x: 170.0, y: -5.0 }, Coord { x: 190.0, y: 5.0 }));
        assert!((c.x - 180.0).abs() < 1e-6, "x={}", c.x);
        assert!(c.y.abs() < 1e-6, "y={}", c.y);
    }

    #[test]
    fn test_angle_helpers() {
        assert_eq!(normalize_azimuth(-180.0), 180.0);
        assert_eq!(normalize_azimuth(270.0), -90.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(unwrap_near(-179.0, 179.0), 181.0);
    }
}
