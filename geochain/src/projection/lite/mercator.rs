//! Projection de Mercator
//!
//! Web Mercator (EPSG:3857), aussi connu sous le nom de Pseudo-Mercator : modèle
//! sphérique de rayon égal au demi-grand axe WGS84. Le Mercator ellipsoïdal passe
//! par la latitude isométrique.

use geochain_core::Ellipsoid;

use super::{isometric_latitude, latitude_from_isometric, Geographic};

/// Latitude limite de Web Mercator (carte carrée), en degrés
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.0511287798;

#[derive(Debug, Clone, PartialEq)]
pub struct Mercator {
    a: f64,
    e: f64,
    lon0: f64,
    k0: f64,
    x0: f64,
    y0: f64,
    /// Latitude bornée (Web Mercator uniquement)
    clamp: Option<f64>,
}

impl Mercator {
    pub fn web() -> Self {
        Self {
            a: Ellipsoid::WGS84.a(),
            e: 0.0,
            lon0: 0.0,
            k0: 1.0,
            x0: 0.0,
            y0: 0.0,
            clamp: Some(WEB_MERCATOR_MAX_LAT.to_radians()),
        }
    }

    pub fn new(ellipsoid: Ellipsoid, lon0: f64, k0: f64, x0: f64, y0: f64) -> Self {
        Self {
            a: ellipsoid.a(),
            e: ellipsoid.e(),
            lon0: lon0.to_radians(),
            k0,
            x0,
            y0,
            clamp: None,
        }
    }

    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        // Limiter la latitude pour éviter l'infini
        let lat = match self.clamp {
            Some(max) => geo.lat.clamp(-max, max),
            None => geo.lat,
        };
        let x = self.x0 + self.a * self.k0 * (geo.lon - self.lon0);
        let y = self.y0 + self.a * self.k0 * isometric_latitude(lat, self.e);
        (x, y)
    }

    pub fn inverse(&self, x: f64, y: f64) -> Geographic {
        let lon = self.lon0 + (x - self.x0) / (self.a * self.k0);
        let iso = (y - self.y0) / (self.a * self.k0);
        let lat = if self.e == 0.0 {
            // Latitude = 2 * atan(exp(y/R)) - π/2
            2.0 * iso.exp().atan() - std::f64::consts::FRAC_PI_2
        } else {
            latitude_from_isometric(iso, self.e)
        };
        Geographic::new(lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paris_to_web_mercator() {
        // Paris: 2.35°E, 48.85°N
        let (x, y) = Mercator::web().forward(Geographic::from_degrees(2.35, 48.85));

        // X ≈ 261600, Y ≈ 6250000
        assert!((x - 261600.0).abs() < 1000.0, "x={}", x);
        assert!((y - 6250000.0).abs() < 10000.0, "y={}", y);
    }

    #[test]
    fn test_web_mercator_square_world() {
        let (x, y) = Mercator::web().forward(Geographic::from_degrees(180.0, 89.9));
        assert!((x - 20037508.342789244).abs() < 1e-6, "x={}", x);
        assert!((y - 20037508.342789244).abs() < 0.01, "y={}", y);
    }

    #[test]
    fn test_roundtrip() {
        for merc in [Mercator::web(), Mercator::new(Ellipsoid::WGS84, 10.0, 1.0, 0.0, 0.0)] {
            let (x, y) = merc.forward(Geographic::from_degrees(2.35, 48.85));
            let (lon, lat) = merc.inverse(x, y).to_degrees();
            assert!((lon - 2.35).abs() < 1e-9, "lon={}", lon);
            assert!((lat - 48.85).abs() < 1e-9, "lat={}", lat);
        }
    }
}
