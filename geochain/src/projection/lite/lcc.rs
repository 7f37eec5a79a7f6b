//! Projection Lambert conique conforme
//!
//! Deux parallèles standards (Lambert 93, CC42 à CC50, Californie) ou un seul
//! (cas tangent, `lat_1 == lat_2`).

use geochain_core::Ellipsoid;

use super::{adjust_lon, grande_normale, isometric_latitude, latitude_from_isometric, Geographic};

#[derive(Debug, Clone, PartialEq)]
pub struct LambertConic {
    e: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
    /// Exposant de la projection
    n: f64,
    /// Constante C
    c: f64,
    /// Rayon à l'origine
    r0: f64,
}

impl LambertConic {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        lat1: f64,
        lat2: f64,
        x0: f64,
        y0: f64,
    ) -> Self {
        let (a, e, e2) = (ellipsoid.a(), ellipsoid.e(), ellipsoid.e2());
        let (lat0, lat1, lat2) = (lat0.to_radians(), lat1.to_radians(), lat2.to_radians());

        // Calcul des constantes de la projection
        let n1 = grande_normale(lat1, a, e2);
        let n2 = grande_normale(lat2, a, e2);

        let iso_lat1 = isometric_latitude(lat1, e);
        let iso_lat2 = isometric_latitude(lat2, e);
        let iso_lat0 = isometric_latitude(lat0, e);

        let n = if (lat1 - lat2).abs() < 1e-12 {
            lat1.sin()
        } else {
            ((n1 * lat1.cos()).ln() - (n2 * lat2.cos()).ln()) / (iso_lat2 - iso_lat1)
        };

        let c = (n1 * lat1.cos() / n) * (n * iso_lat1).exp();
        let r0 = c * (-n * iso_lat0).exp();

        Self {
            e,
            lon0: lon0.to_radians(),
            x0,
            y0,
            n,
            c,
            r0,
        }
    }

    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let iso_lat = isometric_latitude(geo.lat, self.e);
        let r = self.c * (-self.n * iso_lat).exp();
        let gamma = self.n * adjust_lon(geo.lon - self.lon0);
        let x = self.x0 + r * gamma.sin();
        let y = self.y0 + self.r0 - r * gamma.cos();
        (x, y)
    }

    pub fn inverse(&self, x: f64, y: f64) -> Geographic {
        // Coordonnées centrées
        let dx = x - self.x0;
        let dy = self.r0 - (y - self.y0);

        // Rayon et angle
        let sign = self.n.signum();
        let r = sign * dx.hypot(dy);
        let gamma = (sign * dx).atan2(sign * dy);

        // Latitude isométrique
        let iso_lat = -(r / self.c).ln() / self.n;

        // Latitude géographique
        let lat = latitude_from_isometric(iso_lat, self.e);

        // Longitude
        let lon = self.lon0 + gamma / self.n;

        Geographic::new(lon, lat)
    }
}
