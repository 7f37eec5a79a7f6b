//! Projection Transverse Mercator (dont UTM)
//!
//! Séries de Snyder (USGS PP 1395), précision millimétrique dans la zone utile
//! (quelques degrés autour du méridien central).

use geochain_core::Ellipsoid;

use super::{adjust_lon, Geographic};

#[derive(Debug, Clone, PartialEq)]
pub struct TransverseMercator {
    a: f64,
    e2: f64,
    ep2: f64,
    lon0: f64,
    k0: f64,
    x0: f64,
    y0: f64,
    /// Arc de méridien à la latitude d'origine
    m0: f64,
}

impl TransverseMercator {
    pub fn new(ellipsoid: Ellipsoid, lon0: f64, lat0: f64, k0: f64, x0: f64, y0: f64) -> Self {
        let a = ellipsoid.a();
        let e2 = ellipsoid.e2();
        Self {
            a,
            e2,
            ep2: ellipsoid.ep2(),
            lon0: lon0.to_radians(),
            k0,
            x0,
            y0,
            m0: meridian_arc(lat0.to_radians(), a, e2),
        }
    }

    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let (a, e2, ep2, k0) = (self.a, self.e2, self.ep2, self.k0);
        let (sin_lat, cos_lat) = geo.lat.sin_cos();
        let tan_lat = geo.lat.tan();

        let n = a / (1.0 - e2 * sin_lat.powi(2)).sqrt();
        let t = tan_lat.powi(2);
        let c = ep2 * cos_lat.powi(2);
        let aa = adjust_lon(geo.lon - self.lon0) * cos_lat;
        let m = meridian_arc(geo.lat, a, e2);

        let x = self.x0
            + k0 * n
                * (aa
                    + (1.0 - t + c) * aa.powi(3) / 6.0
                    + (5.0 - 18.0 * t + t.powi(2) + 72.0 * c - 58.0 * ep2) * aa.powi(5) / 120.0);
        let y = self.y0
            + k0 * (m - self.m0
                + n * tan_lat
                    * (aa.powi(2) / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c.powi(2)) * aa.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t.powi(2) + 600.0 * c - 330.0 * ep2) * aa.powi(6)
                            / 720.0));
        (x, y)
    }

    pub fn inverse(&self, x: f64, y: f64) -> Geographic {
        let (a, e2, ep2, k0) = (self.a, self.e2, self.ep2, self.k0);

        // Coordonnées réduites
        let x = x - self.x0;
        let y = y - self.y0;

        // Calcul du footprint latitude
        let m = self.m0 + y / k0;
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));

        // Coefficients pour la série
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        // Calculs intermédiaires
        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let n1 = a / (1.0 - e2 * sin_phi1.powi(2)).sqrt();
        let t1 = tan_phi1.powi(2);
        let c1 = ep2 * cos_phi1.powi(2);
        let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1.powi(2)).powf(1.5);
        let d = x / (n1 * k0);

        // Latitude
        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d.powi(2) / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4)
                        / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                        - 252.0 * ep2
                        - 3.0 * c1.powi(2))
                        * d.powi(6)
                        / 720.0);

        // Longitude
        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        Geographic::new(lon, lat)
    }
}

/// Longueur de l'arc de méridien depuis l'équateur
fn meridian_arc(lat: f64, a: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    a * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geochain_core::ProjectionMethod;

    fn utm(zone: u32, south: bool) -> TransverseMercator {
        match ProjectionMethod::utm(zone, south) {
            ProjectionMethod::TransverseMercator { lon0, lat0, k0, x0, y0 } => {
                TransverseMercator::new(Ellipsoid::WGS84, lon0, lat0, k0, x0, y0)
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_martinique() {
        // Fort-de-France approximativement, UTM Zone 20N: 708000, 1615000
        let (lon, lat) = utm(20, false).inverse(708000.0, 1615000.0).to_degrees();

        // Fort-de-France: -61.07°E, 14.60°N
        assert!((lon - (-61.07)).abs() < 0.2, "lon={}", lon);
        assert!((lat - 14.60).abs() < 0.2, "lat={}", lat);
    }

    #[test]
    fn test_reunion() {
        // Saint-Denis approximativement, UTM Zone 40S: 338000, 7691000
        let (lon, lat) = utm(40, true).inverse(338000.0, 7691000.0).to_degrees();

        // Saint-Denis: 55.45°E, -20.88°S
        assert!((lon - 55.45).abs() < 0.2, "lon={}", lon);
        assert!((lat - (-20.88)).abs() < 0.2, "lat={}", lat);
    }

    #[test]
    fn test_central_meridian() {
        let (x, y) = utm(31, false).forward(Geographic::from_degrees(3.0, 0.0));
        assert!((x - 500000.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_roundtrip() {
        let tm = utm(31, false);
        let (x, y) = tm.forward(Geographic::from_degrees(2.35, 48.85));
        assert!((x - 452000.0).abs() < 2000.0, "x={}", x);
        assert!((y - 5411000.0).abs() < 2000.0, "y={}", y);
        let (lon, lat) = tm.inverse(x, y).to_degrees();
        assert!((lon - 2.35).abs() < 1e-7, "lon={}", lon);
        assert!((lat - 48.85).abs() < 1e-7, "lat={}", lat);
    }
}
