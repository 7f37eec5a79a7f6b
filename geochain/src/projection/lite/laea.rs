//! Projection azimutale équivalente de Lambert
//!
//! Aspects oblique, équatorial et polaires, sur ellipsoïde ou sphère. C'est le repère
//! local des calculs d'aire (points aléatoires, cercle englobant).

use std::f64::consts::FRAC_PI_2;

use geochain_core::Ellipsoid;

use super::{adjust_lon, Geographic};

const EPS: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
enum Aspect {
    North,
    South,
    Oblique {
        sin_b1: f64,
        cos_b1: f64,
        /// Facteur d'ajustement D
        d: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambertAzimuthal {
    a: f64,
    e: f64,
    e2: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
    /// q au pôle
    qp: f64,
    /// Rayon authalique
    rq: f64,
    aspect: Aspect,
}

impl LambertAzimuthal {
    pub fn new(ellipsoid: Ellipsoid, lon0: f64, lat0: f64, x0: f64, y0: f64) -> Self {
        let (a, e, e2) = (ellipsoid.a(), ellipsoid.e(), ellipsoid.e2());
        let lat0 = lat0.to_radians();
        let qp = authalic_q(FRAC_PI_2, e, e2);
        let rq = a * (qp / 2.0).sqrt();

        let aspect = if (lat0 - FRAC_PI_2).abs() < EPS {
            Aspect::North
        } else if (lat0 + FRAC_PI_2).abs() < EPS {
            Aspect::South
        } else {
            let b1 = (authalic_q(lat0, e, e2) / qp).clamp(-1.0, 1.0).asin();
            let m1 = lat0.cos() / (1.0 - e2 * lat0.sin().powi(2)).sqrt();
            Aspect::Oblique {
                sin_b1: b1.sin(),
                cos_b1: b1.cos(),
                d: a * m1 / (rq * b1.cos()),
            }
        };

        Self {
            a,
            e,
            e2,
            lon0: lon0.to_radians(),
            x0,
            y0,
            qp,
            rq,
            aspect,
        }
    }

    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let dlon = adjust_lon(geo.lon - self.lon0);
        let q = authalic_q(geo.lat, self.e, self.e2);
        let (x, y) = match self.aspect {
            Aspect::North => {
                let rho = self.a * (self.qp - q).max(0.0).sqrt();
                (rho * dlon.sin(), -rho * dlon.cos())
            }
            Aspect::South => {
                let rho = self.a * (self.qp + q).max(0.0).sqrt();
                (rho * dlon.sin(), rho * dlon.cos())
            }
            Aspect::Oblique { sin_b1, cos_b1, d } => {
                let beta = (q / self.qp).clamp(-1.0, 1.0).asin();
                let (sin_b, cos_b) = beta.sin_cos();
                let denom = 1.0 + sin_b1 * sin_b + cos_b1 * cos_b * dlon.cos();
                // point antipodal : limite de la projection
                let b = if denom <= EPS {
                    2.0 * self.rq
                } else {
                    self.rq * (2.0 / denom).sqrt()
                };
                (
                    b * d * cos_b * dlon.sin(),
                    (b / d) * (cos_b1 * sin_b - sin_b1 * cos_b * dlon.cos()),
                )
            }
        };
        (self.x0 + x, self.y0 + y)
    }

    pub fn inverse(&self, x: f64, y: f64) -> Geographic {
        let (x, y) = (x - self.x0, y - self.y0);
        let (q, lon) = match self.aspect {
            Aspect::North => {
                let rho2 = (x * x + y * y) / (self.a * self.a);
                (self.qp - rho2, self.lon0 + x.atan2(-y))
            }
            Aspect::South => {
                let rho2 = (x * x + y * y) / (self.a * self.a);
                (rho2 - self.qp, self.lon0 + x.atan2(y))
            }
            Aspect::Oblique { sin_b1, cos_b1, d } => {
                let rho = (x / d).hypot(d * y);
                if rho < EPS {
                    let q = sin_b1 * self.qp;
                    return Geographic::new(self.lon0, latitude_from_q(q, self.e, self.e2, self.qp));
                }
                let ce = 2.0 * (rho / (2.0 * self.rq)).clamp(-1.0, 1.0).asin();
                let (sin_ce, cos_ce) = ce.sin_cos();
                let q = self.qp * (cos_ce * sin_b1 + d * y * sin_ce * cos_b1 / rho);
                let lon = self.lon0
                    + (x * sin_ce).atan2(d * rho * cos_b1 * cos_ce - d * d * y * sin_b1 * sin_ce);
                (q, lon)
            }
        };
        Geographic::new(lon, latitude_from_q(q, self.e, self.e2, self.qp))
    }
}

/// Fonction q de Snyder (proportionnelle au sinus de la latitude authalique)
fn authalic_q(lat: f64, e: f64, e2: f64) -> f64 {
    let sin_lat = lat.sin();
    if e < 1e-12 {
        return 2.0 * sin_lat;
    }
    let esin = e * sin_lat;
    (1.0 - e2) * (sin_lat / (1.0 - esin * esin) - (1.0 / (2.0 * e)) * ((1.0 - esin) / (1.0 + esin)).ln())
}

/// Latitude depuis q (itératif)
fn latitude_from_q(q: f64, e: f64, e2: f64, qp: f64) -> f64 {
    let q = q.clamp(-qp, qp);
    if e < 1e-12 {
        return (q / 2.0).clamp(-1.0, 1.0).asin();
    }
    if (q.abs() - qp).abs() < 1e-12 {
        return FRAC_PI_2.copysign(q);
    }
    let mut lat = (q / 2.0).clamp(-1.0, 1.0).asin();
    for _ in 0..20 {
        let (sin_lat, cos_lat) = lat.sin_cos();
        let esin = e * sin_lat;
        let one = 1.0 - esin * esin;
        let delta = one * one / (2.0 * cos_lat)
            * (q / (1.0 - e2) - sin_lat / one + (1.0 / (2.0 * e)) * ((1.0 - esin) / (1.0 + esin)).ln());
        lat += delta;
        if delta.abs() < 1e-13 {
            break;
        }
    }
    lat
}

#[cfg(test)]
mod tests {
    use super::*;

    fn europe() -> LambertAzimuthal {
        LambertAzimuthal::new(Ellipsoid::GRS80, 10.0, 52.0, 4321000.0, 3210000.0)
    }

    #[test]
    fn test_center_maps_to_false_origin() {
        let (x, y) = europe().forward(Geographic::from_degrees(10.0, 52.0));
        assert!((x - 4321000.0).abs() < 1e-6);
        assert!((y - 3210000.0).abs() < 1e-6);
        let (lon, lat) = europe().inverse(4321000.0, 3210000.0).to_degrees();
        assert!((lon - 10.0).abs() < 1e-9 && (lat - 52.0).abs() < 1e-9);
    }

    #[test]
    fn test_ellipsoidal_roundtrip() {
        let p = europe();
        for (lon, lat) in [(2.35, 48.85), (-20.0, 30.0), (40.0, 70.0), (10.0, 10.0)] {
            let (x, y) = p.forward(Geographic::from_degrees(lon, lat));
            let (lon2, lat2) = p.inverse(x, y).to_degrees();
            assert!((lon - lon2).abs() < 1e-9, "lon {} -> {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat {} -> {}", lat, lat2);
        }
    }

    #[test]
    fn test_spherical_national_atlas() {
        let p = LambertAzimuthal::new(Ellipsoid::sphere(6370997.0), -100.0, 45.0, 0.0, 0.0);
        let (x, y) = p.forward(Geographic::from_degrees(-100.0, 45.0));
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
        let (x, y) = p.forward(Geographic::from_degrees(-75.0, 40.0));
        let (lon, lat) = p.inverse(x, y).to_degrees();
        assert!((lon + 75.0).abs() < 1e-9 && (lat - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_polar_roundtrip() {
        let p = LambertAzimuthal::new(Ellipsoid::WGS84, 0.0, 90.0, 0.0, 0.0);
        let (x, y) = p.forward(Geographic::from_degrees(45.0, 80.0));
        let (lon, lat) = p.inverse(x, y).to_degrees();
        assert!((lon - 45.0).abs() < 1e-9 && (lat - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_equal_area_scale() {
        // Un carré de 0.01° autour du centre a la même aire que sur l'ellipsoïde :
        // à l'origine l'échelle est isotrope et vaut 1
        let p = europe();
        let (x0, y0) = p.forward(Geographic::from_degrees(10.0, 52.0));
        let (x1, _) = p.forward(Geographic::from_degrees(10.001, 52.0));
        let (_, y1) = p.forward(Geographic::from_degrees(10.0, 52.001));
        let dx = x1 - x0;
        let dy = y1 - y0;
        let e = Ellipsoid::GRS80;
        let lat = 52.0_f64.to_radians();
        let w = 1.0 - e.e2() * lat.sin().powi(2);
        let n = e.a() / w.sqrt();
        let m = e.a() * (1.0 - e.e2()) / w.powf(1.5);
        let expected_dx = n * lat.cos() * 0.001_f64.to_radians();
        let expected_dy = m * 0.001_f64.to_radians();
        assert!((dx / expected_dx - 1.0).abs() < 1e-4, "dx={}", dx);
        assert!((dy / expected_dy - 1.0).abs() < 1e-4, "dy={}", dy);
    }
}
