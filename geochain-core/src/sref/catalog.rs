//! Catalogue des codes EPSG résolus sans moteur externe

use super::ellipsoid::Ellipsoid;
use super::params::{CrsDefinition, ProjectionMethod};

/// Code EPSG de WGS84 géographique
pub const WGS84_CODE: u32 = 4326;

/// Mètres par pied US
const US_FOOT: f64 = 1200.0 / 3937.0;

/// Définition d'un code connu, `None` sinon
pub fn lookup(code: u32) -> Option<CrsDefinition> {
    let def = match code {
        4326 => CrsDefinition::geographic(Ellipsoid::WGS84),
        // NAD83, ETRS89, RGF93, GDA94, NAD83(CSRS)
        4269 | 4258 | 4171 | 4283 | 4617 => CrsDefinition::geographic(Ellipsoid::GRS80),
        3857 | 900913 | 102100 => {
            CrsDefinition::projected(ProjectionMethod::WebMercator, Ellipsoid::WGS84)
        }
        32601..=32660 => {
            CrsDefinition::projected(ProjectionMethod::utm(code - 32600, false), Ellipsoid::WGS84)
        }
        32701..=32760 => {
            CrsDefinition::projected(ProjectionMethod::utm(code - 32700, true), Ellipsoid::WGS84)
        }
        // Lambert 93
        2154 => CrsDefinition::projected(
            ProjectionMethod::LambertConformalConic {
                lon0: 3.0,
                lat0: 46.5,
                lat1: 44.0,
                lat2: 49.0,
                x0: 700_000.0,
                y0: 6_600_000.0,
            },
            Ellipsoid::GRS80,
        ),
        // RGF93 / CC42 à CC50
        3942..=3950 => {
            let zone = (code - 3900) as f64;
            CrsDefinition::projected(
                ProjectionMethod::LambertConformalConic {
                    lon0: 3.0,
                    lat0: zone,
                    lat1: zone - 0.75,
                    lat2: zone + 0.75,
                    x0: 1_700_000.0,
                    y0: 2_200_000.0 + (zone - 42.0) * 1_000_000.0,
                },
                Ellipsoid::GRS80,
            )
        }
        // NAD83 / California zone 6 (ftUS)
        2230 => CrsDefinition::projected(
            ProjectionMethod::LambertConformalConic {
                lon0: -116.25,
                lat0: 32.0 + 10.0 / 60.0,
                lat1: 33.0 + 53.0 / 60.0,
                lat2: 32.0 + 47.0 / 60.0,
                x0: 6_561_666.667 * US_FOOT,
                y0: 1_640_416.667 * US_FOOT,
            },
            Ellipsoid::GRS80,
        )
        .with_unit(US_FOOT),
        // ETRS89-extended / LAEA Europe
        3035 => CrsDefinition::projected(
            ProjectionMethod::LambertAzimuthalEqualArea {
                lon0: 10.0,
                lat0: 52.0,
                x0: 4_321_000.0,
                y0: 3_210_000.0,
            },
            Ellipsoid::GRS80,
        ),
        // US National Atlas Equal Area
        2163 => CrsDefinition::projected(
            ProjectionMethod::LambertAzimuthalEqualArea {
                lon0: -100.0,
                lat0: 45.0,
                x0: 0.0,
                y0: 0.0,
            },
            Ellipsoid::sphere(6_370_997.0),
        ),
        _ => return None,
    };
    Some(def)
}

/// Nom lisible des codes du catalogue, pour les WKT générés
pub fn name(code: u32) -> Option<&'static str> {
    let name = match code {
        4326 => "WGS 84",
        4269 => "NAD83",
        4258 => "ETRS89",
        4171 => "RGF93",
        4283 => "GDA94",
        4617 => "NAD83(CSRS)",
        3857 | 900913 | 102100 => "WGS 84 / Pseudo-Mercator",
        32601..=32660 => "WGS 84 / UTM north",
        32701..=32760 => "WGS 84 / UTM south",
        2154 => "RGF93 / Lambert-93",
        3942..=3950 => "RGF93 / CC",
        2230 => "NAD83 / California zone 6 (ftUS)",
        3035 => "ETRS89 / LAEA Europe",
        2163 => "US National Atlas Equal Area",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sref::params::CoordinateSystemType;

    #[test]
    fn test_utm_zones() {
        let def = lookup(32631).unwrap();
        assert_eq!(def.method, Some(ProjectionMethod::utm(31, false)));
        let south = lookup(32760).unwrap();
        assert_eq!(south.method, Some(ProjectionMethod::utm(60, true)));
        assert!(lookup(32661).is_none());
    }

    #[test]
    fn test_cc_zones() {
        match lookup(3946).unwrap().method {
            Some(ProjectionMethod::LambertConformalConic { lat0, lat1, lat2, y0, .. }) => {
                assert_eq!(lat0, 46.0);
                assert_eq!(lat1, 45.25);
                assert_eq!(lat2, 46.75);
                assert_eq!(y0, 6_200_000.0);
            }
            other => panic!("unexpected method {other:?}"),
        }
    }

    #[test]
    fn test_kinds() {
        assert_eq!(lookup(4326).unwrap().kind, CoordinateSystemType::Geographic);
        assert_eq!(lookup(2230).unwrap().kind, CoordinateSystemType::Projected);
        assert!(lookup(2230).unwrap().unit_to_meter < 0.31);
        assert!(lookup(27700).is_none());
        assert_eq!(name(2154), Some("RGF93 / Lambert-93"));
    }
}
