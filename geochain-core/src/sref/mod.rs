//! Références spatiales
//!
//! Une [`SpatialReference`] se construit depuis un code EPSG, un WKT ou une chaîne de
//! paramètres `+proj`. Elle est immuable et partagée (`Arc`) entre curseurs et fils.
//!
//! Les codes du [`catalog`] sont résolus localement ; les autres ne sont acceptés que
//! si le moteur externe est disponible (feature `reproject` du crate `geochain`).

pub mod catalog;
pub mod ellipsoid;
pub mod params;
pub mod wkt;

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{GeometryError, Result};

pub use ellipsoid::Ellipsoid;
pub use params::{CoordinateSystemType, CrsDefinition, ProjectionMethod};

use params::ProjParams;

/// Tolérance de base : 1 mm
const BASE_TOLERANCE_M: f64 = 0.001;

#[derive(Debug)]
struct Inner {
    code: u32,
    text: String,
    wkt: Option<String>,
    proj4: Option<String>,
    definition: CrsDefinition,
    canonical: OnceLock<String>,
}

/// Système de référence de coordonnées
#[derive(Debug, Clone)]
pub struct SpatialReference {
    inner: Arc<Inner>,
}

impl SpatialReference {
    fn build(
        code: u32,
        text: String,
        wkt: Option<String>,
        proj4: Option<String>,
        definition: CrsDefinition,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                code,
                text,
                wkt,
                proj4,
                definition,
                canonical: OnceLock::new(),
            }),
        }
    }

    /// Depuis un code EPSG
    ///
    /// Sans catalogue local ni moteur externe, le code est refusé.
    pub fn from_code(code: i64) -> Result<Self> {
        let code = u32::try_from(code)
            .ok()
            .filter(|c| *c > 0)
            .ok_or_else(|| GeometryError::invalid_reference(format!("invalid code {code}")))?;
        let definition = match catalog::lookup(code) {
            Some(def) => def,
            None if cfg!(feature = "external-engine") => CrsDefinition {
                method: None,
                ellipsoid: Ellipsoid::WGS84,
                unit_to_meter: 1.0,
                kind: CoordinateSystemType::Unknown,
            },
            None => {
                return Err(GeometryError::invalid_reference(format!(
                    "EPSG:{code} is not in the built-in catalog"
                )))
            }
        };
        Ok(Self::build(
            code,
            code.to_string(),
            None,
            Some(format!("+init=epsg:{code}")),
            definition,
        ))
    }

    /// Depuis un texte WKT
    ///
    /// Une autorité EPSG de premier niveau en fin de texte donne le code ; sinon
    /// le CRS est personnalisé (code 0) et décrit par son WKT.
    pub fn from_wkt(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(GeometryError::invalid_reference("empty WKT"));
        }
        let code = wkt::epsg_code(text).unwrap_or(0);
        let definition = match (code, catalog::lookup(code)) {
            (c, Some(mut def)) if c > 0 => {
                // l'unité déclarée prime sur celle du catalogue
                if let Some(unit) = wkt::linear_unit(text) {
                    def.unit_to_meter = unit;
                }
                def
            }
            _ => {
                let kind = wkt::coordinate_system_type(text);
                if kind == CoordinateSystemType::Unknown && code == 0 {
                    tracing::warn!("WKT without recognised coordinate system keyword");
                }
                CrsDefinition {
                    method: (kind == CoordinateSystemType::Geographic)
                        .then_some(ProjectionMethod::LongLat),
                    ellipsoid: wkt::ellipsoid(text).unwrap_or_default(),
                    unit_to_meter: wkt::linear_unit(text).unwrap_or(1.0),
                    kind,
                }
            }
        };
        Ok(Self::build(code, text.to_string(), Some(text.to_string()), None, definition))
    }

    /// Depuis une chaîne de paramètres `+proj=...` ou `+init=epsg:<n>`
    pub fn from_proj4(text: &str) -> Result<Self> {
        let params = ProjParams::parse(text)?;
        if let Some(code) = params.init_code() {
            let resolved = Self::from_code(code as i64)?;
            return Ok(Self::build(
                code,
                text.to_string(),
                None,
                Some(text.to_string()),
                resolved.definition().clone(),
            ));
        }
        let definition = params.definition()?;
        Ok(Self::build(0, text.to_string(), None, Some(text.to_string()), definition))
    }

    /// Reconnaît un code (`4326`, `EPSG:4326`), une chaîne `+proj` ou un WKT
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(GeometryError::invalid_reference("empty reference"));
        }
        let code_part = trimmed
            .strip_prefix("EPSG:")
            .or_else(|| trimmed.strip_prefix("epsg:"))
            .unwrap_or(trimmed);
        if let Ok(code) = code_part.parse::<i64>() {
            return Self::from_code(code);
        }
        if trimmed.starts_with('+') {
            return Self::from_proj4(text);
        }
        Self::from_wkt(text)
    }

    /// WGS84 géographique (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::build(
            catalog::WGS84_CODE,
            catalog::WGS84_CODE.to_string(),
            None,
            Some(format!("+init=epsg:{}", catalog::WGS84_CODE)),
            CrsDefinition::geographic(Ellipsoid::WGS84),
        )
    }

    /// Lambert azimutal équivalent centré sur (lon0, lat0), ellipsoïde GRS80
    pub fn create_equal_area(lon0: f64, lat0: f64) -> Result<Self> {
        if !lon0.is_finite() || !lat0.is_finite() {
            return Err(GeometryError::invalid_argument(format!(
                "equal-area center ({lon0}, {lat0}) is not finite"
            )));
        }
        let text = format!(
            "+proj=laea +lat_0={lat0:.6} +lon_0={lon0:.6} +x_0=4321000 +y_0=3210000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs"
        );
        Self::from_proj4(&text)
    }

    /// Zone UTM WGS84 contenant (lon, lat)
    pub fn create_utm(lon: f64, lat: f64) -> Result<Self> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(GeometryError::invalid_argument(format!(
                "UTM location ({lon}, {lat}) is not finite"
            )));
        }
        let zone = ((lon + 180.0) / 6.0).ceil().clamp(1.0, 60.0) as i64;
        let base = if lat < 0.0 { 32700 } else { 32600 };
        Self::from_code(base + zone)
    }

    /// Code EPSG, 0 pour un CRS personnalisé
    pub fn code(&self) -> u32 {
        self.inner.code
    }

    pub fn wkt(&self) -> Option<&str> {
        self.inner.wkt.as_deref()
    }

    pub fn proj4(&self) -> Option<&str> {
        self.inner.proj4.as_deref()
    }

    /// Texte fourni par l'appelant, à l'octet près
    pub fn text(&self) -> &str {
        &self.inner.text
    }

    /// Forme canonique, calculée une seule fois
    pub fn canonical(&self) -> &str {
        self.inner.canonical.get_or_init(|| {
            if let Some(wkt) = &self.inner.wkt {
                wkt::canonical(wkt)
            } else if let Some(proj4) = &self.inner.proj4 {
                params::canonical_proj(proj4)
            } else {
                format!("EPSG:{}", self.inner.code)
            }
        })
    }

    pub fn definition(&self) -> &CrsDefinition {
        &self.inner.definition
    }

    pub fn coordinate_system_type(&self) -> CoordinateSystemType {
        self.inner.definition.kind
    }

    pub fn is_geographic(&self) -> bool {
        self.coordinate_system_type() == CoordinateSystemType::Geographic
    }

    /// Vrai pour les CRS géographiques ou projetés, les seuls utilisables en géodésie
    pub fn is_georeferenced(&self) -> bool {
        matches!(
            self.coordinate_system_type(),
            CoordinateSystemType::Geographic | CoordinateSystemType::Projected
        )
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.inner.definition.ellipsoid
    }

    pub fn unit_to_meter(&self) -> f64 {
        self.inner.definition.unit_to_meter
    }

    pub fn method(&self) -> Option<ProjectionMethod> {
        self.inner.definition.method
    }

    /// Distance en dessous de laquelle deux coordonnées sont confondues, dans
    /// l'unité du CRS
    pub fn tolerance(&self) -> f64 {
        match self.coordinate_system_type() {
            CoordinateSystemType::Geographic => {
                BASE_TOLERANCE_M / (self.ellipsoid().a() * std::f64::consts::PI / 180.0)
            }
            CoordinateSystemType::Projected | CoordinateSystemType::Local => {
                BASE_TOLERANCE_M / self.unit_to_meter()
            }
            CoordinateSystemType::Unknown => BASE_TOLERANCE_M,
        }
    }

    /// Définition transmise au moteur externe
    pub fn engine_definition(&self) -> String {
        if self.inner.code > 0 {
            format!("EPSG:{}", self.inner.code)
        } else if let Some(wkt) = &self.inner.wkt {
            wkt.clone()
        } else {
            self.inner.proj4.clone().unwrap_or_default()
        }
    }
}

impl PartialEq for SpatialReference {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        if self.code() != 0 && other.code() != 0 {
            return self.code() == other.code();
        }
        self.canonical() == other.canonical()
    }
}

impl Eq for SpatialReference {}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code() > 0 {
            write!(f, "EPSG:{}", self.code())
        } else {
            f.write_str(self.canonical())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_validation() {
        assert!(SpatialReference::from_code(0).is_err());
        assert!(SpatialReference::from_code(-4326).is_err());
        let sr = SpatialReference::from_code(4326).unwrap();
        assert!(sr.is_geographic());
        assert_eq!(sr.proj4(), Some("+init=epsg:4326"));
        assert_eq!(sr, SpatialReference::wgs84());
    }

    #[test]
    fn test_tolerances() {
        let geo = SpatialReference::wgs84();
        assert!((geo.tolerance() - 8.983152841195214e-9).abs() < 1e-18);
        let l93 = SpatialReference::from_code(2154).unwrap();
        assert_eq!(l93.tolerance(), 0.001);
        let ft = SpatialReference::from_code(2230).unwrap();
        assert!((ft.tolerance() - 0.0032808333).abs() < 1e-9);
    }

    #[test]
    fn test_equal_area_text() {
        let sr = SpatialReference::create_equal_area(-20.5, 45.25).unwrap();
        assert_eq!(
            sr.text(),
            "+proj=laea +lat_0=45.250000 +lon_0=-20.500000 +x_0=4321000 +y_0=3210000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs"
        );
        assert_eq!(sr.code(), 0);
        assert!(matches!(
            sr.method(),
            Some(ProjectionMethod::LambertAzimuthalEqualArea { lat0, .. }) if lat0 == 45.25
        ));
    }

    #[test]
    fn test_utm_zone_selection() {
        assert_eq!(SpatialReference::create_utm(2.35, 48.85).unwrap().code(), 32631);
        assert_eq!(SpatialReference::create_utm(-180.0, -10.0).unwrap().code(), 32701);
        assert_eq!(SpatialReference::create_utm(180.0, 10.0).unwrap().code(), 32660);
    }

    #[test]
    fn test_wkt_text_round_trips() {
        let text = "PROJCS[\"x\", GEOGCS[\"g\", DATUM[\"d\", SPHEROID[\"s\",6378137,298.257222101]]], UNIT[\"metre\",1]]";
        let sr = SpatialReference::from_wkt(text).unwrap();
        assert_eq!(sr.text(), text);
        assert_eq!(sr.code(), 0);
        assert_eq!(sr.coordinate_system_type(), CoordinateSystemType::Projected);
        let spaced = SpatialReference::from_wkt(&text.replace(", ", ",")).unwrap();
        assert_eq!(sr, spaced);
        assert!(SpatialReference::from_wkt("  ").is_err());
    }

    #[test]
    fn test_parse_dispatch() {
        assert_eq!(SpatialReference::parse("EPSG:3857").unwrap().code(), 3857);
        assert_eq!(SpatialReference::parse("2154").unwrap().code(), 2154);
        let proj = SpatialReference::parse("+proj=longlat +ellps=GRS80").unwrap();
        assert!(proj.is_geographic());
        assert_eq!(proj.code(), 0);
        assert_eq!(
            SpatialReference::parse("+init=epsg:32631").unwrap(),
            SpatialReference::from_code(32631).unwrap()
        );
    }
}
