//! Définition d'un CRS : méthode de projection, ellipsoïde et unité
//!
//! Lecture des chaînes de paramètres `+proj=... +lat_0=...`.

use std::collections::HashMap;

use super::ellipsoid::Ellipsoid;
use crate::error::{GeometryError, Result};

/// Type de système de coordonnées
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateSystemType {
    Geographic,
    Projected,
    Local,
    Unknown,
}

/// Méthodes de projection calculables sans moteur externe. Angles en degrés.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMethod {
    LongLat,
    WebMercator,
    Mercator {
        lon0: f64,
        k0: f64,
        x0: f64,
        y0: f64,
    },
    TransverseMercator {
        lon0: f64,
        lat0: f64,
        k0: f64,
        x0: f64,
        y0: f64,
    },
    LambertConformalConic {
        lon0: f64,
        lat0: f64,
        lat1: f64,
        lat2: f64,
        x0: f64,
        y0: f64,
    },
    LambertAzimuthalEqualArea {
        lon0: f64,
        lat0: f64,
        x0: f64,
        y0: f64,
    },
}

impl ProjectionMethod {
    /// UTM sur une zone (1..=60). Les faux est/nord sont en mètres.
    pub fn utm(zone: u32, south: bool) -> Self {
        Self::TransverseMercator {
            lon0: 6.0 * zone as f64 - 183.0,
            lat0: 0.0,
            k0: 0.9996,
            x0: 500_000.0,
            y0: if south { 10_000_000.0 } else { 0.0 },
        }
    }
}

/// Tout ce qu'il faut savoir d'un CRS pour le projeter et en dériver une tolérance
#[derive(Debug, Clone, PartialEq)]
pub struct CrsDefinition {
    /// `None` si la méthode n'est connue que du moteur externe
    pub method: Option<ProjectionMethod>,
    pub ellipsoid: Ellipsoid,
    /// Facteur de l'unité linéaire vers le mètre (faux est/nord inclus)
    pub unit_to_meter: f64,
    pub kind: CoordinateSystemType,
}

impl CrsDefinition {
    pub fn geographic(ellipsoid: Ellipsoid) -> Self {
        Self {
            method: Some(ProjectionMethod::LongLat),
            ellipsoid,
            unit_to_meter: 1.0,
            kind: CoordinateSystemType::Geographic,
        }
    }

    pub fn projected(method: ProjectionMethod, ellipsoid: Ellipsoid) -> Self {
        Self {
            method: Some(method),
            ellipsoid,
            unit_to_meter: 1.0,
            kind: CoordinateSystemType::Projected,
        }
    }

    pub fn with_unit(mut self, unit_to_meter: f64) -> Self {
        self.unit_to_meter = unit_to_meter;
        self
    }
}

/// Chaîne de paramètres découpée
#[derive(Debug, Default)]
pub(crate) struct ProjParams {
    values: HashMap<String, String>,
}

impl ProjParams {
    /// Chaque jeton doit commencer par `+`; les drapeaux sans valeur sont admis
    pub(crate) fn parse(text: &str) -> Result<Self> {
        let mut values = HashMap::new();
        for token in text.split_whitespace() {
            let Some(token) = token.strip_prefix('+') else {
                return Err(GeometryError::invalid_reference(format!(
                    "unexpected token '{token}' in parameter string"
                )));
            };
            let (key, value) = token.split_once('=').unwrap_or((token, ""));
            if key.is_empty() {
                return Err(GeometryError::invalid_reference("empty parameter name"));
            }
            values.insert(key.to_ascii_lowercase(), value.to_string());
        }
        Ok(Self { values })
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub(crate) fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn number(&self, key: &str) -> Result<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => parse_number(raw)
                .map(Some)
                .ok_or_else(|| GeometryError::invalid_reference(format!("+{key}={raw} is not a number"))),
        }
    }

    fn number_or(&self, key: &str, default: f64) -> Result<f64> {
        Ok(self.number(key)?.unwrap_or(default))
    }

    /// Code EPSG d'un `+init=epsg:<n>`
    pub(crate) fn init_code(&self) -> Option<u32> {
        let init = self.get("init")?;
        let (authority, code) = init.split_once(':')?;
        if !authority.eq_ignore_ascii_case("epsg") {
            return None;
        }
        code.trim().parse().ok()
    }

    fn ellipsoid(&self) -> Result<Ellipsoid> {
        if let Some(r) = self.number("r")? {
            return Ok(Ellipsoid::sphere(r));
        }
        if let Some(a) = self.number("a")? {
            if let Some(b) = self.number("b")? {
                return Ok(Ellipsoid::from_axes(a, b));
            }
            if let Some(rf) = self.number("rf")? {
                let f = if rf == 0.0 { 0.0 } else { 1.0 / rf };
                return Ok(Ellipsoid::new(a, f));
            }
            return Ok(Ellipsoid::sphere(a));
        }
        for key in ["ellps", "datum"] {
            if let Some(name) = self.get(key) {
                return Ellipsoid::from_name(name).ok_or_else(|| {
                    GeometryError::invalid_reference(format!("unknown {key} '{name}'"))
                });
            }
        }
        Ok(Ellipsoid::GRS80)
    }

    fn unit_to_meter(&self) -> Result<f64> {
        if let Some(factor) = self.number("to_meter")? {
            return Ok(factor);
        }
        match self.get("units") {
            None | Some("m") => Ok(1.0),
            Some("km") => Ok(1000.0),
            Some("ft") => Ok(0.3048),
            Some("us-ft") => Ok(1200.0 / 3937.0),
            Some(other) => Err(GeometryError::invalid_reference(format!(
                "unknown unit '{other}'"
            ))),
        }
    }

    /// Construit la définition ; les méthodes inconnues restent sans calcul local
    pub(crate) fn definition(&self) -> Result<CrsDefinition> {
        let Some(proj) = self.get("proj") else {
            return Err(GeometryError::invalid_reference(
                "parameter string has neither +proj nor +init",
            ));
        };
        let ellipsoid = self.ellipsoid()?;
        let unit = self.unit_to_meter()?;
        // faux est/nord exprimés dans l'unité du CRS
        let x0 = self.number_or("x_0", 0.0)? * unit;
        let y0 = self.number_or("y_0", 0.0)? * unit;
        let lon0 = self.number_or("lon_0", 0.0)?;
        let lat0 = self.number_or("lat_0", 0.0)?;
        let k0 = match self.number("k_0")? {
            Some(k) => k,
            None => self.number_or("k", 1.0)?,
        };

        let method = match proj {
            "longlat" | "latlong" | "lonlat" | "latlon" => {
                return Ok(CrsDefinition::geographic(ellipsoid));
            }
            "webmerc" => ProjectionMethod::WebMercator,
            "merc" => {
                // +a=+b=6378137 est la forme historique de Web Mercator
                if ellipsoid.is_sphere() && ellipsoid.a() == 6378137.0 {
                    ProjectionMethod::WebMercator
                } else {
                    ProjectionMethod::Mercator { lon0, k0, x0, y0 }
                }
            }
            "tmerc" => ProjectionMethod::TransverseMercator { lon0, lat0, k0, x0, y0 },
            "utm" => {
                let zone = self.number("zone")?.ok_or_else(|| {
                    GeometryError::invalid_reference("+proj=utm requires +zone")
                })?;
                if !(1.0..=60.0).contains(&zone) {
                    return Err(GeometryError::invalid_reference(format!(
                        "UTM zone {zone} outside 1..=60"
                    )));
                }
                ProjectionMethod::utm(zone as u32, self.has("south"))
            }
            "lcc" => {
                let lat1 = self.number_or("lat_1", lat0)?;
                let lat2 = self.number_or("lat_2", lat1)?;
                ProjectionMethod::LambertConformalConic { lon0, lat0, lat1, lat2, x0, y0 }
            }
            "laea" => ProjectionMethod::LambertAzimuthalEqualArea { lon0, lat0, x0, y0 },
            other => {
                tracing::debug!(method = other, "projection method without local implementation");
                return Ok(CrsDefinition {
                    method: None,
                    ellipsoid,
                    unit_to_meter: unit,
                    kind: CoordinateSystemType::Projected,
                });
            }
        };
        Ok(CrsDefinition::projected(method, ellipsoid).with_unit(unit))
    }
}

/// Nombre décimal, signe `+` toléré
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    fast_float::parse(s).ok()
}

/// Forme canonique d'une chaîne de paramètres : jetons triés, espaces normalisés
pub(crate) fn canonical_proj(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.dedup();
    tokens.join(" ")
}
