//! Lecture minimale des WKT de CRS
//!
//! On n'analyse pas la grammaire complète : seuls le code d'autorité final, le type de
//! système, le sphéroïde et la dernière unité linéaire sont extraits.

use std::sync::OnceLock;

use regex::Regex;

use super::ellipsoid::Ellipsoid;
use super::params::{parse_number, CoordinateSystemType};

fn authority_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^[\w\W]+AUTHORITY\s*\[\s*"EPSG"\s*,\s*"*(\d+)"*\s*\]\s*\][\s\]]*$"#,
        )
        .expect("valid authority regex")
    })
}

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^[\w\W]+ID\s*\[\s*"EPSG"\s*,\s*"*(\d+)"*\s*\]\s*\][\s\]]*$"#)
            .expect("valid id regex")
    })
}

fn spheroid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:SPHEROID|ELLIPSOID)\s*\[\s*"[^"]*"\s*,\s*([-+\d.eE]+)\s*,\s*([-+\d.eE]+)"#)
            .expect("valid spheroid regex")
    })
}

fn unit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:UNIT|LENGTHUNIT)\s*\[\s*"([^"]*)"\s*,\s*([-+\d.eE]+)"#)
            .expect("valid unit regex")
    })
}

/// Code EPSG porté par l'autorité de premier niveau, en fin de texte
pub fn epsg_code(wkt: &str) -> Option<u32> {
    let caps = authority_regex()
        .captures(wkt)
        .or_else(|| id_regex().captures(wkt))?;
    caps.get(1)?.as_str().parse().ok().filter(|code| *code > 0)
}

/// Type de système d'après le mot-clé de tête
pub fn coordinate_system_type(wkt: &str) -> CoordinateSystemType {
    let head = wkt.trim_start().to_ascii_uppercase();
    if head.starts_with("PROJCS") || head.starts_with("PROJCRS") {
        CoordinateSystemType::Projected
    } else if head.starts_with("GEOGCS")
        || head.starts_with("GEOGCRS")
        || head.starts_with("GEODCRS")
    {
        CoordinateSystemType::Geographic
    } else if head.starts_with("LOCAL_CS") || head.starts_with("ENGCRS") {
        CoordinateSystemType::Local
    } else {
        CoordinateSystemType::Unknown
    }
}

/// Premier sphéroïde du texte ; un aplatissement inverse nul désigne une sphère
pub fn ellipsoid(wkt: &str) -> Option<Ellipsoid> {
    let caps = spheroid_regex().captures(wkt)?;
    let a = parse_number(caps.get(1)?.as_str())?;
    let rf = parse_number(caps.get(2)?.as_str())?;
    if rf == 0.0 {
        Some(Ellipsoid::sphere(a))
    } else {
        Some(Ellipsoid::new(a, 1.0 / rf))
    }
}

/// Facteur vers le mètre de la dernière unité linéaire. Les unités angulaires
/// (degree, grad, radian) sont ignorées.
pub fn linear_unit(wkt: &str) -> Option<f64> {
    unit_regex()
        .captures_iter(wkt)
        .filter(|caps| {
            let name = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
            !matches!(name.as_deref(), Some(n) if n.contains("degree") || n.contains("grad") || n.contains("radian"))
        })
        .filter_map(|caps| parse_number(caps.get(2)?.as_str()))
        .last()
}

/// Forme canonique : espaces hors chaînes supprimés
pub fn canonical(wkt: &str) -> String {
    let mut out = String::with_capacity(wkt.len());
    let mut in_string = false;
    for c in wkt.chars() {
        if c == '"' {
            in_string = !in_string;
        }
        if in_string || !c.is_whitespace() {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const WGS84: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4326"]]"#;

    #[test]
    fn test_epsg_from_trailing_authority() {
        assert_eq!(epsg_code(WGS84), Some(4326));
        assert_eq!(epsg_code(&format!("{WGS84}  \n")), Some(4326));
    }

    #[test]
    fn test_custom_wkt_without_code() {
        let wkt = r#"PROJCS["custom",GEOGCS["g",DATUM["d",SPHEROID["s",6378137,298.257222101]]],PROJECTION["Lambert_Conformal_Conic_2SP"],UNIT["US survey foot",0.3048006096012192]]"#;
        assert_eq!(epsg_code(wkt), None);
        assert_eq!(coordinate_system_type(wkt), CoordinateSystemType::Projected);
        assert_eq!(ellipsoid(wkt), Some(Ellipsoid::GRS80));
        assert!((linear_unit(wkt).unwrap() - 0.3048006096012192).abs() < 1e-15);
    }

    #[test]
    fn test_sphere_and_local() {
        let wkt = r#"LOCAL_CS["site",LOCAL_DATUM["x",0],UNIT["Meter",1]]"#;
        assert_eq!(coordinate_system_type(wkt), CoordinateSystemType::Local);
        assert_eq!(linear_unit(wkt), Some(1.0));
        let sphere = r#"GEOGCS["s",DATUM["d",SPHEROID["sphere",6371000,0]]]"#;
        assert!(ellipsoid(sphere).unwrap().is_sphere());
        assert_eq!(linear_unit(WGS84), None);
    }

    #[test]
    fn test_canonical_keeps_quoted_spaces() {
        assert_eq!(
            canonical("GEOGCS[ \"WGS 84\" ,\n DATUM[\"x\"]]"),
            "GEOGCS[\"WGS 84\",DATUM[\"x\"]]"
        );
    }
}
