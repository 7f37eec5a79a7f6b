//! Choix du moteur de coordonnées pour une paire de références
//!
//! Les méthodes compilables localement passent par [`LiteTransform`] ; les autres
//! sont confiées à PROJ quand la feature `reproject` est active, sinon refusées.

use geo::Coord;
use geochain_core::{GeometryError, Result, SpatialReference};

use super::lite::LiteTransform;

/// Moteur de transformation de coordonnées
#[derive(Debug, Clone)]
pub enum CoordinateEngine {
    /// Source et cible identiques : les coordonnées passent telles quelles
    Identity,
    /// Constantes précalculées des méthodes locales
    Lite(LiteTransform),
    /// Paire hors des méthodes locales
    #[cfg(feature = "reproject")]
    Proj(super::proj::ProjTransform),
}

impl CoordinateEngine {
    /// Sélectionne le moteur : identité, méthodes locales, puis PROJ
    pub fn new(from: &SpatialReference, to: &SpatialReference) -> Result<Self> {
        if from == to {
            return Ok(Self::Identity);
        }

        if let Some(lite) = LiteTransform::new(from.definition(), to.definition()) {
            tracing::debug!(from = %from, to = %to, "lite coordinate engine");
            return Ok(Self::Lite(lite));
        }

        #[cfg(feature = "reproject")]
        {
            let proj = super::proj::ProjTransform::new(from, to)?;
            tracing::debug!(from = %from, to = %to, "PROJ coordinate engine");
            return Ok(Self::Proj(proj));
        }

        // sans PROJ, une méthode non compilée localement est une erreur
        #[cfg(not(feature = "reproject"))]
        return Err(GeometryError::projection(format!(
            "transformation {} -> {} is not supported by the built-in engine; \
             build with the 'reproject' feature for other reference systems",
            from, to
        )));
    }

    /// Moteur inverse lorsqu'il se dérive sans recalcul
    pub fn reversed(&self) -> Option<Self> {
        match self {
            Self::Identity => Some(Self::Identity),
            Self::Lite(lite) => Some(Self::Lite(lite.reversed())),
            #[cfg(feature = "reproject")]
            Self::Proj(_) => None,
        }
    }

    /// Transforme un tableau de coordonnées sur place
    pub fn transform(&self, coords: &mut [Coord]) -> Result<()> {
        match self {
            Self::Identity => Ok(()),
            Self::Lite(lite) => lite.transform(coords),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform(coords),
        }
    }

    /// Nom du moteur retenu, pour les traces
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Lite(_) => "built-in",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sr(code: i64) -> SpatialReference {
        SpatialReference::from_code(code).unwrap()
    }

    #[test]
    fn test_same_reference_selects_identity() {
        let e = CoordinateEngine::new(&sr(4326), &SpatialReference::wgs84()).unwrap();
        assert!(matches!(e, CoordinateEngine::Identity));
    }

    #[test]
    fn test_catalogue_pair_selects_lite_and_reverses() {
        let e = CoordinateEngine::new(&sr(2154), &sr(4326)).unwrap();
        assert!(matches!(e, CoordinateEngine::Lite(_)));
        assert!(matches!(e.reversed(), Some(CoordinateEngine::Lite(_))));
    }

    #[test]
    fn test_conic_to_web_mercator_stays_local() {
        let e = CoordinateEngine::new(&sr(2154), &sr(3857)).unwrap();
        assert_eq!(e.description(), "built-in");
    }

    #[cfg(not(feature = "reproject"))]
    #[test]
    fn test_unsupported_method_without_proj() {
        let robinson = SpatialReference::from_proj4("+proj=robin +datum=WGS84").unwrap();
        let err = CoordinateEngine::new(&sr(4326), &robinson).unwrap_err();
        assert!(matches!(err, GeometryError::Projection(_)));
    }
}
