//! Types d'erreurs pour le crate geochain-core

use thiserror::Error;

/// Erreurs levées par les opérateurs géométriques
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Argument mal formé ou manquant
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Référence spatiale illisible
    #[error("Invalid spatial reference: {0}")]
    InvalidReference(String),

    /// L'opération a besoin d'une référence spatiale absente
    #[error("Spatial reference missing: {0}")]
    ReferenceMissing(String),

    /// Type de géométrie non géré par l'opérateur
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometryType(String),

    /// Taille de sortie au-delà des limites représentables
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Annulation coopérative signalée par le tracker
    #[error("Operation cancelled")]
    Cancelled,

    /// Aucun opérateur enregistré pour ce type
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Échec du moteur de projection
    #[error("Projection failed: {0}")]
    Projection(String),

    /// Échec d'encodage ou de décodage (WKT, WKB, GeoJSON)
    #[error("Codec error: {0}")]
    Codec(String),
}

impl GeometryError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    pub fn invalid_reference(reason: impl Into<String>) -> Self {
        Self::InvalidReference(reason.into())
    }

    pub fn reference_missing(reason: impl Into<String>) -> Self {
        Self::ReferenceMissing(reason.into())
    }

    pub fn unsupported_geometry(reason: impl Into<String>) -> Self {
        Self::UnsupportedGeometryType(reason.into())
    }

    pub fn projection(reason: impl Into<String>) -> Self {
        Self::Projection(reason.into())
    }

    pub fn codec(reason: impl Into<String>) -> Self {
        Self::Codec(reason.into())
    }

    /// Vrai si l'erreur provient d'une annulation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Résultat par défaut du crate
pub type Result<T, E = GeometryError> = std::result::Result<T, E>;
