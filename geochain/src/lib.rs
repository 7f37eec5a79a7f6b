//! # geochain
//!
//! Opérateurs géométriques enchaînables sur des curseurs de géométries.
//!
//! ## Fonctionnalités
//!
//! - Projection entre références spatiales, avec repli à l'antiméridien
//! - Zones tampon planaires et géodésiques
//! - Points aléatoires à densité équivalente en surface
//! - Cercle englobant minimal
//! - Longueur, problème inverse et densification géodésiques
//! - Généralisation par surface, enveloppe convexe, union
//! - Conversions WKT, WKB et GeoJSON
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geochain::{registry, Buffer, BufferParams, Cursor, SimpleCursor, SpatialReference};
//!
//! let sr = SpatialReference::from_code(2154)?;
//! let input = SimpleCursor::from_geometries(parcels);
//! let params = BufferParams::new(vec![5.0], registry().settings())?.with_union(true);
//! let mut merged = Buffer::local().execute_cursor(Box::new(input), Some(sr), params, None);
//! while let Some(element) = merged.next()? {
//!     println!("{}", element.payload.area());
//! }
//! ```
//!
//! La feature `reproject` délègue les couples de références hors du moteur intégré à
//! la bibliothèque PROJ.

pub mod buffer;
pub mod enclosing;
pub mod generalize;
pub mod geodesy;
pub mod operators;
pub mod projection;
pub mod sampling;
pub mod settings;

pub use enclosing::{minimum_enclosing_circle, Circle};
pub use generalize::GeneralizeType;
pub use geodesy::{Geodesy, InverseResult};
pub use operators::*;
pub use projection::{fold_into_360_range, project, project_owned, ProjectionTransformation};
pub use settings::Settings;

pub use geochain_core::{
    Cursor, Element, Geometry, GeometryCursor, GeometryError, GeometryType, Relation, Result,
    SimpleCursor, SpatialReference,
};
