//! # geochain-core
//!
//! Modèle de géométrie, protocole de curseur et références spatiales des opérateurs
//! `geochain`.
//!
//! ## Contenu
//!
//! - [`Geometry`] : formes `geo` avec un état de simplicité en cache
//! - [`Cursor`] : itération tirée sur des flux de géométries, d'octets ou de texte
//! - [`SpatialReference`] : CRS par code EPSG, WKT ou chaîne `+proj`, avec tolérance
//! - [`kernel`] : primitives planaires (union, découpage, relations DE-9IM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geochain_core::{Cursor, Geometry, SimpleCursor};
//!
//! let mut cursor = SimpleCursor::from_geometries(vec![Geometry::point(2.35, 48.85)]);
//! while let Some(element) = cursor.next()? {
//!     println!("{}: {}", element.id, element.payload.geometry_type());
//! }
//! ```

pub mod cursor;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod simple;
pub mod sref;
pub mod tracker;

pub use cursor::{
    ByteCursor, CrsGeometry, CrsGeometryCursor, Cursor, CursorIter, Element, GeometryCursor,
    SimpleCursor, StringCursor,
};
pub use error::{GeometryError, Result};
pub use geometry::{Geometry, GeometryType, Shape, SimpleState};
pub use kernel::Relation;
pub use sref::{CoordinateSystemType, Ellipsoid, ProjectionMethod, SpatialReference};
pub use tracker::{CancellationFlag, ProgressTracker, Tracker};

/// Réexport des types `geo` utilisés dans l'API publique
pub use geo;
