//! Protocole de curseur : itération tirée, à passage unique
//!
//! Chaque opérateur enveloppe un curseur amont et expose lui-même un [`Cursor`].
//! `next()` renvoie `Ok(None)` en fin de séquence ; ce n'est pas une erreur.

use bytes::Bytes;
use geo::Rect;

use crate::error::Result;
use crate::geometry::{Geometry, SimpleState};
use crate::sref::SpatialReference;

/// Élément produit par un curseur, avec ses métadonnées
#[derive(Debug, Clone)]
pub struct Element<T> {
    pub payload: T,
    pub id: i64,
    pub feature_id: Option<String>,
    pub simple_state: SimpleState,
    pub envelope: Option<Rect>,
}

impl<T> Element<T> {
    pub fn new(payload: T, id: i64) -> Self {
        Self {
            payload,
            id,
            feature_id: None,
            simple_state: SimpleState::Unknown,
            envelope: None,
        }
    }

    pub fn with_feature_id(mut self, feature_id: impl Into<String>) -> Self {
        self.feature_id = Some(feature_id.into());
        self
    }

    pub fn with_envelope(mut self, envelope: Rect) -> Self {
        self.envelope = Some(envelope);
        self
    }

    /// Remplace la charge utile en gardant l'id et le feature id. L'état de
    /// simplicité et l'enveloppe ne sont pas reportés.
    pub fn replace<U>(self, payload: U) -> Element<U> {
        Element {
            payload,
            id: self.id,
            feature_id: self.feature_id,
            simple_state: SimpleState::Unknown,
            envelope: None,
        }
    }
}

impl Element<Geometry> {
    /// Élément géométrique ; l'état de simplicité suit celui de la géométrie
    pub fn geometry(geometry: Geometry, id: i64) -> Self {
        let simple_state = geometry.simple_state();
        Self {
            payload: geometry,
            id,
            feature_id: None,
            simple_state,
            envelope: None,
        }
    }

    /// Remplace la géométrie (opérateur 1:1) en propageant id et feature id
    pub fn with_geometry(self, geometry: Geometry) -> Self {
        let simple_state = geometry.simple_state();
        Element {
            simple_state,
            ..self.replace(geometry)
        }
    }
}

/// Géométrie accompagnée de sa référence spatiale
#[derive(Debug, Clone)]
pub struct CrsGeometry {
    pub geometry: Geometry,
    pub spatial_reference: SpatialReference,
}

/// Curseur à passage unique
pub trait Cursor {
    type Item;

    /// Vrai si un appel à `next()` peut encore produire un élément. Ne consomme rien.
    fn has_next(&self) -> bool;

    /// Avance d'un élément ; `Ok(None)` en fin de séquence
    fn next(&mut self) -> Result<Option<Element<Self::Item>>>;

    /// Adaptateur vers un [`Iterator`] de résultats
    fn elements(self) -> CursorIter<Self>
    where
        Self: Sized,
    {
        CursorIter { cursor: self }
    }
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    type Item = C::Item;

    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<Option<Element<Self::Item>>> {
        (**self).next()
    }
}

pub type GeometryCursor = Box<dyn Cursor<Item = Geometry>>;
pub type CrsGeometryCursor = Box<dyn Cursor<Item = CrsGeometry>>;
pub type ByteCursor = Box<dyn Cursor<Item = Bytes>>;
pub type StringCursor = Box<dyn Cursor<Item = String>>;

/// Itérateur sur un curseur ; s'arrête après la première erreur
pub struct CursorIter<C> {
    cursor: C,
}

impl<C: Cursor> Iterator for CursorIter<C> {
    type Item = Result<Element<C::Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next().transpose()
    }
}

/// Curseur feuille sur une séquence en mémoire
#[derive(Debug)]
pub struct SimpleCursor<T> {
    items: std::vec::IntoIter<Element<T>>,
}

impl<T> SimpleCursor<T> {
    /// Ids attribués de 0 à n-1
    pub fn new(payloads: Vec<T>) -> Self {
        let elements = payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| Element::new(payload, i as i64))
            .collect();
        Self::from_elements(elements)
    }

    pub fn from_elements(elements: Vec<Element<T>>) -> Self {
        Self {
            items: elements.into_iter(),
        }
    }
}

impl SimpleCursor<Geometry> {
    /// Curseur géométrique ; les états de simplicité en cache sont reportés
    pub fn from_geometries(geometries: Vec<Geometry>) -> Self {
        let elements = geometries
            .into_iter()
            .enumerate()
            .map(|(i, g)| Element::geometry(g, i as i64))
            .collect();
        Self::from_elements(elements)
    }
}

impl<T> Cursor for SimpleCursor<T> {
    type Item = T;

    fn has_next(&self) -> bool {
        self.items.len() > 0
    }

    fn next(&mut self) -> Result<Option<Element<T>>> {
        Ok(self.items.next())
    }
}

/// Vide un curseur et renvoie ses éléments
pub fn drain<C: Cursor + ?Sized>(cursor: &mut C) -> Result<Vec<Element<C::Item>>> {
    let mut out = Vec::new();
    while let Some(element) = cursor.next()? {
        out.push(element);
    }
    Ok(out)
}

/// Vide un curseur et renvoie uniquement les charges utiles
pub fn drain_payloads<C: Cursor + ?Sized>(cursor: &mut C) -> Result<Vec<C::Item>> {
    Ok(drain(cursor)?.into_iter().map(|e| e.payload).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_cursor_ids_and_end() {
        let mut cursor = SimpleCursor::new(vec!["a".to_string(), "b".to_string()]);
        assert!(cursor.has_next());
        let first = cursor.next().unwrap().unwrap();
        assert_eq!((first.id, first.payload.as_str()), (0, "a"));
        let second = cursor.next().unwrap().unwrap();
        assert_eq!(second.id, 1);
        assert!(!cursor.has_next());
        assert!(cursor.next().unwrap().is_none());
        assert!(cursor.next().unwrap().is_none());
    }

    #[test]
    fn test_has_next_does_not_consume() {
        let cursor = SimpleCursor::new(vec![1, 2, 3]);
        assert!(cursor.has_next());
        assert!(cursor.has_next());
        let all: Vec<i32> = cursor.elements().map(|e| e.unwrap().payload).collect();
        assert_eq!(all, vec![1, 2, 3]);
    }

    #[test]
    fn test_boxed_cursor_and_metadata() {
        let elements = vec![
            Element::geometry(Geometry::point(1.0, 2.0), 42).with_feature_id("parcel-7"),
        ];
        let mut cursor: GeometryCursor = Box::new(SimpleCursor::from_elements(elements));
        let element = cursor.next().unwrap().unwrap();
        assert_eq!(element.id, 42);
        assert_eq!(element.feature_id.as_deref(), Some("parcel-7"));

        let moved = element.with_geometry(Geometry::point(3.0, 4.0));
        assert_eq!(moved.id, 42);
        assert_eq!(moved.feature_id.as_deref(), Some("parcel-7"));
        assert_eq!(moved.payload, Geometry::point(3.0, 4.0));
    }

    #[test]
    fn test_drain_payloads() {
        let mut cursor = SimpleCursor::new(vec![Bytes::from_static(b"\x01"), Bytes::new()]);
        let payloads = drain_payloads(&mut cursor).unwrap();
        assert_eq!(payloads.len(), 2);
        assert!(!cursor.has_next());
    }
}
