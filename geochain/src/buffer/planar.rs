//! Zone tampon planaire

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use geochain_core::kernel::{empty_area, union_all};
use geochain_core::{Geometry, Shape};

use super::vertices_per_circle;

/// Paramètres de discrétisation des arcs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcDiscretization {
    pub max_deviation: Option<f64>,
    pub max_vertices_in_full_circle: usize,
}

impl ArcDiscretization {
    pub fn vertices(&self, radius: f64) -> usize {
        vertices_per_circle(radius, self.max_deviation, self.max_vertices_in_full_circle)
    }
}

/// Anneau fermé anti-horaire inscrit dans le cercle
pub fn circle_ring(center: Coord, radius: f64, vertices: usize) -> Vec<Coord> {
    let mut ring: Vec<Coord> = (0..vertices)
        .map(|i| {
            let angle = TAU * i as f64 / vertices as f64;
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect();
    ring.push(ring[0]);
    ring
}

pub fn circle(center: Coord, radius: f64, vertices: usize) -> MultiPolygon {
    MultiPolygon::new(vec![Polygon::new(
        LineString::new(circle_ring(center, radius, vertices)),
        vec![],
    )])
}

/// Capsule (stade) autour du segment [a, b] ; un segment nul donne un disque
pub fn capsule(a: Coord, b: Coord, radius: f64, vertices: usize) -> MultiPolygon {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    if dx == 0.0 && dy == 0.0 {
        return circle(a, radius, vertices);
    }
    let theta = dy.atan2(dx);
    let half = (vertices / 2).max(2);
    let mut ring = Vec::with_capacity(2 * half + 3);
    // demi-cercle autour de b, de la droite vers la gauche
    for i in 0..=half {
        let angle = theta - FRAC_PI_2 + PI * i as f64 / half as f64;
        ring.push(Coord {
            x: b.x + radius * angle.cos(),
            y: b.y + radius * angle.sin(),
        });
    }
    // demi-cercle autour de a, de la gauche vers la droite
    for i in 0..=half {
        let angle = theta + FRAC_PI_2 + PI * i as f64 / half as f64;
        ring.push(Coord {
            x: a.x + radius * angle.cos(),
            y: a.y + radius * angle.sin(),
        });
    }
    ring.push(ring[0]);
    MultiPolygon::new(vec![Polygon::new(LineString::new(ring), vec![])])
}

/// Capsules de tous les segments d'un chemin ; un chemin d'un seul sommet donne un disque
fn path_parts(path: &[Coord], radius: f64, vertices: usize, out: &mut Vec<MultiPolygon>) {
    match path {
        [] => {}
        [single] => out.push(circle(*single, radius, vertices)),
        _ => out.extend(path.windows(2).map(|w| capsule(w[0], w[1], radius, vertices))),
    }
}

fn ring_parts(area: &MultiPolygon, radius: f64, vertices: usize) -> Vec<MultiPolygon> {
    let mut parts = Vec::new();
    for polygon in &area.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            path_parts(&ring.0, radius, vertices, &mut parts);
        }
    }
    parts
}

/// Zone tampon planaire d'une géométrie.
///
/// `distance == 0` rend la surface d'origine (une enveloppe devient un polygone) et
/// une surface vide pour les points et les lignes. Une distance négative érode les
/// surfaces et rend une surface vide pour les autres types.
pub fn buffer(geometry: &Geometry, distance: f64, arcs: ArcDiscretization) -> MultiPolygon {
    if geometry.is_empty() {
        return empty_area();
    }
    if distance == 0.0 {
        return geometry.to_multi_polygon().unwrap_or_else(empty_area);
    }
    let radius = distance.abs();
    let vertices = arcs.vertices(radius);

    if distance < 0.0 {
        let Some(area) = geometry.to_multi_polygon() else {
            return empty_area();
        };
        let boundary = union_all(ring_parts(&area, radius, vertices));
        return area.difference(&boundary);
    }

    match geometry.shape() {
        Shape::Point(p) => circle(p.0, radius, vertices),
        Shape::MultiPoint(mp) => {
            union_all(mp.0.iter().map(|p| circle(p.0, radius, vertices)).collect())
        }
        Shape::Polyline(mls) => {
            let mut parts = Vec::new();
            for line in &mls.0 {
                path_parts(&line.0, radius, vertices, &mut parts);
            }
            union_all(parts)
        }
        Shape::Polygon(_) | Shape::Envelope(_) => {
            let area = geometry.to_multi_polygon().unwrap_or_else(empty_area);
            let mut parts = ring_parts(&area, radius, vertices);
            parts.push(area);
            union_all(parts)
        }
        Shape::Collection(members) => union_all(
            members
                .iter()
                .map(|member| buffer(member, distance, arcs))
                .collect(),
        ),
    }
}
