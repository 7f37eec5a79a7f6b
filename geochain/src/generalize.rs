//! Généralisation par aire (Visvalingam)
//!
//! Chaque chemin perd, un par un, le sommet dont le triangle formé avec ses deux voisins
//! a la plus petite aire. Le type de généralisation restreint les sommets éligibles
//! selon qu'ils sont saillants ou rentrants par rapport à l'intérieur de la surface.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo::{Coord, LineString, MultiLineString, MultiPolygon, Polygon};
use geochain_core::geometry::open_ring;
use geochain_core::simple::signed_ring_area;
use geochain_core::{Geometry, Shape};

/// Contrainte de la généralisation par rapport à la géométrie d'origine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneralizeType {
    /// Seuls les sommets rentrants sont retirés : le résultat contient l'origine
    ResultContainsOriginal,
    /// Seuls les sommets saillants sont retirés : le résultat est dans l'origine
    ResultWithinOriginal,
    #[default]
    Neither,
}

/// Candidat à la suppression ; le tas est un tas-min sur l'aire
#[derive(Debug, PartialEq)]
struct Candidate {
    area: f64,
    index: usize,
    generation: u32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .area
            .total_cmp(&self.area)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn cross(a: Coord, b: Coord, c: Coord) -> f64 {
    (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x)
}

/// Chemin en cours de réduction sous forme de liste doublement chaînée
struct Path<'a> {
    coords: &'a [Coord],
    prev: Vec<usize>,
    next: Vec<usize>,
    alive: Vec<bool>,
    generation: Vec<u32>,
    closed: bool,
    /// Signe de l'intérieur de la surface (0 pour une polyligne)
    interior_sign: f64,
    kind: GeneralizeType,
}

impl<'a> Path<'a> {
    fn new(coords: &'a [Coord], closed: bool, interior_sign: f64, kind: GeneralizeType) -> Self {
        let n = coords.len();
        Self {
            coords,
            prev: (0..n).map(|i| if i == 0 { n - 1 } else { i - 1 }).collect(),
            next: (0..n).map(|i| if i + 1 == n { 0 } else { i + 1 }).collect(),
            alive: vec![true; n],
            generation: vec![0; n],
            closed,
            interior_sign,
            kind,
        }
    }

    fn is_candidate(&self, i: usize) -> bool {
        if !self.closed && (i == 0 || i + 1 == self.coords.len()) {
            return false;
        }
        let turn = cross(
            self.coords[self.prev[i]],
            self.coords[i],
            self.coords[self.next[i]],
        ) * self.interior_sign;
        match self.kind {
            GeneralizeType::Neither => true,
            GeneralizeType::ResultContainsOriginal => turn <= 0.0,
            GeneralizeType::ResultWithinOriginal => turn >= 0.0,
        }
    }

    fn candidate(&self, i: usize) -> Option<Candidate> {
        if !self.is_candidate(i) {
            return None;
        }
        let area = cross(
            self.coords[self.prev[i]],
            self.coords[i],
            self.coords[self.next[i]],
        )
        .abs()
            / 2.0;
        Some(Candidate {
            area,
            index: i,
            generation: self.generation[i],
        })
    }

    /// Retire jusqu'à `count` sommets sans descendre sous `min_vertices`
    fn reduce(mut self, count: usize, min_vertices: usize) -> Vec<Coord> {
        let mut remaining = self.coords.len();
        let mut heap: BinaryHeap<Candidate> =
            (0..self.coords.len()).filter_map(|i| self.candidate(i)).collect();
        let mut removed = 0;
        while removed < count && remaining > min_vertices {
            let Some(top) = heap.pop() else {
                break;
            };
            if !self.alive[top.index] || self.generation[top.index] != top.generation {
                continue;
            }
            let (p, n) = (self.prev[top.index], self.next[top.index]);
            self.alive[top.index] = false;
            self.next[p] = n;
            self.prev[n] = p;
            remaining -= 1;
            removed += 1;
            for neighbour in [p, n] {
                self.generation[neighbour] += 1;
                if let Some(c) = self.candidate(neighbour) {
                    heap.push(c);
                }
            }
        }
        self.coords
            .iter()
            .zip(&self.alive)
            .filter(|(_, alive)| **alive)
            .map(|(c, _)| *c)
            .collect()
    }
}

fn removal_count(n: usize, percent_reduction: f64) -> usize {
    if percent_reduction <= 0.0 {
        return 0;
    }
    (n as f64 * percent_reduction.min(100.0) / 100.0).ceil() as usize
}

fn distinct_count(coords: &[Coord]) -> usize {
    let mut count = 0;
    for (i, c) in coords.iter().enumerate() {
        if !coords[..i].contains(c) {
            count += 1;
        }
    }
    count
}

/// Anneau réduit puis refermé ; `None` s'il dégénère et doit être retiré
fn generalize_ring(
    ring: &LineString,
    hole: bool,
    percent: f64,
    remove_degenerate: bool,
    kind: GeneralizeType,
) -> Option<LineString> {
    let open = open_ring(&ring.0);
    let area = signed_ring_area(open);
    let orientation = if area < 0.0 { -1.0 } else { 1.0 };
    let interior_sign = if hole { -orientation } else { orientation };
    let min_vertices = distinct_count(open).min(3);
    let mut coords = Path::new(open, true, interior_sign, kind)
        .reduce(removal_count(open.len(), percent), min_vertices);
    if remove_degenerate && (coords.len() < 3 || signed_ring_area(&coords) == 0.0) {
        return None;
    }
    if let Some(first) = coords.first().copied() {
        coords.push(first);
    }
    Some(LineString::new(coords))
}

fn generalize_line(
    line: &LineString,
    percent: f64,
    remove_degenerate: bool,
    kind: GeneralizeType,
) -> Option<LineString> {
    if line.0.len() < 3 {
        return (!remove_degenerate || (line.0.len() == 2 && line.0[0] != line.0[1]))
            .then(|| line.clone());
    }
    let coords = Path::new(&line.0, false, 0.0, kind).reduce(removal_count(line.0.len(), percent), 2);
    let collapsed = coords.windows(2).all(|w| w[0] == w[1]);
    if remove_degenerate && collapsed {
        return None;
    }
    Some(LineString::new(coords))
}

fn generalize_area(area: &MultiPolygon, percent: f64, remove_degenerate: bool, kind: GeneralizeType) -> MultiPolygon {
    let polygons = area
        .0
        .iter()
        .filter_map(|polygon| {
            let exterior = generalize_ring(polygon.exterior(), false, percent, remove_degenerate, kind)?;
            let holes = polygon
                .interiors()
                .iter()
                .filter_map(|h| generalize_ring(h, true, percent, remove_degenerate, kind))
                .collect();
            Some(Polygon::new(exterior, holes))
        })
        .collect();
    MultiPolygon::new(polygons)
}

/// Généralise `geometry` en retirant `percent_reduction` % des sommets de chaque chemin.
///
/// Points et multipoints sont rendus tels quels ; une enveloppe devient un polygone.
pub fn generalize(
    geometry: &Geometry,
    percent_reduction: f64,
    remove_degenerate_parts: bool,
    kind: GeneralizeType,
) -> Geometry {
    match geometry.shape() {
        Shape::Point(_) | Shape::MultiPoint(_) => geometry.clone(),
        Shape::Envelope(_) => generalize(
            &geometry.clone().envelope_as_polygon(),
            percent_reduction,
            remove_degenerate_parts,
            kind,
        ),
        Shape::Polyline(mls) => Geometry::from(MultiLineString::new(
            mls.0
                .iter()
                .filter_map(|l| generalize_line(l, percent_reduction, remove_degenerate_parts, kind))
                .collect(),
        )),
        Shape::Polygon(mp) => Geometry::from(generalize_area(
            mp,
            percent_reduction,
            remove_degenerate_parts,
            kind,
        )),
        Shape::Collection(members) => Geometry::collection(
            members
                .iter()
                .map(|m| generalize(m, percent_reduction, remove_degenerate_parts, kind))
                .collect(),
        ),
    }
}

/// Généralise jusqu'à environ `max_point_count` sommets au total
pub fn generalize_max_points(
    geometry: &Geometry,
    max_point_count: usize,
    remove_degenerate_parts: bool,
    kind: GeneralizeType,
) -> Geometry {
    let count = geometry.point_count();
    if count == 0 || max_point_count >= count {
        return generalize(geometry, 0.0, remove_degenerate_parts, kind);
    }
    let percent = 100.0 - 100.0 * max_point_count as f64 / count as f64;
    generalize(geometry, percent, remove_degenerate_parts, kind)
}
