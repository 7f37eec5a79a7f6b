//! Classification de simplicité topologique
//!
//! Contrôles inspirés des validations de ring : fermeture, segments dégénérés,
//! sommets agglutinés, croisements et orientation des anneaux.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Intersects, Line, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

use crate::geometry::{open_ring, Geometry, Shape, SimpleState};

impl Geometry {
    /// Exécute le contrôle de simplicité et met l'état en cache
    pub fn check_simple(&mut self, tolerance: f64) -> SimpleState {
        let state = classify(self, tolerance);
        self.set_simple_state(state);
        state
    }
}

/// Classe une géométrie sans modifier son état en cache
pub fn classify(geometry: &Geometry, tolerance: f64) -> SimpleState {
    if geometry.is_empty() {
        return SimpleState::StrongSimple;
    }
    match geometry.shape() {
        Shape::Point(_) | Shape::Envelope(_) => SimpleState::StrongSimple,
        Shape::MultiPoint(mp) => classify_multi_point(mp, tolerance),
        Shape::Polyline(mls) => classify_polyline(mls, tolerance),
        Shape::Polygon(mp) => classify_polygon(mp, tolerance),
        Shape::Collection(members) => {
            let mut weak = false;
            for member in members {
                match classify(member, tolerance) {
                    SimpleState::StrongSimple => {}
                    SimpleState::WeakSimple => weak = true,
                    other => return other,
                }
            }
            if weak {
                SimpleState::WeakSimple
            } else {
                SimpleState::StrongSimple
            }
        }
    }
}

fn classify_multi_point(mp: &MultiPoint, tolerance: f64) -> SimpleState {
    let coords: Vec<Coord> = mp.0.iter().map(|p| p.0).collect();
    if has_clustered_pair(&coords, tolerance, |_, _| false) {
        SimpleState::Clustering
    } else {
        SimpleState::StrongSimple
    }
}

fn classify_polyline(mls: &MultiLineString, tolerance: f64) -> SimpleState {
    let mut segments = Vec::new();
    for (path, ls) in mls.0.iter().enumerate() {
        if ls.0.len() < 2 {
            return SimpleState::StructureFlaw;
        }
        if has_degenerate_segment(&ls.0, tolerance) {
            return SimpleState::DegenerateSegments;
        }
        push_segments(&mut segments, path, &ls.0);
    }

    let closed: Vec<bool> = mls.0.iter().map(LineString::is_closed).collect();
    let seg_counts: Vec<usize> = mls.0.iter().map(|ls| ls.0.len() - 1).collect();
    let mut crossing = false;
    for_each_candidate_pair(&segments, tolerance, |a, b| {
        if a.path == b.path && adjacent(a.index, b.index, seg_counts[a.path], closed[a.path]) {
            return true;
        }
        if line_intersection(a.line, b.line).is_some() {
            crossing = true;
            return false;
        }
        true
    });

    // Une polyligne qui se recoupe reste simple au sens faible
    if crossing {
        SimpleState::WeakSimple
    } else {
        SimpleState::StrongSimple
    }
}

fn classify_polygon(mp: &MultiPolygon, tolerance: f64) -> SimpleState {
    let rings: Vec<&LineString> = mp
        .0
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .collect();

    for ring in &rings {
        if ring.0.len() < 4 || !ring.is_closed() {
            return SimpleState::StructureFlaw;
        }
    }
    for ring in &rings {
        if has_degenerate_segment(&ring.0, tolerance) {
            return SimpleState::DegenerateSegments;
        }
    }

    // Sommets non adjacents trop proches, dans un même anneau ou entre anneaux
    let mut tagged: Vec<(usize, usize, Coord)> = Vec::new();
    for (r, ring) in rings.iter().enumerate() {
        for (i, c) in open_ring(&ring.0).iter().enumerate() {
            tagged.push((r, i, *c));
        }
    }
    let ring_sizes: Vec<usize> = rings.iter().map(|r| open_ring(&r.0).len()).collect();
    let coords: Vec<Coord> = tagged.iter().map(|t| t.2).collect();
    let mut touching_vertices = false;
    let clustered = has_clustered_pair(&coords, tolerance, |i, j| {
        let (ri, vi, ci) = tagged[i];
        let (rj, vj, cj) = tagged[j];
        if ri == rj {
            return adjacent(vi, vj, ring_sizes[ri], true);
        }
        // Anneaux distincts se touchant en un sommet commun : simple au sens faible
        if ci == cj {
            touching_vertices = true;
            return true;
        }
        false
    });
    if clustered {
        return SimpleState::Clustering;
    }

    let mut segments = Vec::new();
    for (r, ring) in rings.iter().enumerate() {
        push_segments(&mut segments, r, &ring.0);
    }
    let mut verdict = None;
    for_each_candidate_pair(&segments, tolerance, |a, b| {
        if a.path == b.path && adjacent(a.index, b.index, ring_sizes[a.path], true) {
            return true;
        }
        match line_intersection(a.line, b.line) {
            None => true,
            Some(LineIntersection::Collinear { .. }) => {
                verdict = Some(SimpleState::CrossOver);
                false
            }
            Some(LineIntersection::SinglePoint {
                intersection,
                is_proper,
            }) => {
                if is_proper {
                    verdict = Some(SimpleState::CrossOver);
                    return false;
                }
                let on_a = is_endpoint(&a.line, intersection);
                let on_b = is_endpoint(&b.line, intersection);
                if on_a && on_b {
                    touching_vertices = true;
                    true
                } else {
                    verdict = Some(SimpleState::Cracking);
                    false
                }
            }
        }
    });
    if let Some(state) = verdict {
        return state;
    }

    for polygon in &mp.0 {
        if !holes_inside_exterior(polygon) {
            return SimpleState::NonSimple;
        }
    }

    for polygon in &mp.0 {
        if signed_ring_area(&polygon.exterior().0) <= 0.0 {
            return SimpleState::RingOrientation;
        }
        if polygon
            .interiors()
            .iter()
            .any(|hole| signed_ring_area(&hole.0) >= 0.0)
        {
            return SimpleState::RingOrientation;
        }
    }

    if touching_vertices {
        SimpleState::WeakSimple
    } else {
        SimpleState::StrongSimple
    }
}

/// Aire signée d'un anneau (positive dans le sens anti-horaire)
pub fn signed_ring_area(coords: &[Coord]) -> f64 {
    let ring = open_ring(coords);
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

fn holes_inside_exterior(polygon: &Polygon) -> bool {
    let shell = Polygon::new(polygon.exterior().clone(), vec![]);
    polygon.interiors().iter().all(|hole| {
        open_ring(&hole.0)
            .iter()
            .all(|c| shell.intersects(&Point::from(*c)))
    })
}

fn has_degenerate_segment(coords: &[Coord], tolerance: f64) -> bool {
    coords.windows(2).any(|w| distance(w[0], w[1]) <= tolerance)
}

struct Segment {
    path: usize,
    index: usize,
    line: Line,
    min_x: f64,
    max_x: f64,
}

fn push_segments(out: &mut Vec<Segment>, path: usize, coords: &[Coord]) {
    for (index, w) in coords.windows(2).enumerate() {
        out.push(Segment {
            path,
            index,
            line: Line::new(w[0], w[1]),
            min_x: w[0].x.min(w[1].x),
            max_x: w[0].x.max(w[1].x),
        });
    }
}

/// Parcours par balayage en x des paires de segments dont les emprises se recouvrent.
/// Le visiteur renvoie `false` pour arrêter le parcours.
fn for_each_candidate_pair<F>(segments: &[Segment], tolerance: f64, mut visit: F)
where
    F: FnMut(&Segment, &Segment) -> bool,
{
    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by(|&a, &b| segments[a].min_x.total_cmp(&segments[b].min_x));
    for (k, &i) in order.iter().enumerate() {
        let a = &segments[i];
        for &j in &order[k + 1..] {
            let b = &segments[j];
            if b.min_x > a.max_x + tolerance {
                break;
            }
            if !visit(a, b) {
                return;
            }
        }
    }
}

/// Recherche par balayage d'une paire de points plus proches que la tolérance.
/// `skip(i, j)` permet d'ignorer les paires légitimes.
fn has_clustered_pair<F>(coords: &[Coord], tolerance: f64, mut skip: F) -> bool
where
    F: FnMut(usize, usize) -> bool,
{
    let mut order: Vec<usize> = (0..coords.len()).collect();
    order.sort_by(|&a, &b| coords[a].x.total_cmp(&coords[b].x));
    for (k, &i) in order.iter().enumerate() {
        for &j in &order[k + 1..] {
            if coords[j].x - coords[i].x > tolerance {
                break;
            }
            if distance(coords[i], coords[j]) <= tolerance && !skip(i, j) {
                return true;
            }
        }
    }
    false
}

/// Segments ou sommets consécutifs d'un même chemin
fn adjacent(i: usize, j: usize, count: usize, closed: bool) -> bool {
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    hi - lo <= 1 || (closed && lo == 0 && hi + 1 == count)
}

fn is_endpoint(line: &Line, c: Coord) -> bool {
    line.start == c || line.end == c
}

fn distance(a: Coord, b: Coord) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
