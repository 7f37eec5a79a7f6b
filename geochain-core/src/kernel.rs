//! Primitives topologiques au-dessus de `geo`
//!
//! Union en cascade, découpage de points par une surface, prédicats DE-9IM et
//! égalité avec tolérance. Les algorithmes de balayage eux-mêmes restent ceux de `geo`.

use geo::coordinate_position::CoordPos;
use geo::dimensions::Dimensions;
use geo::{Area, BooleanOps, ConvexHull, Coord, Intersects, MultiPoint, MultiPolygon, Point, Relate};

use crate::geometry::{Geometry, Shape};

/// Prédicat topologique binaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Equals,
    Contains,
    Within,
    Crosses,
    Touches,
    Overlaps,
    Disjoint,
    Intersects,
}

impl Relation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::Within => "within",
            Self::Crosses => "crosses",
            Self::Touches => "touches",
            Self::Overlaps => "overlaps",
            Self::Disjoint => "disjoint",
            Self::Intersects => "intersects",
        }
    }
}

/// Multipolygone vide
pub fn empty_area() -> MultiPolygon {
    MultiPolygon::new(Vec::new())
}

/// Union de toutes les surfaces par arbre équilibré (et non de proche en proche)
pub fn union_all(parts: Vec<MultiPolygon>) -> MultiPolygon {
    let mut level: Vec<MultiPolygon> = parts.into_iter().filter(|p| !p.0.is_empty()).collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut iter = level.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => next.push(a.union(&b)),
                None => next.push(a),
            }
        }
        level = next;
    }
    level.into_iter().next().unwrap_or_else(empty_area)
}

/// Points de `points` contenus dans `area`, bord inclus. Les trous et les parties
/// multiples sont respectés ; l'ordre d'origine est conservé.
pub fn clip_points(points: &MultiPoint, area: &MultiPolygon) -> MultiPoint {
    MultiPoint::new(
        points
            .0
            .iter()
            .filter(|p| area.intersects(*p))
            .copied()
            .collect(),
    )
}

/// Enveloppe convexe de l'ensemble des sommets
pub fn convex_hull(geometry: &Geometry) -> Geometry {
    let vertices = geometry.vertices();
    match vertices.len() {
        0 => geometry.clone(),
        1 => Geometry::from(Point::from(vertices[0])),
        _ => {
            let points: MultiPoint = vertices.into_iter().map(Point::from).collect();
            let hull = points.convex_hull();
            if hull.unsigned_area() > 0.0 {
                return Geometry::from(hull);
            }
            // Ensemble colinéaire : l'enveloppe dégénère en segment entre les extrêmes
            let lexical = |a: &&Coord, b: &&Coord| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y));
            let coords = &hull.exterior().0;
            match (coords.iter().min_by(lexical), coords.iter().max_by(lexical)) {
                (Some(lo), Some(hi)) if lo != hi => Geometry::polyline(vec![vec![*lo, *hi]]),
                (Some(lo), _) => Geometry::from(Point::from(*lo)),
                _ => geometry.clone(),
            }
        }
    }
}

/// Évalue un prédicat entre deux géométries
pub fn relate(relation: Relation, a: &Geometry, b: &Geometry, tolerance: f64) -> bool {
    if a.is_empty() || b.is_empty() {
        return match relation {
            Relation::Disjoint => true,
            Relation::Equals => a.is_empty() && b.is_empty(),
            _ => false,
        };
    }
    if relation == Relation::Equals {
        return equals(a, b, tolerance);
    }

    let (ga, gb) = (a.to_geo(), b.to_geo());
    let matrix = ga.relate(&gb);
    let ii = matrix.get(CoordPos::Inside, CoordPos::Inside);
    let ie = matrix.get(CoordPos::Inside, CoordPos::Outside);
    let ei = matrix.get(CoordPos::Outside, CoordPos::Inside);
    let ib = matrix.get(CoordPos::Inside, CoordPos::OnBoundary);
    let bi = matrix.get(CoordPos::OnBoundary, CoordPos::Inside);
    let bb = matrix.get(CoordPos::OnBoundary, CoordPos::OnBoundary);
    let (da, db) = (a.dimension(), b.dimension());

    match relation {
        Relation::Equals => matrix.is_equal_topo(),
        Relation::Contains => matrix.is_contains(),
        Relation::Within => matrix.is_within(),
        Relation::Disjoint => matrix.is_disjoint(),
        Relation::Intersects => matrix.is_intersects(),
        Relation::Touches => {
            if da == 0 && db == 0 {
                return false;
            }
            ii == Dimensions::Empty
                && (ib != Dimensions::Empty || bi != Dimensions::Empty || bb != Dimensions::Empty)
        }
        Relation::Crosses => {
            if da < db {
                ii != Dimensions::Empty && ie != Dimensions::Empty
            } else if da > db {
                ii != Dimensions::Empty && ei != Dimensions::Empty
            } else if da == 1 {
                ii == Dimensions::ZeroDimensional
            } else {
                false
            }
        }
        Relation::Overlaps => {
            if da != db {
                return false;
            }
            let interior_ok = if da == 1 {
                ii == Dimensions::OneDimensional
            } else {
                ii != Dimensions::Empty
            };
            interior_ok && ie != Dimensions::Empty && ei != Dimensions::Empty
        }
    }
}

/// Égalité topologique exacte, ou à la tolérance près : même dimension et chaque
/// sommet de l'une à moins de `tolerance` de l'autre, dans les deux sens.
pub fn equals(a: &Geometry, b: &Geometry, tolerance: f64) -> bool {
    if a.dimension() != b.dimension() {
        return false;
    }
    if a.to_geo().relate(&b.to_geo()).is_equal_topo() {
        return true;
    }
    let (Some(ea), Some(eb)) = (a.envelope(), b.envelope()) else {
        return false;
    };
    if (ea.min().x - eb.min().x).abs() > tolerance
        || (ea.min().y - eb.min().y).abs() > tolerance
        || (ea.max().x - eb.max().x).abs() > tolerance
        || (ea.max().y - eb.max().y).abs() > tolerance
    {
        return false;
    }
    let (pa, pb) = (segments_of(a), segments_of(b));
    within_distance(&a.vertices(), &pb, tolerance) && within_distance(&b.vertices(), &pa, tolerance)
}

/// Segments de la géométrie ; un point isolé donne un segment dégénéré
fn segments_of(geometry: &Geometry) -> Vec<(Coord, Coord)> {
    let mut out = Vec::new();
    collect_segments(geometry, &mut out);
    out
}

fn collect_segments(geometry: &Geometry, out: &mut Vec<(Coord, Coord)>) {
    match geometry.shape() {
        Shape::Point(p) => push_path(out, &[p.0]),
        Shape::MultiPoint(mp) => {
            for p in &mp.0 {
                push_path(out, &[p.0]);
            }
        }
        Shape::Polyline(mls) => {
            for ls in &mls.0 {
                push_path(out, &ls.0);
            }
        }
        Shape::Polygon(mp) => {
            for poly in &mp.0 {
                push_path(out, &poly.exterior().0);
                for hole in poly.interiors() {
                    push_path(out, &hole.0);
                }
            }
        }
        Shape::Envelope(r) => push_path(out, &r.to_polygon().exterior().0),
        Shape::Collection(members) => {
            for member in members {
                collect_segments(member, out);
            }
        }
    }
}

fn push_path(out: &mut Vec<(Coord, Coord)>, coords: &[Coord]) {
    match coords {
        [] => {}
        [single] => out.push((*single, *single)),
        _ => out.extend(coords.windows(2).map(|w| (w[0], w[1]))),
    }
}

fn within_distance(points: &[Coord], segments: &[(Coord, Coord)], tolerance: f64) -> bool {
    points.iter().all(|c| nearest(*c, segments) <= tolerance)
}

fn nearest(c: Coord, segments: &[(Coord, Coord)]) -> f64 {
    segments
        .iter()
        .map(|(a, b)| point_segment_distance(c, *a, *b))
        .fold(f64::INFINITY, f64::min)
}

/// Distance d'un point à un segment
fn point_segment_distance(p: Coord, a: Coord, b: Coord) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (p.x - a.x).hypot(p.y - a.y);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    (p.x - (a.x + t * dx)).hypot(p.y - (a.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    fn c(x: f64, y: f64) -> Coord {
        Coord { x, y }
    }

    fn square(x0: f64, y0: f64, size: f64) -> Geometry {
        Geometry::polygon(
            vec![
                c(x0, y0),
                c(x0 + size, y0),
                c(x0 + size, y0 + size),
                c(x0, y0 + size),
            ],
            vec![],
        )
    }

    #[test]
    fn test_union_all_merges_overlaps() {
        let parts: Vec<MultiPolygon> = (0..5)
            .map(|i| square(i as f64, 0.0, 2.0).to_multi_polygon().unwrap())
            .collect();
        let merged = union_all(parts);
        assert_eq!(merged.0.len(), 1);
        assert!((Geometry::from(merged).area() - 12.0).abs() < 1e-9);
        assert!(union_all(Vec::new()).0.is_empty());
    }

    #[test]
    fn test_clip_points_respects_holes() {
        let holed = Geometry::polygon(
            vec![c(0.0, 0.0), c(10.0, 0.0), c(10.0, 10.0), c(0.0, 10.0)],
            vec![vec![c(4.0, 4.0), c(4.0, 6.0), c(6.0, 6.0), c(6.0, 4.0)]],
        );
        let points: MultiPoint = vec![
            Point::new(1.0, 1.0),
            Point::new(5.0, 5.0),
            Point::new(11.0, 5.0),
            Point::new(0.0, 5.0),
        ]
        .into();
        let kept = clip_points(&points, &holed.to_multi_polygon().unwrap());
        assert_eq!(kept.0, vec![Point::new(1.0, 1.0), Point::new(0.0, 5.0)]);
    }

    #[test]
    fn test_predicates() {
        let big = square(0.0, 0.0, 10.0);
        let small = square(2.0, 2.0, 2.0);
        let side = square(10.0, 0.0, 5.0);
        let shifted = square(5.0, 5.0, 10.0);
        let far = square(50.0, 50.0, 1.0);

        assert!(relate(Relation::Contains, &big, &small, 1e-9));
        assert!(relate(Relation::Within, &small, &big, 1e-9));
        assert!(relate(Relation::Touches, &big, &side, 1e-9));
        assert!(relate(Relation::Overlaps, &big, &shifted, 1e-9));
        assert!(!relate(Relation::Overlaps, &big, &small, 1e-9));
        assert!(relate(Relation::Disjoint, &big, &far, 1e-9));
        assert!(relate(Relation::Intersects, &big, &shifted, 1e-9));

        let line = Geometry::polyline(vec![vec![c(-5.0, 5.0), c(15.0, 5.0)]]);
        assert!(relate(Relation::Crosses, &line, &big, 1e-9));
        assert!(relate(Relation::Crosses, &big, &line, 1e-9));
    }

    #[test]
    fn test_equals_with_tolerance() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(1e-10, 0.0, 10.0);
        assert!(relate(Relation::Equals, &a, &b, 1e-8));
        assert!(!relate(Relation::Equals, &a, &square(0.1, 0.0, 10.0), 1e-8));
        // Même surface décrite depuis un autre sommet de départ
        let rotated = Geometry::polygon(
            vec![c(10.0, 0.0), c(10.0, 10.0), c(0.0, 10.0), c(0.0, 0.0)],
            vec![],
        );
        assert!(equals(&a, &rotated, 0.0));
    }

    #[test]
    fn test_convex_hull() {
        let pts = Geometry::multi_point(vec![c(0.0, 0.0), c(4.0, 0.0), c(2.0, 1.0), c(2.0, 4.0)]);
        let hull = convex_hull(&pts);
        assert!((hull.area() - 8.0).abs() < 1e-12);
        let colinear = Geometry::multi_point(vec![c(0.0, 0.0), c(1.0, 1.0), c(2.0, 2.0)]);
        assert_eq!(convex_hull(&colinear).dimension(), 1);
    }
}
