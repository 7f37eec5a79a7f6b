//! Cercle englobant minimal (Welzl, version itérative « move-to-front »)

use geo::Coord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Marge relative de l'appartenance au cercle
const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Coord,
    pub radius: f64,
}

impl Circle {
    fn from_two(a: Coord, b: Coord) -> Self {
        let center = Coord {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
        };
        Self {
            center,
            radius: distance(center, a).max(distance(center, b)),
        }
    }

    /// Cercle circonscrit ; des points alignés donnent le cercle du plus long côté
    fn from_three(a: Coord, b: Coord, c: Coord) -> Self {
        let (bx, by) = (b.x - a.x, b.y - a.y);
        let (cx, cy) = (c.x - a.x, c.y - a.y);
        let d = 2.0 * (bx * cy - by * cx);
        if d.abs() <= f64::EPSILON * (bx.abs() + by.abs()) * (cx.abs() + cy.abs()) {
            let (ab, ac, bc) = (Self::from_two(a, b), Self::from_two(a, c), Self::from_two(b, c));
            let mut widest = ab;
            for candidate in [ac, bc] {
                if candidate.radius > widest.radius {
                    widest = candidate;
                }
            }
            return widest;
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let center = Coord {
            x: a.x + (cy * b2 - by * c2) / d,
            y: a.y + (bx * c2 - cx * b2) / d,
        };
        let radius = distance(center, a)
            .max(distance(center, b))
            .max(distance(center, c));
        Self { center, radius }
    }

    pub fn contains(&self, p: Coord) -> bool {
        distance(self.center, p) <= self.radius * (1.0 + EPSILON) + EPSILON
    }
}

fn distance(a: Coord, b: Coord) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Plus petit cercle contenant tous les points. Les points sont d'abord mélangés avec
/// un générateur initialisé par `seed`, ce qui rend le calcul reproductible.
///
/// Renvoie `None` pour un ensemble vide.
pub fn minimum_enclosing_circle(points: &[Coord], seed: u64) -> Option<Circle> {
    if points.is_empty() {
        return None;
    }
    let mut points = points.to_vec();
    points.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut circle = Circle {
        center: points[0],
        radius: 0.0,
    };
    for i in 1..points.len() {
        if circle.contains(points[i]) {
            continue;
        }
        circle = Circle {
            center: points[i],
            radius: 0.0,
        };
        for j in 0..i {
            if circle.contains(points[j]) {
                continue;
            }
            circle = Circle::from_two(points[i], points[j]);
            for k in 0..j {
                if !circle.contains(points[k]) {
                    circle = Circle::from_three(points[i], points[j], points[k]);
                }
            }
        }
    }
    Some(circle)
}
