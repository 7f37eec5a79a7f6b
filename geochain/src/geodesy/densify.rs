//! Longueur et densification le long des géodésiques

use geo::Coord;

use super::{unwrap_near, Geodesy};

impl Geodesy {
    /// Somme des longueurs géodésiques des segments, en mètres
    pub fn path_length(&self, coords: &[Coord]) -> f64 {
        coords
            .windows(2)
            .map(|w| self.distance(w[0], w[1]))
            .sum()
    }

    /// Insère des sommets pour qu'aucun segment ne dépasse `max_length_m`.
    ///
    /// Un segment de longueur `len` est découpé en `ceil(len / max)` pas égaux. Les
    /// longitudes restent continues d'un sommet au suivant.
    pub fn densify_path(&self, coords: &[Coord], max_length_m: f64) -> Vec<Coord> {
        let mut out = Vec::with_capacity(coords.len());
        let Some(first) = coords.first() else {
            return out;
        };
        out.push(*first);
        for w in coords.windows(2) {
            let (a, b) = (w[0], w[1]);
            let (len, azi1, _) = self.inverse_degrees(a, b);
            if len > max_length_m {
                let steps = (len / max_length_m).ceil() as usize;
                let step = len / steps as f64;
                for i in 1..steps {
                    let p = self.direct(a, azi1, step * i as f64);
                    out.push(Coord {
                        x: unwrap_near(p.x, a.x),
                        y: p.y,
                    });
                }
            }
            out.push(b);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geochain_core::Ellipsoid;

    #[test]
    fn test_path_length_equator() {
        let g = Geodesy::new(Ellipsoid::WGS84);
        let path = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }, Coord { x: 2.0, y: 0.0 }];
        assert!((g.path_length(&path) - 2.0 * 111319.4907932264).abs() < 1e-5);
    }

    #[test]
    fn test_densify_splits_in_equal_steps() {
        let g = Geodesy::new(Ellipsoid::WGS84);
        let path = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }];
        let dense = g.densify_path(&path, 30_000.0);
        // 111 km / 30 km -> 4 pas
        assert_eq!(dense.len(), 5);
        assert_eq!(dense[4], path[1]);
        for w in dense.windows(2) {
            let d = g.distance(w[0], w[1]);
            assert!((d - 111319.4907932264 / 4.0).abs() < 1e-4, "d={}", d);
        }
    }

    #[test]
    fn test_densify_across_antimeridian() {
        let g = Geodesy::new(Ellipsoid::WGS84);
        let path = [Coord { x: 179.0, y: 10.0 }, Coord { x: 181.0, y: 10.0 }];
        let dense = g.densify_path(&path, 50_000.0);
        assert!(dense.len() > 2);
        assert!(dense.windows(2).all(|w| w[1].x > w[0].x));
    }

    #[test]
    fn test_short_segments_unchanged() {
        let g = Geodesy::new(Ellipsoid::WGS84);
        let path = [Coord { x: 0.0, y: 0.0 }, Coord { x: 0.001, y: 0.0 }];
        assert_eq!(g.densify_path(&path, 1000.0), path.to_vec());
    }
}
