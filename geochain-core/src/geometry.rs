//! Modèle de géométrie des opérateurs
//!
//! Une [`Geometry`] associe une [`Shape`] (types `geo`) à un [`SimpleState`] mis en
//! cache. Construire, projeter ou généraliser une géométrie remet l'état à `Unknown`.

use std::fmt;

use geo::{
    Area, BoundingRect, Coord, LineString, MapCoords, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon, Rect,
};

use crate::error::Result;

/// Type de géométrie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    MultiPoint,
    Polyline,
    Polygon,
    Envelope,
    GeometryCollection,
}

impl GeometryType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::MultiPoint => "MultiPoint",
            Self::Polyline => "Polyline",
            Self::Polygon => "Polygon",
            Self::Envelope => "Envelope",
            Self::GeometryCollection => "GeometryCollection",
        }
    }

    /// Vrai pour les types surfaciques (Polygon, Envelope)
    pub fn is_area(self) -> bool {
        matches!(self, Self::Polygon | Self::Envelope)
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// État de simplicité topologique mis en cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimpleState {
    #[default]
    Unknown,
    WeakSimple,
    StrongSimple,
    NonSimple,
    StructureFlaw,
    DegenerateSegments,
    Clustering,
    Cracking,
    CrossOver,
    RingOrientation,
}

impl SimpleState {
    /// Vrai pour `WeakSimple` et `StrongSimple`
    pub fn is_simple(self) -> bool {
        matches!(self, Self::WeakSimple | Self::StrongSimple)
    }

    /// Vrai dès qu'un contrôle de simplicité a été exécuté
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

/// Forme concrète d'une géométrie
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Point),
    MultiPoint(MultiPoint),
    Polyline(MultiLineString),
    Polygon(MultiPolygon),
    Envelope(Rect),
    Collection(Vec<Geometry>),
}

/// Géométrie avec son état de simplicité
#[derive(Debug, Clone)]
pub struct Geometry {
    shape: Shape,
    simple_state: SimpleState,
}

/// L'égalité porte sur la forme seule, pas sur l'état en cache.
impl PartialEq for Geometry {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
    }
}

impl Geometry {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            simple_state: SimpleState::Unknown,
        }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::new(Shape::Point(Point::new(x, y)))
    }

    pub fn multi_point(coords: impl IntoIterator<Item = Coord>) -> Self {
        let points: Vec<Point> = coords.into_iter().map(Point::from).collect();
        Self::new(Shape::MultiPoint(MultiPoint::new(points)))
    }

    pub fn polyline(paths: Vec<Vec<Coord>>) -> Self {
        let lines = paths.into_iter().map(LineString::new).collect();
        Self::new(Shape::Polyline(MultiLineString::new(lines)))
    }

    /// Polygone à une partie ; les anneaux sont fermés automatiquement
    pub fn polygon(exterior: Vec<Coord>, holes: Vec<Vec<Coord>>) -> Self {
        let holes = holes.into_iter().map(LineString::new).collect();
        let polygon = Polygon::new(LineString::new(exterior), holes);
        Self::new(Shape::Polygon(MultiPolygon::new(vec![polygon])))
    }

    pub fn rect(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self::new(Shape::Envelope(Rect::new(
            Coord { x: xmin, y: ymin },
            Coord { x: xmax, y: ymax },
        )))
    }

    pub fn collection(members: Vec<Geometry>) -> Self {
        Self::new(Shape::Collection(members))
    }

    /// Géométrie vide du type demandé.
    ///
    /// Un point ne peut pas être vide : `Point` donne un multipoint vide, et `Envelope`
    /// un polygone vide.
    pub fn empty(kind: GeometryType) -> Self {
        let shape = match kind {
            GeometryType::Point | GeometryType::MultiPoint => {
                Shape::MultiPoint(MultiPoint::new(Vec::new()))
            }
            GeometryType::Polyline => Shape::Polyline(MultiLineString::new(Vec::new())),
            GeometryType::Polygon | GeometryType::Envelope => {
                Shape::Polygon(MultiPolygon::new(Vec::new()))
            }
            GeometryType::GeometryCollection => Shape::Collection(Vec::new()),
        };
        Self::new(shape)
    }

    /// Convertit une géométrie `geo` (Line et LineString deviennent des Polyline,
    /// Polygon et Triangle des Polygon, Rect une Envelope)
    pub fn from_geo(geometry: geo::Geometry) -> Self {
        let shape = match geometry {
            geo::Geometry::Point(p) => Shape::Point(p),
            geo::Geometry::Line(line) => Shape::Polyline(MultiLineString::new(vec![
                LineString::new(vec![line.start, line.end]),
            ])),
            geo::Geometry::LineString(ls) => Shape::Polyline(MultiLineString::new(vec![ls])),
            geo::Geometry::Polygon(p) => Shape::Polygon(MultiPolygon::new(vec![p])),
            geo::Geometry::MultiPoint(mp) => Shape::MultiPoint(mp),
            geo::Geometry::MultiLineString(mls) => Shape::Polyline(mls),
            geo::Geometry::MultiPolygon(mp) => Shape::Polygon(mp),
            geo::Geometry::GeometryCollection(gc) => {
                Shape::Collection(gc.into_iter().map(Geometry::from_geo).collect())
            }
            geo::Geometry::Rect(r) => Shape::Envelope(r),
            geo::Geometry::Triangle(t) => Shape::Polygon(MultiPolygon::new(vec![t.to_polygon()])),
        };
        Self::new(shape)
    }

    /// Convertit vers `geo`. Les formes à une seule partie redeviennent LineString ou
    /// Polygon ; une Envelope devient un Polygon.
    pub fn to_geo(&self) -> geo::Geometry {
        match &self.shape {
            Shape::Point(p) => geo::Geometry::Point(*p),
            Shape::MultiPoint(mp) => geo::Geometry::MultiPoint(mp.clone()),
            Shape::Polyline(mls) if mls.0.len() == 1 => {
                geo::Geometry::LineString(mls.0[0].clone())
            }
            Shape::Polyline(mls) => geo::Geometry::MultiLineString(mls.clone()),
            Shape::Polygon(mp) if mp.0.len() == 1 => geo::Geometry::Polygon(mp.0[0].clone()),
            Shape::Polygon(mp) => geo::Geometry::MultiPolygon(mp.clone()),
            Shape::Envelope(r) => geo::Geometry::Polygon(r.to_polygon()),
            Shape::Collection(members) => geo::Geometry::GeometryCollection(
                geo::GeometryCollection(members.iter().map(Geometry::to_geo).collect()),
            ),
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn into_shape(self) -> Shape {
        self.shape
    }

    pub fn geometry_type(&self) -> GeometryType {
        match &self.shape {
            Shape::Point(_) => GeometryType::Point,
            Shape::MultiPoint(_) => GeometryType::MultiPoint,
            Shape::Polyline(_) => GeometryType::Polyline,
            Shape::Polygon(_) => GeometryType::Polygon,
            Shape::Envelope(_) => GeometryType::Envelope,
            Shape::Collection(_) => GeometryType::GeometryCollection,
        }
    }

    pub fn simple_state(&self) -> SimpleState {
        self.simple_state
    }

    pub(crate) fn set_simple_state(&mut self, state: SimpleState) {
        self.simple_state = state;
    }

    pub fn is_empty(&self) -> bool {
        match &self.shape {
            Shape::Point(_) | Shape::Envelope(_) => false,
            Shape::MultiPoint(mp) => mp.0.is_empty(),
            Shape::Polyline(mls) => mls.0.iter().all(|ls| ls.0.is_empty()),
            Shape::Polygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
            Shape::Collection(members) => members.iter().all(Geometry::is_empty),
        }
    }

    /// Nombre de sommets, sans compter le point de fermeture des anneaux
    pub fn point_count(&self) -> usize {
        match &self.shape {
            Shape::Point(_) => 1,
            Shape::MultiPoint(mp) => mp.0.len(),
            Shape::Polyline(mls) => mls.0.iter().map(|ls| ls.0.len()).sum(),
            Shape::Polygon(mp) => mp
                .0
                .iter()
                .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
                .map(|ring| open_ring(&ring.0).len())
                .sum(),
            Shape::Envelope(_) => 4,
            Shape::Collection(members) => members.iter().map(Geometry::point_count).sum(),
        }
    }

    /// Dimension topologique : 0 points, 1 lignes, 2 surfaces
    pub fn dimension(&self) -> u8 {
        match &self.shape {
            Shape::Point(_) | Shape::MultiPoint(_) => 0,
            Shape::Polyline(_) => 1,
            Shape::Polygon(_) | Shape::Envelope(_) => 2,
            Shape::Collection(members) => {
                members.iter().map(Geometry::dimension).max().unwrap_or(0)
            }
        }
    }

    /// Rectangle englobant, `None` pour une géométrie vide
    pub fn envelope(&self) -> Option<Rect> {
        match &self.shape {
            Shape::Point(p) => Some(Rect::new(p.0, p.0)),
            Shape::MultiPoint(mp) => mp.bounding_rect(),
            Shape::Polyline(mls) => mls.bounding_rect(),
            Shape::Polygon(mp) => mp.bounding_rect(),
            Shape::Envelope(r) => Some(*r),
            Shape::Collection(members) => members
                .iter()
                .filter_map(Geometry::envelope)
                .reduce(merge_rects),
        }
    }

    /// Aire planaire non signée
    pub fn area(&self) -> f64 {
        match &self.shape {
            Shape::Polygon(mp) => mp.unsigned_area(),
            Shape::Envelope(r) => r.unsigned_area(),
            Shape::Collection(members) => members.iter().map(Geometry::area).sum(),
            _ => 0.0,
        }
    }

    /// Longueur planaire des chemins (périmètre pour les surfaces)
    pub fn length(&self) -> f64 {
        match &self.shape {
            Shape::Point(_) | Shape::MultiPoint(_) => 0.0,
            Shape::Polyline(mls) => mls.0.iter().map(|ls| path_length(&ls.0)).sum(),
            Shape::Polygon(mp) => mp
                .0
                .iter()
                .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
                .map(|ring| path_length(&ring.0))
                .sum(),
            Shape::Envelope(r) => 2.0 * (r.width() + r.height()),
            Shape::Collection(members) => members.iter().map(Geometry::length).sum(),
        }
    }

    /// Tous les sommets, sans le point de fermeture des anneaux
    pub fn vertices(&self) -> Vec<Coord> {
        let mut out = Vec::with_capacity(self.point_count());
        self.collect_vertices(&mut out);
        out
    }

    fn collect_vertices(&self, out: &mut Vec<Coord>) {
        match &self.shape {
            Shape::Point(p) => out.push(p.0),
            Shape::MultiPoint(mp) => out.extend(mp.0.iter().map(|p| p.0)),
            Shape::Polyline(mls) => {
                for ls in &mls.0 {
                    out.extend_from_slice(&ls.0);
                }
            }
            Shape::Polygon(mp) => {
                for poly in &mp.0 {
                    for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
                        out.extend_from_slice(open_ring(&ring.0));
                    }
                }
            }
            Shape::Envelope(r) => {
                let (min, max) = (r.min(), r.max());
                out.extend([
                    min,
                    Coord { x: max.x, y: min.y },
                    max,
                    Coord { x: min.x, y: max.y },
                ]);
            }
            Shape::Collection(members) => {
                for member in members {
                    member.collect_vertices(out);
                }
            }
        }
    }

    /// Surface sous forme de multipolygone (Polygon ou Envelope uniquement)
    pub fn to_multi_polygon(&self) -> Option<MultiPolygon> {
        match &self.shape {
            Shape::Polygon(mp) => Some(mp.clone()),
            Shape::Envelope(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
            _ => None,
        }
    }

    /// Remplace une Envelope par le polygone équivalent, les autres formes sont inchangées
    pub fn envelope_as_polygon(self) -> Geometry {
        match self.shape {
            Shape::Envelope(r) => Geometry::new(Shape::Polygon(MultiPolygon::new(vec![
                r.to_polygon(),
            ]))),
            _ => self,
        }
    }

    /// Applique `f` à chaque tableau de coordonnées (un par chemin ou anneau) en prenant
    /// possession de la géométrie. Les tableaux sont modifiés sur place.
    pub fn try_transform_coords<F>(self, f: &mut F) -> Result<Geometry>
    where
        F: FnMut(&mut [Coord]) -> Result<()>,
    {
        let shape = match self.shape {
            Shape::Point(p) => {
                let mut coords = [p.0];
                f(&mut coords)?;
                Shape::Point(Point::from(coords[0]))
            }
            Shape::MultiPoint(mp) => {
                let mut coords: Vec<Coord> = mp.0.into_iter().map(|p| p.0).collect();
                f(&mut coords)?;
                Shape::MultiPoint(MultiPoint::new(
                    coords.into_iter().map(Point::from).collect(),
                ))
            }
            Shape::Polyline(mls) => {
                let mut lines = mls.0;
                for line in lines.iter_mut() {
                    f(&mut line.0)?;
                }
                Shape::Polyline(MultiLineString::new(lines))
            }
            Shape::Polygon(mp) => {
                let mut polygons = Vec::with_capacity(mp.0.len());
                for polygon in mp.0 {
                    let (mut exterior, mut holes) = polygon.into_inner();
                    f(&mut exterior.0)?;
                    for hole in holes.iter_mut() {
                        f(&mut hole.0)?;
                    }
                    polygons.push(Polygon::new(exterior, holes));
                }
                Shape::Polygon(MultiPolygon::new(polygons))
            }
            Shape::Envelope(r) => {
                let mut corners = [r.min(), r.max()];
                f(&mut corners)?;
                Shape::Envelope(Rect::new(corners[0], corners[1]))
            }
            Shape::Collection(members) => {
                let mut out = Vec::with_capacity(members.len());
                for member in members {
                    out.push(member.try_transform_coords(f)?);
                }
                Shape::Collection(out)
            }
        };
        Ok(Geometry::new(shape))
    }

    /// Copie transformée coordonnée par coordonnée
    pub fn map_coords(&self, func: impl Fn(Coord) -> Coord + Copy) -> Geometry {
        let shape = match &self.shape {
            Shape::Point(p) => Shape::Point(p.map_coords(func)),
            Shape::MultiPoint(mp) => Shape::MultiPoint(mp.map_coords(func)),
            Shape::Polyline(mls) => Shape::Polyline(mls.map_coords(func)),
            Shape::Polygon(mp) => Shape::Polygon(mp.map_coords(func)),
            Shape::Envelope(r) => Shape::Envelope(r.map_coords(func)),
            Shape::Collection(members) => {
                Shape::Collection(members.iter().map(|m| m.map_coords(func)).collect())
            }
        };
        Geometry::new(shape)
    }
}

impl From<Point> for Geometry {
    fn from(p: Point) -> Self {
        Self::new(Shape::Point(p))
    }
}

impl From<MultiPoint> for Geometry {
    fn from(mp: MultiPoint) -> Self {
        Self::new(Shape::MultiPoint(mp))
    }
}

impl From<LineString> for Geometry {
    fn from(ls: LineString) -> Self {
        Self::new(Shape::Polyline(MultiLineString::new(vec![ls])))
    }
}

impl From<MultiLineString> for Geometry {
    fn from(mls: MultiLineString) -> Self {
        Self::new(Shape::Polyline(mls))
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self {
        Self::new(Shape::Polygon(MultiPolygon::new(vec![p])))
    }
}

impl From<MultiPolygon> for Geometry {
    fn from(mp: MultiPolygon) -> Self {
        Self::new(Shape::Polygon(mp))
    }
}

impl From<Rect> for Geometry {
    fn from(r: Rect) -> Self {
        Self::new(Shape::Envelope(r))
    }
}

/// Anneau sans son point de fermeture
pub fn open_ring(coords: &[Coord]) -> &[Coord] {
    match coords {
        [first, .., last] if first == last => &coords[..coords.len() - 1],
        _ => coords,
    }
}

/// Longueur planaire d'un chemin
pub fn path_length(coords: &[Coord]) -> f64 {
    coords
        .windows(2)
        .map(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y))
        .sum()
}

/// Union de deux rectangles
pub fn merge_rects(a: Rect, b: Rect) -> Rect {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Geometry {
        Geometry::polygon(
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 10.0, y: 0.0 },
                Coord { x: 10.0, y: 10.0 },
                Coord { x: 0.0, y: 10.0 },
            ],
            vec![],
        )
    }

    #[test]
    fn test_polygon_is_closed_and_counted_without_closure() {
        let geom = square();
        assert_eq!(geom.point_count(), 4);
        assert_eq!(geom.vertices().len(), 4);
        assert!((geom.area() - 100.0).abs() < 1e-12);
        assert!((geom.length() - 40.0).abs() < 1e-12);
        assert_eq!(geom.simple_state(), SimpleState::Unknown);
    }

    #[test]
    fn test_empty_geometries() {
        assert!(Geometry::empty(GeometryType::Polygon).is_empty());
        assert!(Geometry::empty(GeometryType::Point).is_empty());
        assert!(Geometry::empty(GeometryType::Polyline).envelope().is_none());
        assert!(!Geometry::point(1.0, 2.0).is_empty());
    }

    #[test]
    fn test_geo_conversion_keeps_single_parts() {
        let geom = square();
        let back = Geometry::from_geo(geom.to_geo());
        assert_eq!(back, geom);
        assert!(matches!(geom.to_geo(), geo::Geometry::Polygon(_)));

        let env = Geometry::rect(0.0, 0.0, 2.0, 3.0);
        assert_eq!(env.geometry_type(), GeometryType::Envelope);
        assert_eq!(env.clone().envelope_as_polygon().geometry_type(), GeometryType::Polygon);
        assert!((env.area() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_coords_resets_state() {
        let mut geom = square();
        geom.set_simple_state(SimpleState::StrongSimple);
        let moved = geom
            .try_transform_coords(&mut |coords: &mut [Coord]| {
                for c in coords.iter_mut() {
                    c.x += 5.0;
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(moved.simple_state(), SimpleState::Unknown);
        let env = moved.envelope().unwrap();
        assert_eq!(env.min().x, 5.0);
        assert_eq!(env.max().x, 15.0);
    }

    #[test]
    fn test_collection_envelope_and_dimension() {
        let geom = Geometry::collection(vec![Geometry::point(-1.0, -1.0), square()]);
        let env = geom.envelope().unwrap();
        assert_eq!(env.min(), Coord { x: -1.0, y: -1.0 });
        assert_eq!(env.max(), Coord { x: 10.0, y: 10.0 });
        assert_eq!(geom.dimension(), 2);
        assert_eq!(geom.point_count(), 5);
    }
}
