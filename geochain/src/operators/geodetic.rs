//! Métriques géodésiques : longueur, problème inverse, densification

use geo::{Coord, LineString};
use geochain_core::tracker::{self, ProgressTracker, Tracker};
use geochain_core::{
    Cursor, Element, Geometry, GeometryCursor, GeometryError, Result, Shape, SpatialReference,
};

use crate::geodesy::{Geodesy, InverseResult};
use crate::projection::{project, ProjectionTransformation};

/// Géométrie exprimée dans une référence géographique, avec son solveur
fn to_geographic(geometry: &Geometry, sr: &SpatialReference) -> Result<(Geometry, Geodesy)> {
    if sr.is_geographic() {
        return Ok((geometry.clone(), Geodesy::for_reference(sr)));
    }
    if !sr.is_georeferenced() {
        return Err(GeometryError::reference_missing(
            "geodetic operations require a geographic or projected spatial reference",
        ));
    }
    let wgs84 = SpatialReference::wgs84();
    let geographic = project(geometry, &ProjectionTransformation::new(sr, &wgs84), None)?;
    Ok((geographic, Geodesy::for_reference(&wgs84)))
}

fn for_each_path(geometry: &Geometry, f: &mut impl FnMut(&[Coord])) {
    match geometry.shape() {
        Shape::Point(_) | Shape::MultiPoint(_) => {}
        Shape::Polyline(mls) => mls.0.iter().for_each(|l| f(&l.0)),
        Shape::Polygon(mp) => {
            for polygon in &mp.0 {
                f(&polygon.exterior().0);
                polygon.interiors().iter().for_each(|r| f(&r.0));
            }
        }
        Shape::Envelope(r) => f(&r.to_polygon().exterior().0),
        Shape::Collection(members) => members.iter().for_each(|m| for_each_path(m, f)),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GeodeticLength;

impl GeodeticLength {
    /// Longueur géodésique en mètres ; 0 pour les points
    pub fn execute(
        &self,
        geometry: &Geometry,
        sr: &SpatialReference,
        tracker: Option<&dyn ProgressTracker>,
    ) -> Result<f64> {
        tracker::check(tracker, 0, 1)?;
        if geometry.is_empty() || geometry.dimension() == 0 {
            return Ok(0.0);
        }
        let (geographic, geodesy) = to_geographic(geometry, sr)?;
        let mut length = 0.0;
        for_each_path(&geographic, &mut |path| length += geodesy.path_length(path));
        Ok(length)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GeodeticInverse;

impl GeodeticInverse {
    /// Azimuts et distance entre deux points, chacun dans sa référence
    pub fn execute(
        &self,
        p1: &Geometry,
        p2: &Geometry,
        sr1: &SpatialReference,
        sr2: &SpatialReference,
        tracker: Option<&dyn ProgressTracker>,
    ) -> Result<InverseResult> {
        tracker::check(tracker, 0, 1)?;
        let point = |g: &Geometry, sr: &SpatialReference| -> Result<Coord> {
            let Shape::Point(_) = g.shape() else {
                return Err(GeometryError::unsupported_geometry(format!(
                    "geodetic inverse expects points, got {}",
                    g.geometry_type()
                )));
            };
            let (geographic, _) = to_geographic(g, sr)?;
            match geographic.shape() {
                Shape::Point(p) => Ok(p.0),
                _ => Err(GeometryError::projection("point changed type during projection")),
            }
        };
        let (a, b) = (point(p1, sr1)?, point(p2, sr2)?);
        let geodesy = if sr1.is_geographic() {
            Geodesy::for_reference(sr1)
        } else {
            Geodesy::for_reference(&SpatialReference::wgs84())
        };
        Ok(geodesy.inverse(a, b))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GeodeticDensifyByLength;

impl GeodeticDensifyByLength {
    /// Découpe les segments plus longs que `max_length_m` en pas géodésiques égaux.
    ///
    /// Le résultat reste dans la référence d'entrée ; une enveloppe devient un polygone.
    pub fn execute(
        &self,
        geometry: &Geometry,
        sr: &SpatialReference,
        max_length_m: f64,
        tracker: Option<&dyn ProgressTracker>,
    ) -> Result<Geometry> {
        tracker::check(tracker, 0, 1)?;
        if !(max_length_m > 0.0) {
            return Err(GeometryError::invalid_argument(format!(
                "max segment length must be positive, got {max_length_m}"
            )));
        }
        let geometry = geometry.clone().envelope_as_polygon();
        if geometry.dimension() == 0 || geometry.is_empty() {
            return Ok(geometry);
        }
        let (geographic, geodesy) = to_geographic(&geometry, sr)?;
        let dense = densify(&geodesy, &geographic, max_length_m);
        if sr.is_geographic() {
            return Ok(dense);
        }
        let back = ProjectionTransformation::new(&SpatialReference::wgs84(), sr);
        project(&dense, &back, None)
    }

    pub fn execute_cursor(
        &self,
        cursor: GeometryCursor,
        sr: SpatialReference,
        max_length_m: f64,
        tracker: Option<Tracker>,
    ) -> Result<GeometryCursor> {
        if !(max_length_m > 0.0) {
            return Err(GeometryError::invalid_argument(format!(
                "max segment length must be positive, got {max_length_m}"
            )));
        }
        Ok(Box::new(DensifyCursor {
            upstream: cursor,
            sr,
            max_length_m,
            tracker,
            index: 0,
        }))
    }
}

fn densify(geodesy: &Geodesy, geometry: &Geometry, max_length_m: f64) -> Geometry {
    let line = |l: &LineString| LineString::new(geodesy.densify_path(&l.0, max_length_m));
    match geometry.shape() {
        Shape::Point(_) | Shape::MultiPoint(_) | Shape::Envelope(_) => geometry.clone(),
        Shape::Polyline(mls) => Geometry::from(geo::MultiLineString::new(mls.0.iter().map(line).collect())),
        Shape::Polygon(mp) => Geometry::from(geo::MultiPolygon::new(
            mp.0.iter()
                .map(|p| geo::Polygon::new(line(p.exterior()), p.interiors().iter().map(line).collect()))
                .collect(),
        )),
        Shape::Collection(members) => Geometry::collection(
            members
                .iter()
                .map(|m| densify(geodesy, &m.clone().envelope_as_polygon(), max_length_m))
                .collect(),
        ),
    }
}

struct DensifyCursor {
    upstream: GeometryCursor,
    sr: SpatialReference,
    max_length_m: f64,
    tracker: Option<Tracker>,
    index: i64,
}

impl Cursor for DensifyCursor {
    type Item = Geometry;

    fn has_next(&self) -> bool {
        self.upstream.has_next()
    }

    fn next(&mut self) -> Result<Option<Element<Geometry>>> {
        tracker::check(self.tracker.as_deref(), self.index, -1)?;
        let Some(element) = self.upstream.next()? else {
            return Ok(None);
        };
        self.index += 1;
        let dense = GeodeticDensifyByLength.execute(&element.payload, &self.sr, self.max_length_m, None)?;
        Ok(Some(element.with_geometry(dense)))
    }
}
