//! Conversion entre géométries et formats d'échange (WKT, WKB, GeoJSON) via geozero

use bytes::Bytes;
use geozero::geojson::{GeoJson, GeoJsonWriter};
use geozero::wkb::Wkb;
use geozero::wkt::{Wkt, WktWriter};
use geozero::{CoordDimensions, GeozeroGeometry, ToGeo, ToWkb};

use geochain_core::tracker::{self, Tracker};
use geochain_core::{
    ByteCursor, Cursor, Element, Geometry, GeometryCursor, GeometryError, Result, StringCursor,
};

/// Curseur 1:1 appliquant une conversion à chaque charge utile ; id et feature id suivent
struct CodecCursor<I, O> {
    upstream: Box<dyn Cursor<Item = I>>,
    convert: fn(&I) -> Result<O>,
    tracker: Option<Tracker>,
    index: i64,
}

impl<I, O> CodecCursor<I, O> {
    fn boxed(
        upstream: Box<dyn Cursor<Item = I>>,
        convert: fn(&I) -> Result<O>,
        tracker: Option<Tracker>,
    ) -> Box<Self> {
        Box::new(Self {
            upstream,
            convert,
            tracker,
            index: 0,
        })
    }
}

impl<I, O> Cursor for CodecCursor<I, O> {
    type Item = O;

    fn has_next(&self) -> bool {
        self.upstream.has_next()
    }

    fn next(&mut self) -> Result<Option<Element<O>>> {
        tracker::check(self.tracker.as_deref(), self.index, -1)?;
        let Some(element) = self.upstream.next()? else {
            return Ok(None);
        };
        self.index += 1;
        let converted = (self.convert)(&element.payload).map_err(|e| {
            tracing::debug!(id = element.id, "conversion failed: {}", e);
            e
        })?;
        Ok(Some(element.replace(converted)))
    }
}

fn codec_error(format: &str) -> impl Fn(geozero::error::GeozeroError) -> GeometryError + '_ {
    move |e| GeometryError::codec(format!("{format}: {e}"))
}

fn into_text(buf: Vec<u8>, format: &str) -> Result<String> {
    String::from_utf8(buf).map_err(|e| GeometryError::codec(format!("{format}: {e}")))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ImportFromWkt;

impl ImportFromWkt {
    pub fn execute(&self, text: &str) -> Result<Geometry> {
        let geometry = Wkt(text).to_geo().map_err(codec_error("WKT"))?;
        Ok(Geometry::from_geo(geometry))
    }

    pub fn execute_cursor(&self, cursor: StringCursor, tracker: Option<Tracker>) -> GeometryCursor {
        CodecCursor::boxed(cursor, |s: &String| ImportFromWkt.execute(s), tracker)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExportToWkt;

impl ExportToWkt {
    pub fn execute(&self, geometry: &Geometry) -> Result<String> {
        let mut buf = Vec::new();
        {
            let mut writer = WktWriter::new(&mut buf);
            geometry
                .to_geo()
                .process_geom(&mut writer)
                .map_err(codec_error("WKT"))?;
        }
        into_text(buf, "WKT")
    }

    pub fn execute_cursor(&self, cursor: GeometryCursor, tracker: Option<Tracker>) -> StringCursor {
        CodecCursor::boxed(cursor, |g: &Geometry| ExportToWkt.execute(g), tracker)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ImportFromWkb;

impl ImportFromWkb {
    pub fn execute(&self, wkb: &[u8]) -> Result<Geometry> {
        let geometry = Wkb(wkb.to_vec()).to_geo().map_err(codec_error("WKB"))?;
        Ok(Geometry::from_geo(geometry))
    }

    pub fn execute_cursor(&self, cursor: ByteCursor, tracker: Option<Tracker>) -> GeometryCursor {
        CodecCursor::boxed(cursor, |b: &Bytes| ImportFromWkb.execute(b), tracker)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExportToWkb;

impl ExportToWkb {
    /// WKB ISO, petit-boutiste, deux dimensions
    pub fn execute(&self, geometry: &Geometry) -> Result<Bytes> {
        let wkb = geometry
            .to_geo()
            .to_wkb(CoordDimensions::xy())
            .map_err(codec_error("WKB"))?;
        Ok(Bytes::from(wkb))
    }

    pub fn execute_cursor(&self, cursor: GeometryCursor, tracker: Option<Tracker>) -> ByteCursor {
        CodecCursor::boxed(cursor, |g: &Geometry| ExportToWkb.execute(g), tracker)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ImportFromGeoJson;

impl ImportFromGeoJson {
    pub fn execute(&self, text: &str) -> Result<Geometry> {
        let geometry = GeoJson(text).to_geo().map_err(codec_error("GeoJSON"))?;
        Ok(Geometry::from_geo(geometry))
    }

    pub fn execute_cursor(&self, cursor: StringCursor, tracker: Option<Tracker>) -> GeometryCursor {
        CodecCursor::boxed(cursor, |s: &String| ImportFromGeoJson.execute(s), tracker)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExportToGeoJson;

impl ExportToGeoJson {
    pub fn execute(&self, geometry: &Geometry) -> Result<String> {
        let mut buf = Vec::new();
        {
            let mut writer = GeoJsonWriter::new(&mut buf);
            geometry
                .to_geo()
                .process_geom(&mut writer)
                .map_err(codec_error("GeoJSON"))?;
        }
        into_text(buf, "GeoJSON")
    }

    pub fn execute_cursor(&self, cursor: GeometryCursor, tracker: Option<Tracker>) -> StringCursor {
        CodecCursor::boxed(cursor, |g: &Geometry| ExportToGeoJson.execute(g), tracker)
    }
}
