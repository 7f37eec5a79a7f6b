//! Opérateurs et registre
//!
//! Chaque opérateur offre une forme géométrie unique (`execute`) et, quand elle a un
//! sens, une forme curseur (`execute_cursor`) qui enveloppe un curseur amont. Le
//! registre global est construit une fois avec les réglages par défaut ; un registre
//! privé se construit avec [`OperatorRegistry::with_settings`].

mod buffer;
mod codec;
mod convex_hull;
mod enclosing_circle;
mod generalize;
mod geodesic_buffer;
mod geodetic;
mod project;
mod random_points;
mod simple_relation;
mod union;

use std::fmt;
use std::sync::OnceLock;

use geochain_core::{GeometryError, Result};

use crate::settings::Settings;

pub use buffer::{Buffer, BufferParams};
pub use codec::{ExportToGeoJson, ExportToWkb, ExportToWkt, ImportFromGeoJson, ImportFromWkb, ImportFromWkt};
pub use convex_hull::ConvexHull;
pub use enclosing_circle::EnclosingCircle;
pub use generalize::GeneralizeByArea;
pub use geodesic_buffer::GeodesicBuffer;
pub use geodetic::{GeodeticDensifyByLength, GeodeticInverse, GeodeticLength};
pub use project::Project;
pub use random_points::RandomPoints;
pub use simple_relation::SimpleRelation;
pub use union::Union;

/// Types d'opérateurs connus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Project,
    Buffer,
    GeodesicBuffer,
    GeodeticDensifyByLength,
    GeodeticLength,
    GeodeticInverse,
    GeneralizeByArea,
    RandomPoints,
    EnclosingCircle,
    SimpleRelation,
    Union,
    ConvexHull,
    ImportFromWkt,
    ExportToWkt,
    ImportFromWkb,
    ExportToWkb,
    ImportFromGeoJson,
    ExportToGeoJson,
    // sans implémentation locale
    Offset,
    Cut,
    Clip,
    LabelPoint,
    ShapePreservingDensify,
}

impl OperatorKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Buffer => "Buffer",
            Self::GeodesicBuffer => "GeodesicBuffer",
            Self::GeodeticDensifyByLength => "GeodeticDensifyByLength",
            Self::GeodeticLength => "GeodeticLength",
            Self::GeodeticInverse => "GeodeticInverse",
            Self::GeneralizeByArea => "GeneralizeByArea",
            Self::RandomPoints => "RandomPoints",
            Self::EnclosingCircle => "EnclosingCircle",
            Self::SimpleRelation => "SimpleRelation",
            Self::Union => "Union",
            Self::ConvexHull => "ConvexHull",
            Self::ImportFromWkt => "ImportFromWkt",
            Self::ExportToWkt => "ExportToWkt",
            Self::ImportFromWkb => "ImportFromWkb",
            Self::ExportToWkb => "ExportToWkb",
            Self::ImportFromGeoJson => "ImportFromGeoJson",
            Self::ExportToGeoJson => "ExportToGeoJson",
            Self::Offset => "Offset",
            Self::Cut => "Cut",
            Self::Clip => "Clip",
            Self::LabelPoint => "LabelPoint",
            Self::ShapePreservingDensify => "ShapePreservingDensify",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opérateur emprunté au registre
#[derive(Debug, Clone, Copy)]
pub enum Operator<'a> {
    Project(&'a Project),
    Buffer(&'a Buffer),
    GeodesicBuffer(&'a GeodesicBuffer),
    GeodeticDensifyByLength(&'a GeodeticDensifyByLength),
    GeodeticLength(&'a GeodeticLength),
    GeodeticInverse(&'a GeodeticInverse),
    GeneralizeByArea(&'a GeneralizeByArea),
    RandomPoints(&'a RandomPoints),
    EnclosingCircle(&'a EnclosingCircle),
    SimpleRelation(&'a SimpleRelation),
    Union(&'a Union),
    ConvexHull(&'a ConvexHull),
    ImportFromWkt(&'a ImportFromWkt),
    ExportToWkt(&'a ExportToWkt),
    ImportFromWkb(&'a ImportFromWkb),
    ExportToWkb(&'a ExportToWkb),
    ImportFromGeoJson(&'a ImportFromGeoJson),
    ExportToGeoJson(&'a ExportToGeoJson),
}

impl Operator<'_> {
    pub fn kind(&self) -> OperatorKind {
        match self {
            Self::Project(_) => OperatorKind::Project,
            Self::Buffer(_) => OperatorKind::Buffer,
            Self::GeodesicBuffer(_) => OperatorKind::GeodesicBuffer,
            Self::GeodeticDensifyByLength(_) => OperatorKind::GeodeticDensifyByLength,
            Self::GeodeticLength(_) => OperatorKind::GeodeticLength,
            Self::GeodeticInverse(_) => OperatorKind::GeodeticInverse,
            Self::GeneralizeByArea(_) => OperatorKind::GeneralizeByArea,
            Self::RandomPoints(_) => OperatorKind::RandomPoints,
            Self::EnclosingCircle(_) => OperatorKind::EnclosingCircle,
            Self::SimpleRelation(_) => OperatorKind::SimpleRelation,
            Self::Union(_) => OperatorKind::Union,
            Self::ConvexHull(_) => OperatorKind::ConvexHull,
            Self::ImportFromWkt(_) => OperatorKind::ImportFromWkt,
            Self::ExportToWkt(_) => OperatorKind::ExportToWkt,
            Self::ImportFromWkb(_) => OperatorKind::ImportFromWkb,
            Self::ExportToWkb(_) => OperatorKind::ExportToWkb,
            Self::ImportFromGeoJson(_) => OperatorKind::ImportFromGeoJson,
            Self::ExportToGeoJson(_) => OperatorKind::ExportToGeoJson,
        }
    }
}

/// Registre immuable d'opérateurs partageant les mêmes réglages
#[derive(Debug)]
pub struct OperatorRegistry {
    settings: Settings,
    project: Project,
    buffer: Buffer,
    geodesic_buffer: GeodesicBuffer,
    geodetic_densify: GeodeticDensifyByLength,
    geodetic_length: GeodeticLength,
    geodetic_inverse: GeodeticInverse,
    generalize: GeneralizeByArea,
    random_points: RandomPoints,
    enclosing_circle: EnclosingCircle,
    simple_relation: SimpleRelation,
    union: Union,
    convex_hull: ConvexHull,
    import_wkt: ImportFromWkt,
    export_wkt: ExportToWkt,
    import_wkb: ImportFromWkb,
    export_wkb: ExportToWkb,
    import_geojson: ImportFromGeoJson,
    export_geojson: ExportToGeoJson,
}

impl OperatorRegistry {
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            project: Project,
            buffer: Buffer::new(&settings),
            geodesic_buffer: GeodesicBuffer::new(&settings),
            geodetic_densify: GeodeticDensifyByLength,
            geodetic_length: GeodeticLength,
            geodetic_inverse: GeodeticInverse,
            generalize: GeneralizeByArea,
            random_points: RandomPoints::new(&settings),
            enclosing_circle: EnclosingCircle::new(&settings),
            simple_relation: SimpleRelation,
            union: Union,
            convex_hull: ConvexHull,
            import_wkt: ImportFromWkt,
            export_wkt: ExportToWkt,
            import_wkb: ImportFromWkb,
            export_wkb: ExportToWkb,
            import_geojson: ImportFromGeoJson,
            export_geojson: ExportToGeoJson,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Opérateur du type demandé, ou `UnsupportedOperator`
    pub fn get(&self, kind: OperatorKind) -> Result<Operator<'_>> {
        let operator = match kind {
            OperatorKind::Project => Operator::Project(&self.project),
            OperatorKind::Buffer => Operator::Buffer(&self.buffer),
            OperatorKind::GeodesicBuffer => Operator::GeodesicBuffer(&self.geodesic_buffer),
            OperatorKind::GeodeticDensifyByLength => {
                Operator::GeodeticDensifyByLength(&self.geodetic_densify)
            }
            OperatorKind::GeodeticLength => Operator::GeodeticLength(&self.geodetic_length),
            OperatorKind::GeodeticInverse => Operator::GeodeticInverse(&self.geodetic_inverse),
            OperatorKind::GeneralizeByArea => Operator::GeneralizeByArea(&self.generalize),
            OperatorKind::RandomPoints => Operator::RandomPoints(&self.random_points),
            OperatorKind::EnclosingCircle => Operator::EnclosingCircle(&self.enclosing_circle),
            OperatorKind::SimpleRelation => Operator::SimpleRelation(&self.simple_relation),
            OperatorKind::Union => Operator::Union(&self.union),
            OperatorKind::ConvexHull => Operator::ConvexHull(&self.convex_hull),
            OperatorKind::ImportFromWkt => Operator::ImportFromWkt(&self.import_wkt),
            OperatorKind::ExportToWkt => Operator::ExportToWkt(&self.export_wkt),
            OperatorKind::ImportFromWkb => Operator::ImportFromWkb(&self.import_wkb),
            OperatorKind::ExportToWkb => Operator::ExportToWkb(&self.export_wkb),
            OperatorKind::ImportFromGeoJson => Operator::ImportFromGeoJson(&self.import_geojson),
            OperatorKind::ExportToGeoJson => Operator::ExportToGeoJson(&self.export_geojson),
            OperatorKind::Offset
            | OperatorKind::Cut
            | OperatorKind::Clip
            | OperatorKind::LabelPoint
            | OperatorKind::ShapePreservingDensify => {
                return Err(GeometryError::UnsupportedOperator(kind.name().to_string()))
            }
        };
        Ok(operator)
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

static REGISTRY: OnceLock<OperatorRegistry> = OnceLock::new();

/// Registre global, construit au premier appel avec les réglages par défaut
pub fn registry() -> &'static OperatorRegistry {
    REGISTRY.get_or_init(|| {
        tracing::debug!("building operator registry");
        OperatorRegistry::default()
    })
}

/// Accès `X::local()` aux opérateurs du registre global
macro_rules! local_operator {
    ($ty:ident, $field:ident) => {
        impl $ty {
            /// Instance du registre global
            pub fn local() -> &'static Self {
                &registry().$field
            }
        }
    };
}

local_operator!(Project, project);
local_operator!(Buffer, buffer);
local_operator!(GeodesicBuffer, geodesic_buffer);
local_operator!(GeodeticDensifyByLength, geodetic_densify);
local_operator!(GeodeticLength, geodetic_length);
local_operator!(GeodeticInverse, geodetic_inverse);
local_operator!(GeneralizeByArea, generalize);
local_operator!(RandomPoints, random_points);
local_operator!(EnclosingCircle, enclosing_circle);
local_operator!(SimpleRelation, simple_relation);
local_operator!(Union, union);
local_operator!(ConvexHull, convex_hull);
local_operator!(ImportFromWkt, import_wkt);
local_operator!(ExportToWkt, export_wkt);
local_operator!(ImportFromWkb, import_wkb);
local_operator!(ExportToWkb, export_wkb);
local_operator!(ImportFromGeoJson, import_geojson);
local_operator!(ExportToGeoJson, export_geojson);

/// Valeur d'une liste de paramètres pour l'élément `index` : une liste d'une valeur
/// s'applique à tous, sinon la liste est parallèle au flux
pub(crate) fn parameter_at(values: &[f64], index: usize, name: &str) -> Result<f64> {
    match values {
        [single] => Ok(*single),
        _ => values.get(index).copied().ok_or_else(|| {
            GeometryError::invalid_argument(format!(
                "no {name} for geometry {index} ({} given)",
                values.len()
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_returns_same_instance() {
        let a = registry() as *const OperatorRegistry;
        let b = registry() as *const OperatorRegistry;
        assert_eq!(a, b);
        assert!(std::ptr::eq(Buffer::local(), &registry().buffer));
    }

    #[test]
    fn test_get_known_and_unsupported() {
        let op = registry().get(OperatorKind::GeodesicBuffer).unwrap();
        assert_eq!(op.kind(), OperatorKind::GeodesicBuffer);
        for kind in [
            OperatorKind::Offset,
            OperatorKind::Cut,
            OperatorKind::Clip,
            OperatorKind::LabelPoint,
            OperatorKind::ShapePreservingDensify,
        ] {
            let err = registry().get(kind).unwrap_err();
            assert!(matches!(err, GeometryError::UnsupportedOperator(_)), "{kind}");
        }
    }

    #[test]
    fn test_private_registry_settings() {
        let settings = Settings::from_preset("coarse").unwrap();
        let private = OperatorRegistry::with_settings(settings.clone());
        assert_eq!(private.settings(), &settings);
        assert_eq!(registry().settings(), &Settings::default());
    }

    #[test]
    fn test_parameter_at() {
        assert_eq!(parameter_at(&[5.0], 7, "distance").unwrap(), 5.0);
        assert_eq!(parameter_at(&[1.0, 2.0], 1, "distance").unwrap(), 2.0);
        let err = parameter_at(&[1.0, 2.0], 2, "distance").unwrap_err();
        assert!(matches!(err, GeometryError::InvalidArgument(_)));
        assert!(parameter_at(&[], 0, "distance").is_err());
    }
}
