use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cartesian::{Point2d, Rect};
use crate::error::GisTypesError;
use crate::ring::Ring;
use crate::{wkb, wkt};

/// Type tag of a geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    /// `POINT`
    Point,
    /// `LINESTRING`
    LineString,
    /// `POLYGON`
    Polygon,
    /// `MULTIPOINT`
    MultiPoint,
    /// `MULTILINESTRING`
    MultiLineString,
    /// `MULTIPOLYGON`
    MultiPolygon,
    /// `GEOMETRYCOLLECTION`
    GeometryCollection,
}

impl GeometryKind {
    /// All kinds, in WKB type code order.
    pub const ALL: [GeometryKind; 7] = [
        GeometryKind::Point,
        GeometryKind::LineString,
        GeometryKind::Polygon,
        GeometryKind::MultiPoint,
        GeometryKind::MultiLineString,
        GeometryKind::MultiPolygon,
        GeometryKind::GeometryCollection,
    ];

    /// WKT keyword of the kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// Looks up a kind by its WKT keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(keyword))
    }
}

impl Display for GeometryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for GeometryKind {
    type Err = GisTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s.trim()).ok_or_else(|| GisTypesError::UnknownGeometryType(s.into()))
    }
}

/// Open sequence of points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    /// Points of the line.
    pub points: Vec<Point2d>,
}

/// Polygon: the first ring is the outer boundary, the rest are holes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Rings of the polygon. Empty only for `POLYGON EMPTY`.
    pub rings: Vec<Ring>,
}

impl Polygon {
    /// Creates a new polygon.
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    /// Outer boundary.
    pub fn outer_ring(&self) -> Option<&Ring> {
        self.rings.first()
    }

    /// Holes.
    pub fn inner_rings(&self) -> impl Iterator<Item = &Ring> {
        self.rings.iter().skip(1)
    }
}

/// Set of points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiPoint {
    /// Points.
    pub points: Vec<Point2d>,
}

/// Set of line strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiLineString {
    /// Lines.
    pub lines: Vec<LineString>,
}

/// Set of polygons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    /// Polygons.
    pub polygons: Vec<Polygon>,
}

/// Maximum nesting of geometry collections accepted by the WKT and WKB readers.
pub const MAX_COLLECTION_DEPTH: usize = 128;

/// A geometry read from a spatial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Single point.
    Point(Point2d),
    /// Line string.
    LineString(LineString),
    /// Polygon with optional holes.
    Polygon(Polygon),
    /// Multi point.
    MultiPoint(MultiPoint),
    /// Multi line string.
    MultiLineString(MultiLineString),
    /// Multi polygon.
    MultiPolygon(MultiPolygon),
    /// Heterogeneous collection, may be nested.
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// Reads a geometry from WKT text. See [`wkt`] for the accepted syntax.
    pub fn from_wkt(text: &str) -> Result<Self, GisTypesError> {
        Ok(wkt::parse(text)?.to_geometry())
    }

    /// Reads a geometry from WKB bytes.
    pub fn from_wkb(bytes: &[u8]) -> Result<Self, GisTypesError> {
        wkb::read(bytes)
    }

    /// Canonical WKT text of the geometry.
    pub fn to_wkt(&self) -> String {
        self.to_string()
    }

    /// Type tag of the geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// Iterates over every coordinate of the geometry, including repeated closing points of rings.
    pub fn iter_points(&self) -> Box<dyn Iterator<Item = &Point2d> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(p)),
            Geometry::LineString(line) => Box::new(line.points.iter()),
            Geometry::Polygon(polygon) => Box::new(polygon_points(polygon)),
            Geometry::MultiPoint(mp) => Box::new(mp.points.iter()),
            Geometry::MultiLineString(ml) => {
                Box::new(ml.lines.iter().flat_map(|line| line.points.iter()))
            }
            Geometry::MultiPolygon(mp) => Box::new(mp.polygons.iter().flat_map(polygon_points)),
            Geometry::GeometryCollection(members) => {
                Box::new(members.iter().flat_map(|member| member.iter_points()))
            }
        }
    }

    /// Returns true if the geometry has no coordinates.
    pub fn is_empty(&self) -> bool {
        self.iter_points().next().is_none()
    }

    /// Coordinate envelope of the geometry, the input of the scaling engine. `None` for empty geometries.
    pub fn scale_row(&self) -> Option<Rect> {
        Rect::from_points(self.iter_points())
    }
}

fn polygon_points(polygon: &Polygon) -> impl Iterator<Item = &Point2d> {
    polygon.rings.iter().flat_map(|ring| ring.points.iter())
}

impl FromStr for Geometry {
    type Err = GisTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wkt(s)
    }
}

impl From<Point2d> for Geometry {
    fn from(value: Point2d) -> Self {
        Self::Point(value)
    }
}

impl From<LineString> for Geometry {
    fn from(value: LineString) -> Self {
        Self::LineString(value)
    }
}

impl From<Polygon> for Geometry {
    fn from(value: Polygon) -> Self {
        Self::Polygon(value)
    }
}

impl From<MultiPoint> for Geometry {
    fn from(value: MultiPoint) -> Self {
        Self::MultiPoint(value)
    }
}

impl From<MultiLineString> for Geometry {
    fn from(value: MultiLineString) -> Self {
        Self::MultiLineString(value)
    }
}

impl From<MultiPolygon> for Geometry {
    fn from(value: MultiPolygon) -> Self {
        Self::MultiPolygon(value)
    }
}

/// Geometry together with its spatial reference identifier, as stored in a database column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialValue {
    /// The geometry.
    pub geometry: Geometry,
    /// Spatial reference identifier, `0` when not specified.
    pub srid: u32,
}

impl SpatialValue {
    /// Creates a new value.
    pub fn new(geometry: Geometry, srid: u32) -> Self {
        Self { geometry, srid }
    }

    /// Reads a value written either as bare WKT or as `'WKT',SRID`.
    pub fn parse(value: &str) -> Result<Self, GisTypesError> {
        let (text, srid) = wkt::split_srid(value);
        Ok(Self {
            geometry: Geometry::from_wkt(text)?,
            srid,
        })
    }

    /// Reads a value in the MySQL internal geometry format: a 4-byte little-endian SRID followed by WKB.
    pub fn from_mysql(bytes: &[u8]) -> Result<Self, GisTypesError> {
        wkb::read_mysql(bytes)
    }
}

impl FromStr for SpatialValue {
    type Err = GisTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
