//! Legacy structured representation of a geometry used by the geometry editor form.
//!
//! A form posts, per geometry, the number of elements at every nesting level (`no_of_points`, `no_of_lines`,
//! `no_of_polygons`) together with indexed `x`/`y` values. Any of those may be missing: counts fall back to the
//! minimum for the kind and missing coordinate components are written as the caller-provided `empty` text, so
//! [`GeometryKind::generate_wkt`] never fails.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::GisTypesError;
use crate::geometry::GeometryKind;
use crate::wkt::{self, WktCoord, WktGeometry};

/// A sequence of points: a line string, a multipoint or a polygon ring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointsParams {
    /// Declared number of points.
    pub no_of_points: Option<usize>,
    /// Point values by index.
    pub points: Vec<WktCoord>,
}

/// A sequence of point sequences: a polygon or a multi line string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinesParams {
    /// Declared number of lines (or rings).
    pub no_of_lines: Option<usize>,
    /// Lines by index.
    pub lines: Vec<PointsParams>,
}

/// Polygons of a multipolygon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygonParams {
    /// Declared number of polygons.
    pub no_of_polygons: Option<usize>,
    /// Polygons by index.
    pub polygons: Vec<LinesParams>,
}

/// Form values of a single, non-collection geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometryParams {
    /// Point values.
    Point(WktCoord),
    /// Line string values.
    LineString(PointsParams),
    /// Polygon values.
    Polygon(LinesParams),
    /// Multipoint values.
    MultiPoint(PointsParams),
    /// Multi line string values.
    MultiLineString(LinesParams),
    /// Multipolygon values.
    MultiPolygon(MultiPolygonParams),
}

impl GeometryParams {
    /// Decomposes a parsed geometry. Returns `None` for collections, which are flattened into [`GisData`] entries
    /// instead.
    pub fn from_wkt(geometry: &WktGeometry) -> Option<Self> {
        Some(match geometry {
            WktGeometry::Point(coord) => GeometryParams::Point(coord.unwrap_or_default()),
            WktGeometry::LineString(coords) => GeometryParams::LineString(points_params(coords)),
            WktGeometry::Polygon(rings) => GeometryParams::Polygon(lines_params(rings)),
            WktGeometry::MultiPoint(coords) => GeometryParams::MultiPoint(points_params(coords)),
            WktGeometry::MultiLineString(lines) => {
                GeometryParams::MultiLineString(lines_params(lines))
            }
            WktGeometry::MultiPolygon(polygons) => GeometryParams::MultiPolygon(MultiPolygonParams {
                no_of_polygons: Some(polygons.len()),
                polygons: polygons.iter().map(|rings| lines_params(rings)).collect(),
            }),
            WktGeometry::GeometryCollection(_) => return None,
        })
    }
}

fn points_params(coords: &[WktCoord]) -> PointsParams {
    PointsParams {
        no_of_points: Some(coords.len()),
        points: coords.to_vec(),
    }
}

fn lines_params(lines: &[Vec<WktCoord>]) -> LinesParams {
    LinesParams {
        no_of_lines: Some(lines.len()),
        lines: lines.iter().map(|line| points_params(line)).collect(),
    }
}

/// One indexed geometry of the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GisEntry {
    /// Type of the geometry. Set only for members of a geometry collection.
    pub gis_type: Option<GeometryKind>,
    /// Values of the geometry.
    pub params: Option<GeometryParams>,
}

/// Structured form data of a spatial value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GisData {
    /// Spatial reference identifier.
    pub srid: u32,
    /// Number of members, for geometry collections.
    pub geom_count: Option<usize>,
    /// Geometries by index.
    pub entries: Vec<GisEntry>,
}

impl GisData {
    /// Decomposes a value written either as bare WKT or as `'WKT',SRID`.
    pub fn generate_params(value: &str) -> Result<Self, GisTypesError> {
        let (text, srid) = wkt::split_srid(value);
        let geometry = wkt::parse(text)?;

        let entries: Vec<GisEntry> = match &geometry {
            WktGeometry::GeometryCollection(members) => members
                .iter()
                .filter_map(|member| match GeometryParams::from_wkt(member) {
                    Some(params) => Some(GisEntry {
                        gis_type: Some(member.kind()),
                        params: Some(params),
                    }),
                    None => {
                        debug!("Nested geometry collection has no form representation, skipping");
                        None
                    }
                })
                .collect(),
            other => vec![GisEntry {
                gis_type: None,
                params: GeometryParams::from_wkt(other),
            }],
        };

        let geom_count = match geometry {
            WktGeometry::GeometryCollection(_) => Some(entries.len()),
            _ => None,
        };

        Ok(Self {
            srid,
            geom_count,
            entries,
        })
    }

    fn params(&self, index: usize) -> Option<&GeometryParams> {
        self.entries.get(index).and_then(|entry| entry.params.as_ref())
    }
}

const MIN_LINE_STRING_POINTS: usize = 2;
const MIN_MULTI_POINT_POINTS: usize = 1;
const MIN_RING_POINTS: usize = 4;

impl GeometryKind {
    /// Writes the geometry at `index` of the form data as WKT, with `empty` in place of every missing coordinate
    /// component.
    ///
    /// Missing or too small counts are raised to the minimum of the kind: 2 points for a line string, 1 for a
    /// multipoint, 1 line of 2 points for a multi line string, 1 ring of 4 points for a polygon, 1 polygon for a
    /// multipolygon. A geometry collection writes `geom_count` (default 1) entries starting from the first one and
    /// skips entries without a type.
    pub fn generate_wkt(&self, data: &GisData, index: usize, empty: &str) -> String {
        let params = data.params(index);
        let mut out = String::from(self.keyword());

        match self {
            GeometryKind::Point => {
                let coord = match params {
                    Some(GeometryParams::Point(coord)) => Some(coord),
                    _ => None,
                };
                out.push('(');
                push_coord(&mut out, coord, empty);
                out.push(')');
            }
            GeometryKind::LineString => {
                let points = match params {
                    Some(GeometryParams::LineString(points)) => Some(points),
                    _ => None,
                };
                push_points(&mut out, points, MIN_LINE_STRING_POINTS, empty);
            }
            GeometryKind::MultiPoint => {
                let points = match params {
                    Some(GeometryParams::MultiPoint(points)) => Some(points),
                    _ => None,
                };
                push_points(&mut out, points, MIN_MULTI_POINT_POINTS, empty);
            }
            GeometryKind::Polygon => {
                let rings = match params {
                    Some(GeometryParams::Polygon(rings)) => Some(rings),
                    _ => None,
                };
                push_lines(&mut out, rings, MIN_RING_POINTS, empty);
            }
            GeometryKind::MultiLineString => {
                let lines = match params {
                    Some(GeometryParams::MultiLineString(lines)) => Some(lines),
                    _ => None,
                };
                push_lines(&mut out, lines, MIN_LINE_STRING_POINTS, empty);
            }
            GeometryKind::MultiPolygon => {
                let polygons = match params {
                    Some(GeometryParams::MultiPolygon(polygons)) => Some(polygons),
                    _ => None,
                };
                let count = declared_count(polygons.and_then(|p| p.no_of_polygons), 1);
                out.push('(');
                for i in 0..count {
                    if i > 0 {
                        out.push(',');
                    }
                    let rings = polygons.and_then(|p| p.polygons.get(i));
                    push_lines(&mut out, rings, MIN_RING_POINTS, empty);
                }
                out.push(')');
            }
            GeometryKind::GeometryCollection => {
                let count = declared_count(data.geom_count, 1);
                out.push('(');
                let mut first = true;
                for (i, entry) in data.entries.iter().enumerate().take(count) {
                    let Some(kind) = entry.gis_type else {
                        continue;
                    };
                    if kind == GeometryKind::GeometryCollection {
                        debug!("Skipping nested geometry collection at index {i}");
                        continue;
                    }
                    if !first {
                        out.push(',');
                    }
                    first = false;
                    out.push_str(&kind.generate_wkt(data, i, empty));
                }
                out.push(')');
            }
        }

        out
    }

    /// Decomposes a value of this kind into form data. Fails if the value is of another kind.
    pub fn generate_params(&self, value: &str) -> Result<GisData, GisTypesError> {
        let (text, _) = wkt::split_srid(value);
        let found = wkt::parse(text)?.kind();
        if found != *self {
            return Err(GisTypesError::Parse {
                offset: 0,
                message: format!("expected {self}, found {found}"),
            });
        }

        GisData::generate_params(value)
    }
}

fn declared_count(declared: Option<usize>, min: usize) -> usize {
    declared.unwrap_or(min).max(min)
}

fn push_component(out: &mut String, value: Option<f64>, empty: &str) {
    match value {
        Some(v) => out.push_str(&v.to_string()),
        None => out.push_str(empty),
    }
}

fn push_coord(out: &mut String, coord: Option<&WktCoord>, empty: &str) {
    push_component(out, coord.and_then(|c| c.x), empty);
    out.push(' ');
    push_component(out, coord.and_then(|c| c.y), empty);
}

fn push_points(out: &mut String, params: Option<&PointsParams>, min: usize, empty: &str) {
    let count = declared_count(params.and_then(|p| p.no_of_points), min);
    out.push('(');
    for i in 0..count {
        if i > 0 {
            out.push(',');
        }
        push_coord(out, params.and_then(|p| p.points.get(i)), empty);
    }
    out.push(')');
}

fn push_lines(out: &mut String, params: Option<&LinesParams>, min_points: usize, empty: &str) {
    let count = declared_count(params.and_then(|p| p.no_of_lines), 1);
    out.push('(');
    for i in 0..count {
        if i > 0 {
            out.push(',');
        }
        push_points(out, params.and_then(|p| p.lines.get(i)), min_points, empty);
    }
    out.push(')');
}
