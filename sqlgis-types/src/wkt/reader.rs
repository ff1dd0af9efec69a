use log::debug;
use serde::{Deserialize, Serialize};

use crate::cartesian::Point2d;
use crate::error::GisTypesError;
use crate::geometry::{
    Geometry, GeometryKind, LineString, MultiLineString, MultiPoint, MultiPolygon, Polygon,
    MAX_COLLECTION_DEPTH,
};
use crate::ring::Ring;

/// Coordinate tuple as written in the text. A component is `None` if it was missing or not a finite number.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WktCoord {
    /// X component.
    pub x: Option<f64>,
    /// Y component.
    pub y: Option<f64>,
}

impl WktCoord {
    /// Creates a coordinate with both components present.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    /// Point with both components, or `(0, 0)` if any of them is missing.
    pub fn to_point(&self) -> Point2d {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Point2d::new(x, y),
            _ => Point2d::new(0.0, 0.0),
        }
    }
}

/// Raw result of reading WKT text. Mirrors [`Geometry`] but keeps missing coordinate components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WktGeometry {
    /// `POINT(x y)`. `None` for `POINT EMPTY`.
    Point(Option<WktCoord>),
    /// `LINESTRING(x y,...)`.
    LineString(Vec<WktCoord>),
    /// `POLYGON((x y,...),...)`.
    Polygon(Vec<Vec<WktCoord>>),
    /// `MULTIPOINT(x y,...)` or `MULTIPOINT((x y),...)`.
    MultiPoint(Vec<WktCoord>),
    /// `MULTILINESTRING((x y,...),...)`.
    MultiLineString(Vec<Vec<WktCoord>>),
    /// `MULTIPOLYGON(((x y,...),...),...)`.
    MultiPolygon(Vec<Vec<Vec<WktCoord>>>),
    /// `GEOMETRYCOLLECTION(...)`.
    GeometryCollection(Vec<WktGeometry>),
}

impl WktGeometry {
    /// Type tag.
    pub fn kind(&self) -> GeometryKind {
        match self {
            WktGeometry::Point(_) => GeometryKind::Point,
            WktGeometry::LineString(_) => GeometryKind::LineString,
            WktGeometry::Polygon(_) => GeometryKind::Polygon,
            WktGeometry::MultiPoint(_) => GeometryKind::MultiPoint,
            WktGeometry::MultiLineString(_) => GeometryKind::MultiLineString,
            WktGeometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            WktGeometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    fn empty(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Point => WktGeometry::Point(None),
            GeometryKind::LineString => WktGeometry::LineString(vec![]),
            GeometryKind::Polygon => WktGeometry::Polygon(vec![]),
            GeometryKind::MultiPoint => WktGeometry::MultiPoint(vec![]),
            GeometryKind::MultiLineString => WktGeometry::MultiLineString(vec![]),
            GeometryKind::MultiPolygon => WktGeometry::MultiPolygon(vec![]),
            GeometryKind::GeometryCollection => WktGeometry::GeometryCollection(vec![]),
        }
    }

    /// Converts into the geometry model. Points with a missing component become `(0, 0)`.
    pub fn to_geometry(&self) -> Geometry {
        match self {
            WktGeometry::Point(coord) => {
                Geometry::Point(coord.map(|c| c.to_point()).unwrap_or(Point2d::new(0.0, 0.0)))
            }
            WktGeometry::LineString(coords) => Geometry::LineString(to_line(coords)),
            WktGeometry::Polygon(rings) => Geometry::Polygon(to_polygon(rings)),
            WktGeometry::MultiPoint(coords) => Geometry::MultiPoint(MultiPoint {
                points: to_points(coords),
            }),
            WktGeometry::MultiLineString(lines) => Geometry::MultiLineString(MultiLineString {
                lines: lines.iter().map(|line| to_line(line)).collect(),
            }),
            WktGeometry::MultiPolygon(polygons) => Geometry::MultiPolygon(MultiPolygon {
                polygons: polygons.iter().map(|rings| to_polygon(rings)).collect(),
            }),
            WktGeometry::GeometryCollection(members) => {
                Geometry::GeometryCollection(members.iter().map(Self::to_geometry).collect())
            }
        }
    }
}

fn to_points(coords: &[WktCoord]) -> Vec<Point2d> {
    coords.iter().map(WktCoord::to_point).collect()
}

fn to_line(coords: &[WktCoord]) -> LineString {
    LineString {
        points: to_points(coords),
    }
}

fn to_polygon(rings: &[Vec<WktCoord>]) -> Polygon {
    Polygon::new(rings.iter().map(|ring| Ring::new(to_points(ring))).collect())
}

/// Reads WKT text.
///
/// Fails with [`GisTypesError::UnknownGeometryType`] if the leading keyword is not one of the seven supported
/// kinds, and with [`GisTypesError::Parse`] if the parentheses are missing or unbalanced, or if geometry
/// collections are nested deeper than [`MAX_COLLECTION_DEPTH`].
pub fn parse(text: &str) -> Result<WktGeometry, GisTypesError> {
    let mut reader = WktReader::new(text);
    let geometry = reader.read_geometry()?;

    reader.skip_whitespace();
    if !reader.is_at_end() {
        debug!(
            "Ignoring trailing text at offset {}: {:?}",
            reader.pos,
            reader.rest()
        );
    }

    Ok(geometry)
}

struct WktReader<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> WktReader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> GisTypesError {
        GisTypesError::Parse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: u8) -> Result<(), GisTypesError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!(
                "expected '{}', found '{}'",
                expected as char, c as char
            ))),
            None => Err(self.error(format!("expected '{}', found end of text", expected as char))),
        }
    }

    /// Consumes `,` and returns true, or consumes `)` and returns false.
    fn next_in_list(&mut self) -> Result<bool, GisTypesError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b',') => {
                self.pos += 1;
                Ok(true)
            }
            Some(b')') => {
                self.pos += 1;
                Ok(false)
            }
            Some(c) => Err(self.error(format!("expected ',' or ')', found '{}'", c as char))),
            None => Err(self.error("unclosed parenthesis")),
        }
    }

    /// Consumes `)` if it immediately follows, used for `()` lists.
    fn close_if_empty(&mut self) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(b')') {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn read_word(&mut self) -> &'a str {
        self.skip_whitespace();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn read_geometry(&mut self) -> Result<WktGeometry, GisTypesError> {
        let keyword = self.read_word();
        if keyword.is_empty() {
            return Err(self.error("expected geometry keyword"));
        }

        let kind = GeometryKind::from_keyword(keyword)
            .ok_or_else(|| GisTypesError::UnknownGeometryType(keyword.to_string()))?;

        let checkpoint = self.pos;
        if self.read_word().eq_ignore_ascii_case("EMPTY") {
            return Ok(WktGeometry::empty(kind));
        }
        self.pos = checkpoint;

        Ok(match kind {
            GeometryKind::Point => {
                self.expect(b'(')?;
                let coord = self.read_coord();
                self.expect(b')')?;
                WktGeometry::Point(Some(coord))
            }
            GeometryKind::LineString => WktGeometry::LineString(self.read_coord_list()?),
            GeometryKind::Polygon => WktGeometry::Polygon(self.read_ring_list()?),
            GeometryKind::MultiPoint => WktGeometry::MultiPoint(self.read_multi_point()?),
            GeometryKind::MultiLineString => WktGeometry::MultiLineString(self.read_ring_list()?),
            GeometryKind::MultiPolygon => {
                let mut polygons = vec![];
                self.expect(b'(')?;
                if !self.close_if_empty() {
                    loop {
                        polygons.push(self.read_ring_list()?);
                        if !self.next_in_list()? {
                            break;
                        }
                    }
                }
                WktGeometry::MultiPolygon(polygons)
            }
            GeometryKind::GeometryCollection => {
                WktGeometry::GeometryCollection(self.read_collection_members()?)
            }
        })
    }

    fn read_collection_members(&mut self) -> Result<Vec<WktGeometry>, GisTypesError> {
        if self.depth >= MAX_COLLECTION_DEPTH {
            return Err(self.error(format!(
                "geometry collections nested deeper than {MAX_COLLECTION_DEPTH} levels"
            )));
        }

        let mut members = vec![];
        self.expect(b'(')?;
        if self.close_if_empty() {
            return Ok(members);
        }

        self.depth += 1;
        loop {
            members.push(self.read_geometry()?);
            if !self.next_in_list()? {
                break;
            }
        }
        self.depth -= 1;

        Ok(members)
    }

    /// Reads everything up to the next `,` or `)` as a coordinate tuple.
    fn read_coord(&mut self) -> WktCoord {
        let start = self.pos;
        while self.peek().is_some_and(|c| c != b',' && c != b')') {
            self.pos += 1;
        }

        let tuple = &self.src[start..self.pos];
        let mut components = tuple.split_whitespace().map(parse_number);
        let coord = WktCoord {
            x: components.next().flatten(),
            y: components.next().flatten(),
        };

        if coord.x.is_none() || coord.y.is_none() {
            debug!("Incomplete coordinate {:?} at offset {}", tuple.trim(), start);
        }

        coord
    }

    fn read_coord_list(&mut self) -> Result<Vec<WktCoord>, GisTypesError> {
        let mut coords = vec![];
        self.expect(b'(')?;
        if self.close_if_empty() {
            return Ok(coords);
        }

        loop {
            coords.push(self.read_coord());
            if !self.next_in_list()? {
                break;
            }
        }

        Ok(coords)
    }

    fn read_ring_list(&mut self) -> Result<Vec<Vec<WktCoord>>, GisTypesError> {
        let mut rings = vec![];
        self.expect(b'(')?;
        if self.close_if_empty() {
            return Ok(rings);
        }

        loop {
            rings.push(self.read_coord_list()?);
            if !self.next_in_list()? {
                break;
            }
        }

        Ok(rings)
    }

    fn read_multi_point(&mut self) -> Result<Vec<WktCoord>, GisTypesError> {
        let mut coords = vec![];
        self.expect(b'(')?;
        if self.close_if_empty() {
            return Ok(coords);
        }

        loop {
            self.skip_whitespace();
            if self.peek() == Some(b'(') {
                self.pos += 1;
                coords.push(self.read_coord());
                self.expect(b')')?;
            } else {
                coords.push(self.read_coord());
            }

            if !self.next_in_list()? {
                break;
            }
        }

        Ok(coords)
    }
}

fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn point() {
        assert_eq!(
            parse("POINT(1.5 -2)").unwrap(),
            WktGeometry::Point(Some(WktCoord::new(1.5, -2.0)))
        );
        assert_eq!(
            parse("  point ( 3   4 ) ").unwrap(),
            WktGeometry::Point(Some(WktCoord::new(3.0, 4.0)))
        );
        assert_eq!(parse("POINT EMPTY").unwrap(), WktGeometry::Point(None));
    }

    #[test]
    fn missing_components() {
        let WktGeometry::LineString(coords) = parse("LINESTRING(1 2,3,abc 4, )").unwrap() else {
            panic!("line string expected");
        };

        assert_eq!(
            coords,
            vec![
                WktCoord::new(1.0, 2.0),
                WktCoord {
                    x: Some(3.0),
                    y: None
                },
                WktCoord {
                    x: None,
                    y: Some(4.0)
                },
                WktCoord { x: None, y: None },
            ]
        );

        let geometry = parse("LINESTRING(1 2,3)").unwrap().to_geometry();
        assert_eq!(
            geometry,
            Geometry::LineString(LineString {
                points: vec![Point2d::new(1.0, 2.0), Point2d::new(0.0, 0.0)]
            })
        );
    }

    #[test]
    fn non_finite_is_missing() {
        assert_eq!(
            parse("POINT(NaN inf)").unwrap(),
            WktGeometry::Point(Some(WktCoord { x: None, y: None }))
        );
    }

    #[test]
    fn polygon_with_hole() {
        let WktGeometry::Polygon(rings) =
            parse("POLYGON((35 10,10 20,15 40,45 45,35 10),(20 30,35 32,30 20,20 30))").unwrap()
        else {
            panic!("polygon expected");
        };

        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[1][1], WktCoord::new(35.0, 32.0));
    }

    #[test]
    fn multi_point_both_forms() {
        let expected = WktGeometry::MultiPoint(vec![WktCoord::new(1.0, 2.0), WktCoord::new(3.0, 4.0)]);
        assert_eq!(parse("MULTIPOINT(1 2,3 4)").unwrap(), expected);
        assert_eq!(parse("MULTIPOINT((1 2), (3 4))").unwrap(), expected);
    }

    #[test]
    fn multi_polygon() {
        let WktGeometry::MultiPolygon(polygons) =
            parse("MULTIPOLYGON(((0 0,0 1,1 1,0 0)),((5 5,5 6,6 6,5 5),(5.2 5.5,5.4 5.5,5.4 5.8,5.2 5.5)))")
                .unwrap()
        else {
            panic!("multipolygon expected");
        };

        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[1].len(), 2);
    }

    #[test]
    fn nested_collection() {
        let WktGeometry::GeometryCollection(members) = parse(
            "GEOMETRYCOLLECTION(POINT(1 2),GEOMETRYCOLLECTION(LINESTRING(0 0,1 1)),MULTIPOINT EMPTY)",
        )
        .unwrap() else {
            panic!("collection expected");
        };

        assert_eq!(members.len(), 3);
        assert_eq!(members[1].kind(), GeometryKind::GeometryCollection);
        assert_eq!(members[2], WktGeometry::MultiPoint(vec![]));
    }

    #[test]
    fn empty_lists() {
        assert_eq!(parse("LINESTRING()").unwrap(), WktGeometry::LineString(vec![]));
        assert_eq!(parse("POLYGON EMPTY").unwrap(), WktGeometry::Polygon(vec![]));
        assert_eq!(
            parse("GEOMETRYCOLLECTION ( )").unwrap(),
            WktGeometry::GeometryCollection(vec![])
        );
    }

    #[test]
    fn trailing_text_is_ignored() {
        assert_eq!(
            parse("POINT(1 2)) garbage").unwrap(),
            WktGeometry::Point(Some(WktCoord::new(1.0, 2.0)))
        );
    }

    #[test]
    fn errors() {
        assert_matches!(
            parse("CIRCLE(1 2)"),
            Err(GisTypesError::UnknownGeometryType(keyword)) if keyword == "CIRCLE"
        );
        assert_matches!(parse(""), Err(GisTypesError::Parse { offset: 0, .. }));
        assert_matches!(parse("POINT 1 2"), Err(GisTypesError::Parse { .. }));
        assert_matches!(
            parse("POLYGON((0 0,1 1,1 0,0 0)"),
            Err(GisTypesError::Parse { offset: 25, .. })
        );
        assert_matches!(parse("LINESTRING(0 0,1 1"), Err(GisTypesError::Parse { .. }));
    }

    fn nested_collections(depth: usize) -> String {
        format!(
            "{}POINT(1 2){}",
            "GEOMETRYCOLLECTION(".repeat(depth),
            ")".repeat(depth)
        )
    }

    #[test]
    fn collection_depth_is_limited() {
        assert!(parse(&nested_collections(MAX_COLLECTION_DEPTH)).is_ok());
        assert_matches!(
            parse(&nested_collections(MAX_COLLECTION_DEPTH + 1)),
            Err(GisTypesError::Parse { offset, .. }) if offset == MAX_COLLECTION_DEPTH * 19 + 18
        );
        assert_matches!(
            Geometry::from_wkt(&nested_collections(50_000)),
            Err(GisTypesError::Parse { .. })
        );
    }
}
