//! Well-Known Binary reader.
//!
//! Bytes are decoded with the `wkb` crate and converted into the [`Geometry`] model. Z and M values are dropped.
//! Coordinates that are not finite numbers, including the NaN pair of an empty point, are read as `(0, 0)`, the
//! same as missing components in WKT.

use geo_traits::{
    CoordTrait, GeometryCollectionTrait, GeometryTrait, GeometryType, LineStringTrait,
    MultiLineStringTrait, MultiPointTrait, MultiPolygonTrait, PointTrait, PolygonTrait,
};
use wkb::reader::{read_wkb, Wkb};

use crate::cartesian::Point2d;
use crate::error::GisTypesError;
use crate::geometry::{
    Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Polygon, SpatialValue,
    MAX_COLLECTION_DEPTH,
};
use crate::ring::Ring;

const SRID_SIZE: usize = 4;
const HEADER_SIZE: usize = 5;
// Collection headers allowed in the input. Bounds the recursion of the decoder, which runs before the depth of
// the decoded collections can be checked.
const MAX_COLLECTION_HEADERS: usize = 8 * MAX_COLLECTION_DEPTH;

/// Reads a geometry from WKB bytes.
pub fn read(bytes: &[u8]) -> Result<Geometry, GisTypesError> {
    if bytes.len() < HEADER_SIZE {
        return Err(GisTypesError::Wkb(format!(
            "expected at least {HEADER_SIZE} bytes, found {}",
            bytes.len()
        )));
    }
    if collection_headers(bytes) > MAX_COLLECTION_HEADERS {
        return Err(GisTypesError::Wkb(format!(
            "more than {MAX_COLLECTION_HEADERS} geometry collections"
        )));
    }

    let wkb = read_wkb(bytes).map_err(|err| GisTypesError::Wkb(err.to_string()))?;
    to_geometry(&wkb, 0)
}

/// Reads the MySQL internal geometry format: a 4-byte little-endian SRID followed by WKB.
pub fn read_mysql(bytes: &[u8]) -> Result<SpatialValue, GisTypesError> {
    let Some((srid, wkb)) = bytes.split_first_chunk::<SRID_SIZE>() else {
        return Err(GisTypesError::Wkb(format!(
            "expected {SRID_SIZE}-byte SRID, found {} bytes",
            bytes.len()
        )));
    };

    Ok(SpatialValue {
        geometry: read(wkb)?,
        srid: u32::from_le_bytes(*srid),
    })
}

/// Upper bound of the number of geometry collection headers: byte order marker followed by a collection type
/// code of any dimension.
fn collection_headers(bytes: &[u8]) -> usize {
    bytes
        .windows(HEADER_SIZE)
        .filter(|header| {
            let code = [header[1], header[2], header[3], header[4]];
            let type_code = match header[0] {
                0 => u32::from_be_bytes(code),
                1 => u32::from_le_bytes(code),
                _ => return false,
            };
            type_code < 4000 && type_code % 1000 == 7
        })
        .count()
}

fn to_geometry(wkb: &Wkb, depth: usize) -> Result<Geometry, GisTypesError> {
    Ok(match wkb.as_type() {
        GeometryType::Point(p) => Geometry::Point(to_point(p.coord())),
        GeometryType::LineString(line) => Geometry::LineString(LineString {
            points: to_points(line),
        }),
        GeometryType::Polygon(polygon) => Geometry::Polygon(to_polygon(polygon)),
        GeometryType::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint {
            points: mp.points().map(|p| to_point(p.coord())).collect(),
        }),
        GeometryType::MultiLineString(ml) => Geometry::MultiLineString(MultiLineString {
            lines: ml
                .line_strings()
                .map(|line| LineString {
                    points: to_points(line),
                })
                .collect(),
        }),
        GeometryType::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon {
            polygons: mp.polygons().map(to_polygon).collect(),
        }),
        GeometryType::GeometryCollection(collection) => {
            if depth >= MAX_COLLECTION_DEPTH {
                return Err(GisTypesError::Wkb(format!(
                    "geometry collections nested deeper than {MAX_COLLECTION_DEPTH} levels"
                )));
            }

            let members = collection
                .geometries()
                .map(|member| to_geometry(member, depth + 1))
                .collect::<Result<_, _>>()?;
            Geometry::GeometryCollection(members)
        }
        _ => {
            return Err(GisTypesError::Wkb(
                "unsupported geometry type".to_string(),
            ))
        }
    })
}

fn to_point(coord: Option<impl CoordTrait<T = f64>>) -> Point2d {
    match coord {
        Some(c) if c.x().is_finite() && c.y().is_finite() => Point2d::new(c.x(), c.y()),
        _ => Point2d::new(0.0, 0.0),
    }
}

fn to_points<L: LineStringTrait<T = f64>>(line: &L) -> Vec<Point2d> {
    line.coords().map(|c| to_point(Some(c))).collect()
}

fn to_polygon<P: PolygonTrait<T = f64>>(polygon: &P) -> Polygon {
    let rings = polygon
        .exterior()
        .into_iter()
        .chain(polygon.interiors())
        .map(|ring| Ring::new(to_points(&ring)))
        .collect();

    Polygon::new(rings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn le_point(x: f64, y: f64) -> Vec<u8> {
        let mut bytes = vec![1, 1, 0, 0, 0];
        bytes.extend_from_slice(&x.to_le_bytes());
        bytes.extend_from_slice(&y.to_le_bytes());
        bytes
    }

    fn le_collection(members: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = vec![1, 7, 0, 0, 0];
        bytes.extend_from_slice(&(members.len() as u32).to_le_bytes());
        for member in members {
            bytes.extend_from_slice(member);
        }
        bytes
    }

    #[test]
    fn point_both_byte_orders() {
        assert_eq!(
            read(&le_point(1.5, -2.0)).unwrap(),
            Geometry::Point(Point2d::new(1.5, -2.0))
        );

        let mut be = vec![0, 0, 0, 0, 1];
        be.extend_from_slice(&1.5f64.to_be_bytes());
        be.extend_from_slice(&(-2.0f64).to_be_bytes());
        assert_eq!(read(&be).unwrap(), Geometry::Point(Point2d::new(1.5, -2.0)));
    }

    #[test]
    fn z_is_dropped() {
        let mut bytes = vec![1, 0xE9, 0x03, 0, 0];
        for v in [1.0f64, 2.0, 3.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        assert_eq!(read(&bytes).unwrap(), Geometry::Point(Point2d::new(1.0, 2.0)));
    }

    #[test]
    fn non_finite_coordinates() {
        let empty_point = le_point(f64::NAN, f64::NAN);
        assert_eq!(read(&empty_point).unwrap().to_wkt(), "POINT(0 0)");
        assert_eq!(
            read(&empty_point).unwrap(),
            Geometry::from_wkt("POINT EMPTY").unwrap()
        );

        let mut line = vec![1, 2, 0, 0, 0, 2, 0, 0, 0];
        for v in [10.0f64, 10.0, f64::INFINITY, 20.0] {
            line.extend_from_slice(&v.to_le_bytes());
        }
        let geometry = read(&line).unwrap();
        assert_eq!(geometry.to_wkt(), "LINESTRING(10 10,0 0)");

        let extent = geometry.scale_row().unwrap();
        assert!(extent.x_max().is_finite() && extent.y_max().is_finite());
    }

    #[test]
    fn polygon() {
        let mut bytes = vec![1, 3, 0, 0, 0, 1, 0, 0, 0, 4, 0, 0, 0];
        for (x, y) in [(0.0f64, 0.0f64), (0.0, 1.0), (1.0, 1.0), (0.0, 0.0)] {
            bytes.extend_from_slice(&x.to_le_bytes());
            bytes.extend_from_slice(&y.to_le_bytes());
        }

        let geometry = read(&bytes).unwrap();
        assert_eq!(geometry.to_wkt(), "POLYGON((0 0,0 1,1 1,0 0))");
    }

    #[test]
    fn multi_point_and_collection() {
        let mut multi_point = vec![1, 4, 0, 0, 0, 2, 0, 0, 0];
        multi_point.extend(le_point(1.0, 2.0));
        multi_point.extend(le_point(3.0, 4.0));
        assert_eq!(read(&multi_point).unwrap().to_wkt(), "MULTIPOINT(1 2,3 4)");

        let collection = le_collection(&[le_point(5.0, 6.0), multi_point]);
        assert_eq!(
            read(&collection).unwrap().to_wkt(),
            "GEOMETRYCOLLECTION(POINT(5 6),MULTIPOINT(1 2,3 4))"
        );
    }

    #[test]
    fn collection_depth_is_limited() {
        let nested = |depth: usize| {
            let mut bytes = [1, 7, 0, 0, 0, 1, 0, 0, 0].repeat(depth);
            bytes.extend(le_point(1.0, 2.0));
            bytes
        };

        assert!(read(&nested(MAX_COLLECTION_DEPTH)).is_ok());
        assert_matches!(
            read(&nested(MAX_COLLECTION_DEPTH + 1)),
            Err(GisTypesError::Wkb(_))
        );
        assert_matches!(read(&nested(50_000)), Err(GisTypesError::Wkb(_)));
    }

    #[test]
    fn mysql_internal_format() {
        let mut bytes = 4326u32.to_le_bytes().to_vec();
        bytes.extend(le_point(10.0, 20.0));

        let value = read_mysql(&bytes).unwrap();
        assert_eq!(value.srid, 4326);
        assert_eq!(value.geometry, Geometry::Point(Point2d::new(10.0, 20.0)));
    }

    #[test]
    fn invalid_input() {
        assert_matches!(read(&[]), Err(GisTypesError::Wkb(_)));
        assert_matches!(read(&[1, 1, 0]), Err(GisTypesError::Wkb(_)));
        assert_matches!(read(&[2, 1, 0, 0, 0]), Err(GisTypesError::Wkb(_)));
        assert_matches!(read(&[1, 99, 0, 0, 0]), Err(GisTypesError::Wkb(_)));
        assert_matches!(read_mysql(&[0, 0]), Err(GisTypesError::Wkb(_)));
    }
}
