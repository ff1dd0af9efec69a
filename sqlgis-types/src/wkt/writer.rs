use std::fmt::{Display, Formatter, Result, Write};

use crate::cartesian::Point2d;
use crate::geometry::{Geometry, Polygon};
use crate::ring::Ring;

impl Display for Geometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let keyword = self.kind().keyword();
        if self.is_empty() {
            return write!(f, "{keyword} EMPTY");
        }

        f.write_str(keyword)?;
        match self {
            Geometry::Point(p) => {
                f.write_char('(')?;
                write_point(f, p)?;
                f.write_char(')')
            }
            Geometry::LineString(line) => write_points(f, &line.points),
            Geometry::Polygon(polygon) => write_polygon(f, polygon),
            Geometry::MultiPoint(mp) => write_points(f, &mp.points),
            Geometry::MultiLineString(ml) => {
                write_list(f, &ml.lines, |f, line| write_points(f, &line.points))
            }
            Geometry::MultiPolygon(mp) => write_list(f, &mp.polygons, write_polygon),
            Geometry::GeometryCollection(members) => {
                write_list(f, members, |f, member| write!(f, "{member}"))
            }
        }
    }
}

fn write_point(f: &mut Formatter<'_>, p: &Point2d) -> Result {
    write!(f, "{} {}", p.x, p.y)
}

fn write_points(f: &mut Formatter<'_>, points: &[Point2d]) -> Result {
    write_list(f, points, write_point)
}

fn write_polygon(f: &mut Formatter<'_>, polygon: &Polygon) -> Result {
    write_list(f, &polygon.rings, |f, ring: &Ring| write_points(f, &ring.points))
}

fn write_list<T>(
    f: &mut Formatter<'_>,
    items: &[T],
    mut write_item: impl FnMut(&mut Formatter<'_>, &T) -> Result,
) -> Result {
    f.write_char('(')?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write_item(f, item)?;
    }
    f.write_char(')')
}

#[cfg(test)]
mod tests {
    use crate::geometry::Geometry;

    fn rewrite(text: &str) -> String {
        Geometry::from_wkt(text).unwrap().to_wkt()
    }

    #[test]
    fn canonical_form() {
        assert_eq!(rewrite("point ( 1.50  -2 )"), "POINT(1.5 -2)");
        assert_eq!(
            rewrite("POLYGON( (35 10, 10 20, 15 40, 45 45, 35 10), (20 30, 35 32, 30 20, 20 30) )"),
            "POLYGON((35 10,10 20,15 40,45 45,35 10),(20 30,35 32,30 20,20 30))"
        );
        assert_eq!(rewrite("MULTIPOINT((1 2),(3 4))"), "MULTIPOINT(1 2,3 4)");
        assert_eq!(
            rewrite("MULTILINESTRING((0 0,1 1),(2 2,3 3))"),
            "MULTILINESTRING((0 0,1 1),(2 2,3 3))"
        );
        assert_eq!(
            rewrite("MULTIPOLYGON(((0 0,0 1,1 1,0 0)),((5 5,5 6,6 6,5 5)))"),
            "MULTIPOLYGON(((0 0,0 1,1 1,0 0)),((5 5,5 6,6 6,5 5)))"
        );
        assert_eq!(
            rewrite("GEOMETRYCOLLECTION(POINT(0.1 0.2),LINESTRING(0 0,1 1))"),
            "GEOMETRYCOLLECTION(POINT(0.1 0.2),LINESTRING(0 0,1 1))"
        );
    }

    #[test]
    fn empty_geometries() {
        assert_eq!(rewrite("LINESTRING EMPTY"), "LINESTRING EMPTY");
        assert_eq!(rewrite("multipolygon empty"), "MULTIPOLYGON EMPTY");
        assert_eq!(rewrite("GEOMETRYCOLLECTION()"), "GEOMETRYCOLLECTION EMPTY");
        assert_eq!(rewrite("POINT EMPTY"), "POINT(0 0)");
    }
}
