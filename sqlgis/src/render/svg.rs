//! SVG elements of a row.

use std::fmt::Write;

use sqlgis_types::cartesian::Point2d;
use sqlgis_types::{Geometry, Polygon};

use super::{ring_to_screen, to_screen};
use crate::{ScaleTransform, Style};

const FILL_OPACITY: &str = "0.8";

/// Source of the numeric part of SVG element ids.
///
/// Ids only need to be unique within a document, so a sequence owned by the caller keeps the output
/// reproducible.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSequence {
    /// Creates a sequence returning `first` first.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Returns the next id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Writes the SVG elements of a geometry.
///
/// Polygons become `<path>` elements with the even-odd fill rule, lines `<polyline>` elements and points
/// `<circle>` elements. Multi geometries produce one element per member, except multipolygons which are drawn as
/// a single path. Every element carries the label as `name` and the label followed by an id from `ids` as `id`.
pub fn prepare_row_as_svg(
    geometry: &Geometry,
    style: &Style,
    transform: &ScaleTransform,
    ids: &mut IdSequence,
) -> String {
    let mut out = String::new();
    write_geometry(&mut out, geometry, style, transform, ids);
    out
}

fn write_geometry(
    out: &mut String,
    geometry: &Geometry,
    style: &Style,
    transform: &ScaleTransform,
    ids: &mut IdSequence,
) {
    match geometry {
        Geometry::Point(p) => write_circle(out, p, "point vector", style, transform, ids),
        Geometry::MultiPoint(mp) => {
            for p in &mp.points {
                write_circle(out, p, "multipoint vector", style, transform, ids);
            }
        }
        Geometry::LineString(line) => {
            write_polyline(out, &line.points, style, transform, ids)
        }
        Geometry::MultiLineString(ml) => {
            for line in &ml.lines {
                write_polyline(out, &line.points, style, transform, ids);
            }
        }
        Geometry::Polygon(polygon) => write_path(
            out,
            std::slice::from_ref(polygon),
            "polygon vector",
            style,
            transform,
            ids,
        ),
        Geometry::MultiPolygon(mp) => write_path(
            out,
            &mp.polygons,
            "multipolygon vector",
            style,
            transform,
            ids,
        ),
        Geometry::GeometryCollection(members) => {
            for member in members {
                write_geometry(out, member, style, transform, ids);
            }
        }
    }
}

fn write_circle(
    out: &mut String,
    point: &Point2d,
    class: &str,
    style: &Style,
    transform: &ScaleTransform,
    ids: &mut IdSequence,
) {
    let p = transform.apply(point);
    let color = style.color.to_css_hex();
    let _ = write!(out, r#"<circle cx="{}" cy="{}" r="3""#, p.x, p.y);
    write_attributes(
        out,
        style,
        ids,
        &[
            ("class", class),
            ("fill", "white"),
            ("stroke", color.as_str()),
            ("stroke-width", "2"),
        ],
    );
}

fn write_polyline(
    out: &mut String,
    points: &[Point2d],
    style: &Style,
    transform: &ScaleTransform,
    ids: &mut IdSequence,
) {
    let color = style.color.to_css_hex();
    out.push_str(r#"<polyline points=""#);
    for p in to_screen(points, transform) {
        let _ = write!(out, "{},{} ", p.x, p.y);
    }
    out.push('"');
    write_attributes(
        out,
        style,
        ids,
        &[
            ("class", "linestring vector"),
            ("fill", "none"),
            ("stroke", color.as_str()),
            ("stroke-width", "2"),
        ],
    );
}

fn write_path(
    out: &mut String,
    polygons: &[Polygon],
    class: &str,
    style: &Style,
    transform: &ScaleTransform,
    ids: &mut IdSequence,
) {
    let color = style.color.to_css_hex();
    out.push_str(r#"<path d=""#);
    for ring in polygons.iter().flat_map(|polygon| &polygon.rings) {
        let points = ring_to_screen(ring, transform);
        let Some((first, rest)) = points.split_first() else {
            continue;
        };

        let _ = write!(out, " M {}, {}", first.x, first.y);
        for p in rest {
            let _ = write!(out, " L {}, {}", p.x, p.y);
        }
        out.push_str(" Z ");
    }
    out.push('"');

    write_attributes(
        out,
        style,
        ids,
        &[
            ("class", class),
            ("stroke", "black"),
            ("stroke-width", "0.5"),
            ("fill", color.as_str()),
            ("fill-rule", "evenodd"),
            ("fill-opacity", FILL_OPACITY),
        ],
    );
}

/// Writes `name`, `id` and the given attributes, then closes the element.
fn write_attributes(out: &mut String, style: &Style, ids: &mut IdSequence, attributes: &[(&str, &str)]) {
    let label = xml_escape(style.label_or_empty());
    let _ = write!(out, r#" name="{label}" id="{label}{}""#, ids.next_id());
    for (name, value) in attributes {
        let _ = write!(out, r#" {name}="{}""#, xml_escape(value));
    }
    out.push_str("/>");
}

/// Escapes the XML special characters of an attribute value.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn purple(label: &str) -> Style {
        Style::new(Color::rgb(176, 46, 224)).with_label(label)
    }

    #[test]
    fn polygon_with_hole() {
        let geometry =
            Geometry::from_wkt("POLYGON((123 0,23 30,17 63,123 0),(99 12,30 35,25 55,99 12))")
                .unwrap();
        let transform = ScaleTransform::new(12.0, 69.0, 2.0, 150.0);
        let mut ids = IdSequence::starting_at(1234567890);

        assert_eq!(
            prepare_row_as_svg(&geometry, &purple("svg"), &transform, &mut ids),
            r##"<path d=" M 222, 288 L 22, 228 L 10, 162 Z  M 174, 264 L 36, 218 L 26, 178 Z " name="svg" id="svg1234567890" class="polygon vector" stroke="black" stroke-width="0.5" fill="#b02ee0" fill-rule="evenodd" fill-opacity="0.8"/>"##
        );
    }

    #[test]
    fn point_and_line() {
        let transform = ScaleTransform::new(0.0, 0.0, 1.0, 100.0);
        let mut ids = IdSequence::starting_at(7);

        let point = Geometry::from_wkt("POINT(10 20)").unwrap();
        assert_eq!(
            prepare_row_as_svg(&point, &purple("p"), &transform, &mut ids),
            r##"<circle cx="10" cy="80" r="3" name="p" id="p7" class="point vector" fill="white" stroke="#b02ee0" stroke-width="2"/>"##
        );

        let line = Geometry::from_wkt("LINESTRING(0 0,10 10)").unwrap();
        assert_eq!(
            prepare_row_as_svg(&line, &purple(""), &transform, &mut ids),
            r##"<polyline points="0,100 10,90 " name="" id="8" class="linestring vector" fill="none" stroke="#b02ee0" stroke-width="2"/>"##
        );
    }

    #[test]
    fn multi_geometries() {
        let transform = ScaleTransform::new(0.0, 0.0, 1.0, 100.0);
        let mut ids = IdSequence::default();

        let multi_point = Geometry::from_wkt("MULTIPOINT(1 1,2 2,3 3)").unwrap();
        let svg = prepare_row_as_svg(&multi_point, &purple("mp"), &transform, &mut ids);
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("class=\"multipoint vector\"").count(), 3);
        assert!(svg.contains("id=\"mp3\""));

        let multi_polygon =
            Geometry::from_wkt("MULTIPOLYGON(((0 0,0 1,1 1,0 0)),((5 5,5 6,6 6,5 5)))").unwrap();
        let svg = prepare_row_as_svg(&multi_polygon, &purple("mp"), &transform, &mut ids);
        assert_eq!(svg.matches("<path").count(), 1);
        assert_eq!(svg.matches(" Z ").count(), 2);
        assert!(svg.contains("class=\"multipolygon vector\""));

        let collection =
            Geometry::from_wkt("GEOMETRYCOLLECTION(POINT(1 1),LINESTRING(0 0,1 1))").unwrap();
        let svg = prepare_row_as_svg(&collection, &purple("c"), &transform, &mut ids);
        assert!(svg.starts_with("<circle"));
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn label_is_escaped() {
        let transform = ScaleTransform::new(0.0, 0.0, 1.0, 100.0);
        let mut ids = IdSequence::starting_at(1);
        let point = Geometry::from_wkt("POINT(0 0)").unwrap();

        let svg = prepare_row_as_svg(&point, &purple("a\"<b>"), &transform, &mut ids);
        assert!(svg.contains(r#"name="a&quot;&lt;b&gt;" id="a&quot;&lt;b&gt;1""#));
    }
}
