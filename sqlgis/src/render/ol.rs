//! OpenLayers script of a row.
//!
//! The script adds one feature per geometry to a `vectorSource` variable defined by the page. Coordinates are
//! written as they are stored and reprojected by OpenLayers from the row SRID to web mercator.

use std::fmt::Write;

use serde_json::json;
use sqlgis_types::cartesian::Point2d;
use sqlgis_types::{Geometry, GeometryKind, Polygon};

use crate::Style;

/// SRID used for values stored without one.
pub const DEFAULT_SRID: u32 = 4326;

/// Writes the OpenLayers statements adding the geometry to `vectorSource`.
///
/// Members of a geometry collection are added as separate features with the same style.
pub fn prepare_row_as_ol(geometry: &Geometry, srid: u32, style: &Style) -> String {
    let srid = if srid == 0 { DEFAULT_SRID } else { srid };
    let mut out = String::new();
    write_feature(&mut out, geometry, srid, style);
    out
}

fn write_feature(out: &mut String, geometry: &Geometry, srid: u32, style: &Style) {
    if let Geometry::GeometryCollection(members) = geometry {
        for member in members {
            write_feature(out, member, srid, style);
        }
        return;
    }

    let _ = write!(
        out,
        "var feature = new ol.Feature(new ol.geom.{}({}).transform('EPSG:{srid}', 'EPSG:3857'));",
        ol_type(geometry.kind()),
        coordinates(geometry),
    );
    let _ = write!(out, "feature.setStyle({});", ol_style(geometry.kind(), style));
    out.push_str("vectorSource.addFeature(feature);");
}

fn ol_type(kind: GeometryKind) -> &'static str {
    match kind {
        GeometryKind::Point => "Point",
        GeometryKind::LineString => "LineString",
        GeometryKind::Polygon => "Polygon",
        GeometryKind::MultiPoint => "MultiPoint",
        GeometryKind::MultiLineString => "MultiLineString",
        GeometryKind::MultiPolygon => "MultiPolygon",
        GeometryKind::GeometryCollection => "GeometryCollection",
    }
}

fn coordinates(geometry: &Geometry) -> String {
    let mut out = String::new();
    match geometry {
        Geometry::Point(p) => write_point(&mut out, p),
        Geometry::LineString(line) => write_points(&mut out, &line.points),
        Geometry::MultiPoint(mp) => write_points(&mut out, &mp.points),
        Geometry::Polygon(polygon) => write_polygon(&mut out, polygon),
        Geometry::MultiLineString(ml) => {
            write_array(&mut out, &ml.lines, |out, line| write_points(out, &line.points))
        }
        Geometry::MultiPolygon(mp) => write_array(&mut out, &mp.polygons, write_polygon),
        Geometry::GeometryCollection(_) => out.push_str("[]"),
    }
    out
}

fn write_point(out: &mut String, p: &Point2d) {
    let _ = write!(out, "[{},{}]", p.x, p.y);
}

fn write_points(out: &mut String, points: &[Point2d]) {
    write_array(out, points, write_point);
}

fn write_polygon(out: &mut String, polygon: &Polygon) {
    write_array(out, &polygon.rings, |out, ring| write_points(out, &ring.points));
}

fn write_array<T>(out: &mut String, items: &[T], mut write_item: impl FnMut(&mut String, &T)) {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_item(out, item);
    }
    out.push(']');
}

fn ol_style(kind: GeometryKind, style: &Style) -> String {
    let [r, g, b] = style.color.to_rgb_array();
    let mut parts = vec![];

    match kind {
        GeometryKind::Polygon | GeometryKind::MultiPolygon => {
            parts.push(format!(
                "fill: new ol.style.Fill({})",
                json!({ "color": [r, g, b, 0.8] })
            ));
            parts.push(format!(
                "stroke: new ol.style.Stroke({})",
                json!({ "color": [0, 0, 0], "width": 0.5 })
            ));
        }
        GeometryKind::LineString | GeometryKind::MultiLineString => {
            parts.push(format!(
                "stroke: new ol.style.Stroke({})",
                json!({ "color": [r, g, b], "width": 2 })
            ));
        }
        GeometryKind::Point | GeometryKind::MultiPoint => {
            parts.push(format!(
                "image: new ol.style.Circle({{fill: new ol.style.Fill({}),stroke: new ol.style.Stroke({}),radius: 3}})",
                json!({ "color": "white" }),
                json!({ "color": [r, g, b], "width": 2 })
            ));
        }
        GeometryKind::GeometryCollection => {}
    }

    if let Some(label) = style.label() {
        let text = match kind {
            GeometryKind::Point | GeometryKind::MultiPoint => {
                json!({ "text": label, "offsetY": -9 })
            }
            _ => json!({ "text": label }),
        };
        parts.push(format!("text: new ol.style.Text({text})"));
    }

    format!("new ol.style.Style({{{}}})", parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn purple(label: &str) -> Style {
        Style::new(Color::rgb(176, 46, 224)).with_label(label)
    }

    #[test]
    fn polygon() {
        let geometry = Geometry::from_wkt("POLYGON((123 0,23 30,17 63,123 0))").unwrap();

        assert_eq!(
            prepare_row_as_ol(&geometry, 4326, &purple("Ol")),
            "var feature = new ol.Feature(new ol.geom.Polygon([[[123,0],[23,30],[17,63],[123,0]]]).transform('EPSG:4326', 'EPSG:3857'));feature.setStyle(new ol.style.Style({fill: new ol.style.Fill({\"color\":[176,46,224,0.8]}),stroke: new ol.style.Stroke({\"color\":[0,0,0],\"width\":0.5}),text: new ol.style.Text({\"text\":\"Ol\"})}));vectorSource.addFeature(feature);"
        );
    }

    #[test]
    fn default_srid_and_no_label() {
        let geometry = Geometry::from_wkt("LINESTRING(1.5 2,3 4)").unwrap();

        assert_eq!(
            prepare_row_as_ol(&geometry, 0, &purple("  ")),
            "var feature = new ol.Feature(new ol.geom.LineString([[1.5,2],[3,4]]).transform('EPSG:4326', 'EPSG:3857'));feature.setStyle(new ol.style.Style({stroke: new ol.style.Stroke({\"color\":[176,46,224],\"width\":2})}));vectorSource.addFeature(feature);"
        );
    }

    #[test]
    fn point_style() {
        let geometry = Geometry::from_wkt("POINT(10 -20)").unwrap();
        let script = prepare_row_as_ol(&geometry, 3857, &purple("p"));

        assert!(script.contains("new ol.geom.Point([10,-20]).transform('EPSG:3857', 'EPSG:3857')"));
        assert!(script.contains("image: new ol.style.Circle({fill: new ol.style.Fill({\"color\":\"white\"}),stroke: new ol.style.Stroke({\"color\":[176,46,224],\"width\":2}),radius: 3})"));
        assert!(script.contains("\"offsetY\":-9"));
    }

    #[test]
    fn collection_adds_each_member() {
        let geometry = Geometry::from_wkt(
            "GEOMETRYCOLLECTION(POINT(1 2),MULTIPOLYGON(((0 0,0 1,1 1,0 0))),MULTILINESTRING((0 0,1 1)))",
        )
        .unwrap();
        let script = prepare_row_as_ol(&geometry, 4326, &purple("c"));

        assert_eq!(script.matches("vectorSource.addFeature(feature);").count(), 3);
        assert!(script.contains("new ol.geom.MultiPolygon([[[[0,0],[0,1],[1,1],[0,0]]]])"));
        assert!(script.contains("new ol.geom.MultiLineString([[[0,0],[1,1]]])"));
    }
}
