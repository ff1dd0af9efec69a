//! Vector document rendering.
//!
//! [`PdfDocument`] collects drawing operations per page in millimeters with the origin in the top-left corner of
//! the page, and converts them to PDF user space (points, origin bottom-left) as they are recorded.

use std::path::Path;

use log::warn;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde::{Deserialize, Serialize};
use sqlgis_types::cartesian::Point2d;
use sqlgis_types::{Geometry, Polygon};

use super::{ring_to_screen, to_screen};
use crate::error::SqlGisError;
use crate::{Color, ScaleTransform, Style};

const POINTS_PER_MM: f64 = 72.0 / 25.4;
const FONT_NAME: &str = "F1";
const LABEL_FONT_SIZE: f64 = 5.0;
const LINE_WIDTH: f64 = 1.5;
const POINT_LINE_WIDTH: f64 = 1.25;
const POINT_RADIUS: f64 = 2.0;
const OUTLINE_WIDTH: f64 = 0.5;
// Control point distance of a cubic Bézier quarter circle.
const KAPPA: f64 = 0.552_284_75;

/// Page size in millimeters.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl PageSize {
    /// ISO A4 portrait.
    pub const A4: PageSize = PageSize {
        width: 210.0,
        height: 297.0,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// PDF document being drawn. Starts with one empty page.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    size: PageSize,
    title: Option<String>,
    pages: Vec<Vec<Operation>>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new(PageSize::A4)
    }
}

impl PdfDocument {
    /// Creates a document with a single page.
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            title: None,
            pages: vec![vec![]],
        }
    }

    /// Creates a new instance from a copy of the current, but with the given document title.
    pub fn with_title(&self, title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..self.clone()
        }
    }

    /// Size of the pages.
    pub fn size(&self) -> PageSize {
        self.size
    }

    /// Starts a new page. Further drawing goes to it.
    pub fn add_page(&mut self) {
        self.pages.push(vec![]);
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Content operations of a page.
    pub fn operations(&self, page: usize) -> Option<&[Operation]> {
        self.pages.get(page).map(Vec::as_slice)
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        if let Some(page) = self.pages.last_mut() {
            page.push(Operation::new(operator, operands));
        }
    }

    fn to_user_space(&self, p: &Point2d) -> (f64, f64) {
        (p.x * POINTS_PER_MM, (self.size.height - p.y) * POINTS_PER_MM)
    }

    fn move_to(&mut self, p: &Point2d) {
        let (x, y) = self.to_user_space(p);
        self.push("m", vec![real(x), real(y)]);
    }

    fn line_to(&mut self, p: &Point2d) {
        let (x, y) = self.to_user_space(p);
        self.push("l", vec![real(x), real(y)]);
    }

    fn set_stroke(&mut self, color: Color, width_mm: f64) {
        let [r, g, b] = color_operands(color);
        self.push("RG", vec![r, g, b]);
        self.push("w", vec![real(width_mm * POINTS_PER_MM)]);
    }

    fn set_fill(&mut self, color: Color) {
        let [r, g, b] = color_operands(color);
        self.push("rg", vec![r, g, b]);
    }

    /// Fills the rings with the even-odd rule and strokes their outline.
    pub fn polygon(&mut self, rings: &[Vec<Point2d>], fill: Color, stroke: Color, stroke_width: f64) {
        self.push("q", vec![]);
        self.set_fill(fill);
        self.set_stroke(stroke, stroke_width);
        for ring in rings {
            let Some((first, rest)) = ring.split_first() else {
                continue;
            };
            self.move_to(first);
            for p in rest {
                self.line_to(p);
            }
            self.push("h", vec![]);
        }
        self.push("B*", vec![]);
        self.push("Q", vec![]);
    }

    /// Strokes an open line.
    pub fn polyline(&mut self, points: &[Point2d], color: Color, width: f64) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };

        self.push("q", vec![]);
        self.set_stroke(color, width);
        self.move_to(first);
        for p in rest {
            self.line_to(p);
        }
        self.push("S", vec![]);
        self.push("Q", vec![]);
    }

    /// Strokes a circle.
    pub fn circle(&mut self, center: &Point2d, radius: f64, color: Color, width: f64) {
        let (cx, cy) = self.to_user_space(center);
        let r = radius * POINTS_PER_MM;
        let k = r * KAPPA;

        self.push("q", vec![]);
        self.set_stroke(color, width);
        self.push("m", vec![real(cx + r), real(cy)]);
        let quarters = [
            [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
            [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
            [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
            [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
        ];
        for quarter in quarters {
            self.push("c", quarter.into_iter().map(real).collect());
        }
        self.push("S", vec![]);
        self.push("Q", vec![]);
    }

    /// Writes text with its baseline starting at `position`.
    pub fn text(&mut self, position: &Point2d, font_size: f64, text: &str, color: Color) {
        let (x, y) = self.to_user_space(position);
        self.push("q", vec![]);
        self.set_fill(color);
        self.push("BT", vec![]);
        self.push("Tf", vec![FONT_NAME.into(), real(font_size)]);
        self.push("Td", vec![real(x), real(y)]);
        self.push("Tj", vec![Object::string_literal(text)]);
        self.push("ET", vec![]);
        self.push("Q", vec![]);
    }

    /// Serializes the document.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SqlGisError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_NAME => font_id,
            },
        });

        let mut kids: Vec<Object> = vec![];
        for operations in &self.pages {
            let content = Content {
                operations: operations.clone(),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            real(self.size.width * POINTS_PER_MM),
            real(self.size.height * POINTS_PER_MM),
        ];
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => media_box,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
            });
            doc.trailer.set("Info", info_id);
        }

        let mut buf = Vec::new();
        doc.save_to(&mut buf)?;
        Ok(buf)
    }

    /// Writes the document to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SqlGisError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn color_operands(color: Color) -> [Object; 3] {
    color
        .to_rgb_array()
        .map(|channel| real(f64::from(channel) / 255.0))
}

/// Draws a geometry on the current page of the document. Transformed coordinates are in millimeters.
///
/// Polygons are filled with the style color and outlined in black, lines and points are stroked in the style
/// color. The label is written next to the first point of lines and points and inside polygons.
pub fn prepare_row_as_pdf(
    geometry: &Geometry,
    style: &Style,
    transform: &ScaleTransform,
    document: &mut PdfDocument,
) {
    match geometry {
        Geometry::Point(p) => draw_point(document, p, style, transform),
        Geometry::MultiPoint(mp) => {
            for p in &mp.points {
                draw_point(document, p, style, transform);
            }
        }
        Geometry::LineString(line) => draw_line(document, &line.points, style, transform),
        Geometry::MultiLineString(ml) => {
            for line in &ml.lines {
                draw_line(document, &line.points, style, transform);
            }
        }
        Geometry::Polygon(polygon) => draw_polygon(document, polygon, style, transform),
        Geometry::MultiPolygon(mp) => {
            for polygon in &mp.polygons {
                draw_polygon(document, polygon, style, transform);
            }
        }
        Geometry::GeometryCollection(members) => {
            for member in members {
                prepare_row_as_pdf(member, style, transform, document);
            }
        }
    }
}

fn draw_label(document: &mut PdfDocument, anchor: &Point2d, style: &Style) {
    if let Some(label) = style.label() {
        document.text(anchor, LABEL_FONT_SIZE, label, Color::BLACK);
    }
}

fn draw_point(document: &mut PdfDocument, p: &Point2d, style: &Style, transform: &ScaleTransform) {
    let center = transform.apply(p);
    document.circle(&center, POINT_RADIUS, style.color, POINT_LINE_WIDTH);
    draw_label(document, &center, style);
}

fn draw_line(
    document: &mut PdfDocument,
    points: &[Point2d],
    style: &Style,
    transform: &ScaleTransform,
) {
    let screen = to_screen(points, transform);
    if screen.len() < 2 {
        return;
    }

    document.polyline(&screen, style.color, LINE_WIDTH);
    draw_label(document, &screen[0], style);
}

fn draw_polygon(
    document: &mut PdfDocument,
    polygon: &Polygon,
    style: &Style,
    transform: &ScaleTransform,
) {
    let Some(outer) = polygon.outer_ring() else {
        return;
    };
    if outer.is_degenerate() {
        warn!("Skipping polygon with degenerate outer ring: {outer:?}");
        return;
    }

    let rings: Vec<Vec<Point2d>> = polygon
        .rings
        .iter()
        .filter(|ring| {
            let keep = !ring.is_degenerate();
            if !keep {
                warn!("Skipping degenerate polygon hole: {ring:?}");
            }
            keep
        })
        .map(|ring| ring_to_screen(ring, transform))
        .collect();
    document.polygon(&rings, style.color, Color::BLACK, OUTLINE_WIDTH);

    if let Some(anchor) = outer.point_on_surface() {
        draw_label(document, &transform.apply(&anchor), style);
    }
}
