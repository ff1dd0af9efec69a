//! Raster rendering.
//!
//! Shapes are tessellated into triangles with lyon and the triangles are drawn onto an RGBA image. A pixel is
//! painted if its center lies in a triangle. There is no anti-aliasing, so the output depends only on the input.

use std::path::Path as FsPath;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};
use log::warn;
use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    LineJoin, StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor,
    VertexBuffers,
};
use lyon::math::point;
use lyon::path::Path;
use sqlgis_types::cartesian::Point2d;
use sqlgis_types::{Geometry, Polygon};

use super::{ring_to_screen, to_screen};
use crate::error::SqlGisError;
use crate::{Color, ScaleTransform, Style};

const LINE_WIDTH: f32 = 2.0;
const OUTLINE_WIDTH: f32 = 1.0;
const POINT_RADIUS: f64 = 3.5;
const POINT_SEGMENTS: usize = 16;

type Triangles = VertexBuffers<[f32; 2], u32>;

/// RGBA image that rows are drawn onto.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    image: RgbaImage,
}

impl RasterCanvas {
    /// Creates a canvas filled with the background color.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(background.to_u8_array())),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color of a pixel. Returns `None` outside of the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }

        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        Some(Color::rgba(r, g, b, a))
    }

    /// Underlying image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Encodes the canvas as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, SqlGisError> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf).write_image(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            ColorType::Rgba8,
        )?;

        Ok(buf)
    }

    /// Writes the canvas to a PNG file.
    pub fn save_png(&self, path: impl AsRef<FsPath>) -> Result<(), SqlGisError> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }

    fn fill_triangles(&mut self, triangles: &Triangles, color: Color) {
        let pixel = Rgba(color.to_u8_array());
        let vertex = |index: u32| triangles.vertices.get(index as usize).copied();

        for indices in triangles.indices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (vertex(indices[0]), vertex(indices[1]), vertex(indices[2]))
            else {
                continue;
            };

            if edge(a, b, c) == 0.0 {
                continue;
            }

            let x_min = a[0].min(b[0]).min(c[0]).floor().max(0.0) as u32;
            let y_min = a[1].min(b[1]).min(c[1]).floor().max(0.0) as u32;
            let x_max = (a[0].max(b[0]).max(c[0]).ceil().max(0.0) as u32).min(self.image.width());
            let y_max = (a[1].max(b[1]).max(c[1]).ceil().max(0.0) as u32).min(self.image.height());

            for y in y_min..y_max {
                for x in x_min..x_max {
                    let p = [x as f32 + 0.5, y as f32 + 0.5];
                    let e0 = edge(a, b, p);
                    let e1 = edge(b, c, p);
                    let e2 = edge(c, a, p);
                    let inside = (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0)
                        || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0);
                    if inside {
                        self.image.put_pixel(x, y, pixel);
                    }
                }
            }
        }
    }
}

fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// Draws a geometry onto the canvas.
///
/// Polygons are filled with the style color using the even-odd rule and outlined in black. Lines are drawn
/// [`LINE_WIDTH`] pixels wide and points as small circles, both in the style color. Labels are not drawn.
pub fn prepare_row_as_png(
    geometry: &Geometry,
    style: &Style,
    transform: &ScaleTransform,
    canvas: &mut RasterCanvas,
) -> Result<(), SqlGisError> {
    match geometry {
        Geometry::Point(p) => draw_point(canvas, p, style.color, transform),
        Geometry::MultiPoint(mp) => {
            for p in &mp.points {
                draw_point(canvas, p, style.color, transform)?;
            }
            Ok(())
        }
        Geometry::LineString(line) => draw_line(canvas, &line.points, style.color, transform),
        Geometry::MultiLineString(ml) => {
            for line in &ml.lines {
                draw_line(canvas, &line.points, style.color, transform)?;
            }
            Ok(())
        }
        Geometry::Polygon(polygon) => draw_polygon(canvas, polygon, style.color, transform),
        Geometry::MultiPolygon(mp) => {
            for polygon in &mp.polygons {
                draw_polygon(canvas, polygon, style.color, transform)?;
            }
            Ok(())
        }
        Geometry::GeometryCollection(members) => {
            for member in members {
                prepare_row_as_png(member, style, transform, canvas)?;
            }
            Ok(())
        }
    }
}

fn draw_point(
    canvas: &mut RasterCanvas,
    p: &Point2d,
    color: Color,
    transform: &ScaleTransform,
) -> Result<(), SqlGisError> {
    let center = transform.apply(p);
    let circle: Vec<Point2d> = (0..POINT_SEGMENTS)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / POINT_SEGMENTS as f64;
            Point2d::new(
                center.x + POINT_RADIUS * angle.cos(),
                center.y + POINT_RADIUS * angle.sin(),
            )
        })
        .collect();

    let path = build_path([circle.as_slice()], true);
    canvas.fill_triangles(&stroke(&path, OUTLINE_WIDTH)?, color);
    Ok(())
}

fn draw_line(
    canvas: &mut RasterCanvas,
    points: &[Point2d],
    color: Color,
    transform: &ScaleTransform,
) -> Result<(), SqlGisError> {
    if points.len() < 2 {
        return Ok(());
    }

    let screen = to_screen(points, transform);
    let path = build_path([screen.as_slice()], false);
    canvas.fill_triangles(&stroke(&path, LINE_WIDTH)?, color);
    Ok(())
}

fn draw_polygon(
    canvas: &mut RasterCanvas,
    polygon: &Polygon,
    color: Color,
    transform: &ScaleTransform,
) -> Result<(), SqlGisError> {
    let Some(outer) = polygon.outer_ring() else {
        return Ok(());
    };
    if outer.is_degenerate() {
        warn!("Skipping polygon with degenerate outer ring: {outer:?}");
        return Ok(());
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

    let path = build_path(rings.iter().map(Vec::as_slice), true);
    canvas.fill_triangles(&fill(&path)?, color);
    canvas.fill_triangles(&stroke(&path, OUTLINE_WIDTH)?, Color::BLACK);
    Ok(())
}

fn build_path<'a>(contours: impl IntoIterator<Item = &'a [Point2d]>, closed: bool) -> Path {
    let mut builder = Path::builder();
    for contour in contours {
        let mut iterator = contour.iter();
        let Some(first) = iterator.next() else {
            continue;
        };

        let _ = builder.begin(point(first.x as f32, first.y as f32));
        for p in iterator {
            let _ = builder.line_to(point(p.x as f32, p.y as f32));
        }
        builder.end(closed);
    }

    builder.build()
}

fn fill(path: &Path) -> Result<Triangles, SqlGisError> {
    let mut triangles = Triangles::new();
    FillTessellator::new()
        .tessellate_path(
            path,
            &FillOptions::DEFAULT.with_fill_rule(FillRule::EvenOdd),
            &mut BuffersBuilder::new(&mut triangles, ScreenVertexConstructor),
        )
        .map_err(|err| SqlGisError::Tessellation(format!("{err:?}")))?;

    Ok(triangles)
}

fn stroke(path: &Path, width: f32) -> Result<Triangles, SqlGisError> {
    let mut triangles = Triangles::new();
    StrokeTessellator::new()
        .tessellate_path(
            path,
            &StrokeOptions::DEFAULT
                .with_line_width(width)
                .with_miter_limit(2.0)
                .with_tolerance(0.1)
                .with_line_join(LineJoin::MiterClip),
            &mut BuffersBuilder::new(&mut triangles, ScreenVertexConstructor),
        )
        .map_err(|err| SqlGisError::Tessellation(format!("{err:?}")))?;

    Ok(triangles)
}

struct ScreenVertexConstructor;

impl FillVertexConstructor<[f32; 2]> for ScreenVertexConstructor {
    fn new_vertex(&mut self, vertex: FillVertex) -> [f32; 2] {
        let position = vertex.position();
        [position.x, position.y]
    }
}

impl StrokeVertexConstructor<[f32; 2]> for ScreenVertexConstructor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> [f32; 2] {
        let position = vertex.position();
        [position.x, position.y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKGROUND: Color = Color::rgb(229, 229, 229);
    const PURPLE: Color = Color::rgb(176, 46, 224);

    #[test]
    fn polygon_with_holes() {
        let geometry = Geometry::from_wkt(
            "POLYGON((0 0,100 0,100 100,0 100,0 0),(10 10,10 40,40 40,40 10,10 10),(60 60,90 60,90 90,60 90,60 60))",
        )
        .unwrap();
        let transform = ScaleTransform::new(-56.0, -16.0, 0.94, 124.0);
        let mut canvas = RasterCanvas::new(200, 124, BACKGROUND);

        prepare_row_as_png(&geometry, &Style::new(PURPLE).with_label("image"), &transform, &mut canvas)
            .unwrap();

        assert_eq!(canvas.width(), 200);
        assert_eq!(canvas.height(), 124);
        // inside the polygon
        assert_eq!(canvas.pixel(99, 61), Some(PURPLE));
        // inside the holes
        assert_eq!(canvas.pixel(76, 85), Some(BACKGROUND));
        assert_eq!(canvas.pixel(123, 38), Some(BACKGROUND));
        // outside
        assert_eq!(canvas.pixel(10, 10), Some(BACKGROUND));
        assert_eq!(canvas.pixel(180, 60), Some(BACKGROUND));
        // left outline
        assert_eq!(canvas.pixel(52, 60), Some(Color::BLACK));
        assert_eq!(canvas.pixel(500, 60), None);
    }

    #[test]
    fn line_and_point() {
        let transform = ScaleTransform::new(0.0, 0.0, 1.0, 100.0);
        let mut canvas = RasterCanvas::new(100, 100, BACKGROUND);
        let style = Style::new(PURPLE);

        let line = Geometry::from_wkt("LINESTRING(10 50,90 50)").unwrap();
        prepare_row_as_png(&line, &style, &transform, &mut canvas).unwrap();
        assert_eq!(canvas.pixel(50, 49), Some(PURPLE));
        assert_eq!(canvas.pixel(50, 50), Some(PURPLE));
        assert_eq!(canvas.pixel(50, 47), Some(BACKGROUND));

        let point = Geometry::from_wkt("POINT(50 20)").unwrap();
        prepare_row_as_png(&point, &style, &transform, &mut canvas).unwrap();
        assert_eq!(canvas.pixel(53, 80), Some(PURPLE));
        assert_eq!(canvas.pixel(50, 80), Some(BACKGROUND));
    }

    #[test]
    fn degenerate_input_is_skipped() {
        let transform = ScaleTransform::new(0.0, 0.0, 1.0, 10.0);
        let mut canvas = RasterCanvas::new(10, 10, BACKGROUND);
        let style = Style::new(PURPLE);

        for wkt in ["POLYGON((1 1,5 5,1 1))", "LINESTRING(1 1)", "POLYGON EMPTY"] {
            let geometry = Geometry::from_wkt(wkt).unwrap();
            prepare_row_as_png(&geometry, &style, &transform, &mut canvas).unwrap();
        }

        assert!(canvas.image().pixels().all(|p| p.0 == BACKGROUND.to_u8_array()));
    }

    #[test]
    fn png_encoding() {
        let canvas = RasterCanvas::new(20, 10, BACKGROUND);
        let bytes = canvas.encode_png().unwrap();

        assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (20, 10));
        assert_eq!(decoded.get_pixel(3, 3).0, BACKGROUND.to_u8_array());
        assert_eq!(canvas.encode_png().unwrap(), bytes);
    }
}
