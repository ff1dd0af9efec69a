//! Rendering of a whole result set.
//!
//! A [`Visualization`] holds the spatial values of a query result together with their labels, fits all of them
//! into one [`ScaleTransform`] and draws every row with its own palette color into a single output.

use std::fmt::Write;

use log::warn;
use serde::{Deserialize, Serialize};
use sqlgis_types::cartesian::{Point2d, Rect, Size};
use sqlgis_types::SpatialValue;

use crate::error::SqlGisError;
use crate::render::ol::prepare_row_as_ol;
use crate::render::pdf::{prepare_row_as_pdf, PageSize, PdfDocument};
use crate::render::raster::{prepare_row_as_png, RasterCanvas};
use crate::render::svg::{prepare_row_as_svg, IdSequence};
use crate::scale::BORDER;
use crate::{Color, ScaleTransform, Style, DEFAULT_PALETTE};

const TITLE_FONT_SIZE: f64 = 12.0;

/// Output settings of a [`Visualization`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationSettings {
    /// Width of SVG and PNG output in pixels.
    pub width: u32,
    /// Height of SVG and PNG output in pixels.
    pub height: u32,
    /// Row colors. Row `i` is drawn with `palette[i % palette.len()]`.
    pub palette: Vec<Color>,
    /// Background of PNG output.
    pub background: Color,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self {
            width: 600,
            height: 450,
            palette: DEFAULT_PALETTE.to_vec(),
            background: Color::from_hex("#E5E5E5"),
        }
    }
}

impl VisualizationSettings {
    /// Creates a new instance from a copy of the current, but with the given width.
    pub fn with_width(&self, width: u32) -> Self {
        Self {
            width,
            ..self.clone()
        }
    }

    /// Creates a new instance from a copy of the current, but with the given height.
    pub fn with_height(&self, height: u32) -> Self {
        Self {
            height,
            ..self.clone()
        }
    }

    /// Creates a new instance from a copy of the current, but with the given palette.
    pub fn with_palette(&self, palette: Vec<Color>) -> Self {
        Self {
            palette,
            ..self.clone()
        }
    }

    /// Creates a new instance from a copy of the current, but with the given background.
    pub fn with_background(&self, background: Color) -> Self {
        Self {
            background,
            ..self.clone()
        }
    }

    fn color(&self, row: usize) -> Color {
        if self.palette.is_empty() {
            DEFAULT_PALETTE[row % DEFAULT_PALETTE.len()]
        } else {
            self.palette[row % self.palette.len()]
        }
    }
}

/// Spatial values of a result set prepared for drawing.
#[derive(Debug, Clone)]
pub struct Visualization {
    rows: Vec<(SpatialValue, Style)>,
    settings: VisualizationSettings,
}

impl Visualization {
    /// Reads the rows, given as a spatial value (bare WKT or `'WKT',SRID`) and a label.
    ///
    /// Rows that cannot be read are skipped. They still take their place in the palette, so the colors of the
    /// other rows do not depend on them.
    pub fn new<V, L>(rows: impl IntoIterator<Item = (V, L)>, settings: VisualizationSettings) -> Self
    where
        V: AsRef<str>,
        L: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, (value, label))| match SpatialValue::parse(value.as_ref()) {
                Ok(value) => {
                    let style = Style::new(settings.color(index)).with_label(label.as_ref());
                    Some((value, style))
                }
                Err(err) => {
                    warn!("Skipping row {index} with unreadable spatial value: {err}");
                    None
                }
            })
            .collect();

        Self { rows, settings }
    }

    /// Rows that will be drawn, with their styles.
    pub fn rows(&self) -> &[(SpatialValue, Style)] {
        &self.rows
    }

    /// Settings of the visualization.
    pub fn settings(&self) -> &VisualizationSettings {
        &self.settings
    }

    /// Envelope of all rows.
    pub fn extent(&self) -> Option<Rect> {
        Rect::merge_all(
            self.rows
                .iter()
                .filter_map(|(value, _)| value.geometry.scale_row()),
        )
    }

    fn transform(&self, viewport: Size) -> ScaleTransform {
        match self.extent() {
            Some(extent) => ScaleTransform::fit(extent, viewport),
            None => ScaleTransform::new(0.0, 0.0, 1.0, viewport.height()),
        }
    }

    fn pixel_viewport(&self) -> Size {
        Size::new(
            f64::from(self.settings.width),
            f64::from(self.settings.height),
        )
    }

    /// SVG document with all rows inside a single group.
    pub fn to_svg(&self) -> String {
        let transform = self.transform(self.pixel_viewport());
        let mut ids = IdSequence::default();

        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#);
        let _ = write!(
            out,
            r#"<svg version="1.1" xmlns:svg="http://www.w3.org/2000/svg" xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            self.settings.width, self.settings.height
        );
        out.push_str(r#"<g id="groupPanel">"#);
        for (value, style) in &self.rows {
            out.push_str(&prepare_row_as_svg(
                &value.geometry,
                style,
                &transform,
                &mut ids,
            ));
        }
        out.push_str("</g></svg>");
        out
    }

    /// Draws all rows onto a new canvas.
    pub fn to_canvas(&self) -> Result<RasterCanvas, SqlGisError> {
        let transform = self.transform(self.pixel_viewport());
        let mut canvas = RasterCanvas::new(
            self.settings.width,
            self.settings.height,
            self.settings.background,
        );
        for (value, style) in &self.rows {
            prepare_row_as_png(&value.geometry, style, &transform, &mut canvas)?;
        }

        Ok(canvas)
    }

    /// PNG image of all rows.
    pub fn to_png(&self) -> Result<Vec<u8>, SqlGisError> {
        self.to_canvas()?.encode_png()
    }

    /// Draws all rows onto a single A4 page with the title in its top-left corner.
    pub fn to_pdf_document(&self, title: &str) -> PdfDocument {
        let mut document = PdfDocument::new(PageSize::A4).with_title(title);
        let size = document.size();
        let transform = self.transform(Size::new(size.width, size.height));

        if !title.trim().is_empty() {
            document.text(
                &Point2d::new(BORDER, 10.0),
                TITLE_FONT_SIZE,
                title.trim(),
                Color::BLACK,
            );
        }
        for (value, style) in &self.rows {
            prepare_row_as_pdf(&value.geometry, style, &transform, &mut document);
        }

        document
    }

    /// PDF document of all rows.
    pub fn to_pdf(&self, title: &str) -> Result<Vec<u8>, SqlGisError> {
        self.to_pdf_document(title).to_bytes()
    }

    /// OpenLayers script adding all rows to a new vector layer of the `map` defined by the page.
    pub fn to_ol(&self) -> String {
        let mut out = String::from("var vectorSource = new ol.source.Vector({});");
        for (value, style) in &self.rows {
            out.push_str(&prepare_row_as_ol(&value.geometry, value.srid, style));
        }
        out.push_str("var vectorLayer = new ol.layer.Vector({source: vectorSource});");
        out.push_str("map.addLayer(vectorLayer);");
        out.push_str("var extent = vectorSource.getExtent();");
        out.push_str(
            "if (!ol.extent.isEmpty(extent)) {map.getView().fit(extent, {padding: [20, 20, 20, 20]});}",
        );
        out
    }
}
