//! Renderers of single rows.
//!
//! Every renderer takes a geometry, its [`Style`](crate::Style) and a [`ScaleTransform`] computed over all rows
//! of a visualization, and draws the geometry into its target:
//!
//! * [`raster`]: a [`RasterCanvas`](raster::RasterCanvas) that can be encoded as PNG;
//! * [`pdf`]: the current page of a [`PdfDocument`](pdf::PdfDocument);
//! * [`svg`]: SVG elements returned as text;
//! * [`ol`]: an OpenLayers script fragment. It is the only target that uses raw coordinates and ignores the
//!   transform.

use sqlgis_types::cartesian::Point2d;
use sqlgis_types::Ring;

use crate::ScaleTransform;

pub mod ol;
pub mod pdf;
pub mod raster;
pub mod svg;

/// Pixel positions of the points.
fn to_screen<'a>(
    points: impl IntoIterator<Item = &'a Point2d>,
    transform: &ScaleTransform,
) -> Vec<Point2d> {
    points.into_iter().map(|p| transform.apply(p)).collect()
}

/// Pixel positions of the ring vertices, without the repeated closing point.
fn ring_to_screen(ring: &Ring, transform: &ScaleTransform) -> Vec<Point2d> {
    to_screen(ring.vertices(), transform)
}
