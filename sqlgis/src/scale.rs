//! Scaling engine: one transform from coordinate space to the pixels of every output.

use serde::{Deserialize, Serialize};
use sqlgis_types::cartesian::{CartesianPoint2d, Point2d, Rect, Size};

/// Border in pixels kept free around the drawing when fitting an extent into a viewport.
pub const BORDER: f64 = 15.0;

// Smallest plot side used by `fit` when the viewport leaves no room inside the border.
const MIN_PLOT_SIZE: f64 = 1.0;

/// Maps geometry coordinates to pixel coordinates of a render target.
///
/// `screen_x = (x - self.x) * scale`, `screen_y = height - (y - self.y) * scale`. The y axis is flipped, so the
/// target origin is at its top-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleTransform {
    /// Geometry x coordinate drawn at the left edge of the target.
    pub x: f64,
    /// Geometry y coordinate drawn at the bottom edge of the target.
    pub y: f64,
    /// Pixels per coordinate unit.
    pub scale: f64,
    /// Height of the target in pixels.
    pub height: f64,
}

impl ScaleTransform {
    /// Creates a transform from precomputed values.
    pub fn new(x: f64, y: f64, scale: f64, height: f64) -> Self {
        Self {
            x,
            y,
            scale,
            height,
        }
    }

    /// Transform that draws `extent` as large as possible inside `viewport`, keeping [`BORDER`] pixels free on
    /// the axis that limits the scale and centering the drawing along the other one.
    ///
    /// A viewport no larger than the border on some side is treated as having a 1 pixel plot on that side, so the
    /// scale stays positive.
    pub fn fit(extent: Rect, viewport: Size) -> Self {
        let plot_width = (viewport.width() - 2.0 * BORDER).max(MIN_PLOT_SIZE);
        let plot_height = (viewport.height() - 2.0 * BORDER).max(MIN_PLOT_SIZE);

        let x_ratio = extent.width() / plot_width;
        let y_ratio = extent.height() / plot_height;
        let ratio = x_ratio.max(y_ratio);
        let scale = if ratio == 0.0 || !ratio.is_finite() {
            1.0
        } else {
            1.0 / ratio
        };

        let center = extent.center();
        let (x, y) = if x_ratio < y_ratio {
            (
                center.x - viewport.half_width() / scale,
                extent.y_min() - BORDER / scale,
            )
        } else {
            (
                extent.x_min() - BORDER / scale,
                center.y - viewport.half_height() / scale,
            )
        };

        Self {
            x,
            y,
            scale,
            height: viewport.height(),
        }
    }

    /// Pixel position of a geometry point.
    pub fn apply(&self, point: &impl CartesianPoint2d<Num = f64>) -> Point2d {
        Point2d::new(
            (point.x() - self.x) * self.scale,
            self.height - (point.y() - self.y) * self.scale,
        )
    }
}
