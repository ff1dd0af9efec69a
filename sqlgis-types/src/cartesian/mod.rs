//! Types and functions on geometries in cartesian coordinates.

mod orient;
mod point;
mod rect;
mod size;

pub use orient::Orientation;
pub use point::{CartesianPoint2d, Point2d};
pub use rect::Rect;
pub use size::Size;

pub use nalgebra::Point2;
