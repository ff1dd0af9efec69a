//! Sqlgis renders spatial column values of a database result set. It supports PNG images, PDF documents, SVG
//! markup and OpenLayers scripts for interactive maps.
//!
//! # Quick start
//!
//! ```no_run
//! use sqlgis::{Visualization, VisualizationSettings};
//!
//! let rows = [
//!     ("'POLYGON((0 0,100 0,100 50,0 50,0 0))',4326", "area"),
//!     ("LINESTRING(10 10,90 40)", "road"),
//! ];
//! let visualization = Visualization::new(rows, VisualizationSettings::default());
//!
//! let svg = visualization.to_svg();
//! let png = visualization.to_png().unwrap();
//! ```
//!
//! Single geometries can be drawn into a target with the functions in [`render`], using a [`ScaleTransform`]
//! computed from the envelopes of all geometries that share the target.

pub mod color;
pub mod error;
pub mod render;
pub mod scale;
pub mod style;
pub mod visualization;

pub use color::Color;
pub use error::SqlGisError;
pub use scale::ScaleTransform;
pub use style::{Style, DEFAULT_PALETTE};
pub use visualization::{Visualization, VisualizationSettings};

// Reexport sqlgis_types
pub use sqlgis_types;
