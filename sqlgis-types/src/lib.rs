//! Geometry model of database spatial values.
//!
//! Values are read from WKT text ([`Geometry::from_wkt`], [`SpatialValue::parse`] for the `'WKT',SRID` form),
//! from WKB ([`Geometry::from_wkb`]) or from the MySQL internal format ([`SpatialValue::from_mysql`]). The
//! [`params`] module converts between WKT and the structured form data of the geometry editor.
//!
//! Ring algorithms used by the renderers (signed area, orientation, strict containment and an interior label point)
//! live on [`Ring`].

pub mod cartesian;
pub mod error;
pub mod params;
pub mod segment;
pub mod wkb;
pub mod wkt;

mod geometry;
pub use geometry::*;

mod ring;
pub use ring::*;
