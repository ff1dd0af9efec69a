//! Error types used by the crate.

use image::ImageError;
use sqlgis_types::error::GisTypesError;
use thiserror::Error;

/// Rendering error type.
#[derive(Debug, Error)]
pub enum SqlGisError {
    /// Spatial value cannot be read.
    #[error("failed to read geometry: {0}")]
    Geometry(#[from] GisTypesError),
    /// Color string is not `#RRGGBB` or `#RRGGBBAA`.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),
    /// Lyon failed to tessellate a shape.
    #[error("tessellation failed: {0}")]
    Tessellation(String),
    /// Image encoding error.
    #[error("image encode error: {0:?}")]
    Image(#[from] ImageError),
    /// PDF document error.
    #[error("pdf error: {0}")]
    Pdf(String),
    /// Error reading/writing data to the FS.
    #[error("failed to write file")]
    FsIo(#[from] std::io::Error),
}

impl From<lopdf::Error> for SqlGisError {
    fn from(value: lopdf::Error) -> Self {
        Self::Pdf(value.to_string())
    }
}
