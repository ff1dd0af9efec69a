//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
///
/// Only structurally unreadable input is an error. Missing or malformed coordinates are tolerated by the readers and
/// never reported through this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GisTypesError {
    /// The leading keyword does not name a supported geometry type.
    #[error("unknown geometry type: {0:?}")]
    UnknownGeometryType(String),
    /// WKT text cannot be read.
    #[error("invalid WKT at offset {offset}: {message}")]
    Parse {
        /// Byte offset in the input where reading stopped.
        offset: usize,
        /// What the reader expected.
        message: String,
    },
    /// WKB bytes cannot be read.
    #[error("invalid WKB: {0}")]
    Wkb(String),
}
