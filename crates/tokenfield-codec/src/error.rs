//! Error types for token resolution.

use thiserror::Error;

/// Errors a resolver may report.
///
/// The decoder never surfaces these; any failure degrades the affected marker
/// to literal text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Resolver unavailable")]
    Unavailable,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        ResolveError::Catalog(err.to_string())
    }
}

impl From<std::io::Error> for ResolveError {
    fn from(err: std::io::Error) -> Self {
        ResolveError::Catalog(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
