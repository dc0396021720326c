//! Error types for the tokenfield SDK.

use thiserror::Error;
use tokenfield_codec::ResolveError;
use tokenfield_model::ModelError;

/// Error type for SDK operations.
///
/// Token problems met while loading never show up here; they degrade to
/// literal text inside the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Resolver error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Load superseded: generation {generation} is no longer current")]
    Superseded { generation: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;
