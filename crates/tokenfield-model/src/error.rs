//! Error types for the document model.

use thiserror::Error;

/// Errors raised by positional editing operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Position out of bounds: {position} (length: {length})")]
    PositionOutOfBounds { position: usize, length: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
