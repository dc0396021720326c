//! Tokenfield SDK - editing sessions for token-aware rich text fields
//!
//! This SDK ties the document model and the portable string codec to an
//! editing surface. A [`Session`] loads a portable string through a token
//! resolver, hands the resulting document to an [`Editor`], and saves the
//! editor's document back to a portable string.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tokenfield_sdk::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let catalog = MemoryResolver::with_records([TokenRecord::new(
//!     "t1",
//!     "Doctor Name",
//!     TokenType::new("RP", "Doctor", "#0045ff"),
//! )]);
//! let session = Session::new(Arc::new(catalog));
//!
//! // Load a stored value
//! let doc = session.load("Dear [TOKEN:RP:t1],").await.unwrap();
//! assert_eq!(doc.plain_text(), "Dear Doctor Name,");
//!
//! // Remove the reference through its handle
//! let embed = session.editor().embeds().remove(0);
//! embed.handle.remove();
//!
//! assert_eq!(session.save(), "Dear ,");
//! # });
//! ```
//!
//! # Architecture
//!
//! - [`session`] - Load/save coordination with last-load-wins semantics
//! - [`editor`] - The editing surface and per-reference removal handles
//! - [`cache`] - A memoizing resolver wrapper
//! - [`config`] - Session configuration
//! - [`error`] - Error types

pub mod cache;
pub mod config;
pub mod editor;
pub mod error;
pub mod session;

// Re-exports for convenience
pub use cache::CachingResolver;
pub use config::{SessionConfig, SessionConfigBuilder};
pub use editor::{EditEvent, Editor, Embed, EmbedId, ReferenceHandle};
pub use error::{Result, SdkError};
pub use session::{Session, SessionEvent};

// Re-export commonly used types from the model and codec crates
pub use tokenfield_codec::{
    decode, decode_unresolved, encode, DecodeReport, Decoder, DecoderConfig, Fallback,
    FallbackReason, MemoryResolver, ResolveError, ResolveMode, TokenResolver,
};
pub use tokenfield_model::{
    Document, FormatMark, FormatSet, ListKind, Node, TextRun, TokenRecord, TokenReference,
    TokenType,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{SessionConfig, SessionConfigBuilder};
    pub use crate::editor::{EditEvent, Editor, ReferenceHandle};
    pub use crate::error::SdkError;
    pub use crate::session::{Session, SessionEvent};
    pub use tokenfield_codec::{MemoryResolver, ResolveMode, TokenResolver};
    pub use tokenfield_model::{Document, FormatMark, FormatSet, Node, TokenRecord, TokenType};
}
