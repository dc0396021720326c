//! # tokenfield-codec
//!
//! Conversion between a [`Document`](tokenfield_model::Document) and its
//! portable string form: markdown-style formatting with embedded
//! `[TOKEN:<type_id>:<token_id>]` markers.
//!
//! - [`encode`] is synchronous and never fails.
//! - [`Decoder`] scans markers, rebuilds formatting and resolves every
//!   marker through a [`TokenResolver`]. Unresolvable markers stay as
//!   literal text, so decoding never fails either.
//!
//! ## Example
//!
//! ```rust
//! use tokenfield_codec::{decode, encode, MemoryResolver};
//! use tokenfield_model::{TokenRecord, TokenType};
//!
//! # futures::executor::block_on(async {
//! let resolver = MemoryResolver::with_records([TokenRecord::new(
//!     "t1",
//!     "Doctor Name",
//!     TokenType::new("RP", "Doctor", "#0045ff"),
//! )]);
//!
//! let doc = decode("**Dear** [TOKEN:RP:t1],", &resolver).await;
//! assert_eq!(doc.plain_text(), "Dear Doctor Name,");
//! assert_eq!(encode(&doc), "**Dear** [TOKEN:RP:t1],");
//! # });
//! ```

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod markup;
pub mod resolver;
pub mod scanner;

pub use decoder::{
    decode, decode_unresolved, DecodeReport, Decoder, DecoderConfig, Fallback, FallbackReason,
    ResolveMode,
};
pub use encoder::{block_prefix, encode, inline_delimiter};
pub use error::{ResolveError, Result};
pub use markup::parse_segment;
pub use resolver::{matches_query, MemoryResolver, TokenResolver, UnavailableResolver};
pub use scanner::{scan, Marker, Scanner, Segment};
