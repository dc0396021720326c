//! # tokenfield-model
//!
//! The in-memory model of a token-aware rich text field.
//!
//! This crate provides:
//! - [`Document`], an ordered sequence of [`Node`]s
//! - Text runs with a [`FormatSet`] of inline and block marks
//! - Embedded [`TokenReference`]s that may carry a resolved [`TokenRecord`]
//! - Positional editing (insert text, insert nodes, delete ranges)
//!
//! ## Example
//!
//! ```rust
//! use tokenfield_model::{Document, FormatMark, Node, TokenRecord, TokenType};
//!
//! let doctor = TokenRecord::new("t1", "Doctor Name", TokenType::new("RP", "Doctor", "#0045ff"));
//!
//! let mut doc = Document::normalized(vec![
//!     Node::formatted("Dear ", FormatMark::Bold),
//!     Node::text(","),
//! ]);
//! doc.insert_node(5, Node::token(doctor)).unwrap();
//!
//! assert_eq!(doc.plain_text(), "Dear Doctor Name,");
//! ```

pub mod document;
pub mod error;
pub mod format;
pub mod node;
pub mod token;

pub use document::Document;
pub use error::{ModelError, Result};
pub use format::{FormatMark, FormatSet, ListKind};
pub use node::{Node, TextRun, TokenReference};
pub use token::{TokenRecord, TokenType};
