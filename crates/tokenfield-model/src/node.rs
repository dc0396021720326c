//! Document nodes: text runs and embedded token references.

use crate::format::FormatSet;
use crate::token::TokenRecord;
use serde::{Deserialize, Serialize};

/// A run of literal text sharing one attribute set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub attributes: FormatSet,
}

impl TextRun {
    pub fn new(text: impl Into<String>, attributes: FormatSet) -> Self {
        Self {
            text: text.into(),
            attributes,
        }
    }

    /// A run without any formatting.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, FormatSet::new())
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// An embedded reference to an external token.
///
/// `type_id` and `token_id` are the source of truth for the wire form;
/// `resolved` is a display cache filled in by the decoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenReference {
    pub type_id: String,
    pub token_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<TokenRecord>,
}

impl TokenReference {
    /// A reference that has not been resolved.
    pub fn unresolved(type_id: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            token_id: token_id.into(),
            resolved: None,
        }
    }

    /// A reference whose ids are taken from the record itself.
    pub fn resolved(record: TokenRecord) -> Self {
        Self {
            type_id: record.token_type.id.clone(),
            token_id: record.id.clone(),
            resolved: Some(record),
        }
    }

    /// Whether the cached record agrees with this reference's ids.
    /// Unresolved references are trivially consistent.
    pub fn is_consistent(&self) -> bool {
        match &self.resolved {
            Some(record) => record.id == self.token_id && record.type_id() == self.type_id,
            None => true,
        }
    }

    /// The wire marker for this reference.
    pub fn marker(&self) -> String {
        format!("[TOKEN:{}:{}]", self.type_id, self.token_id)
    }

    /// Display label: the record's name when resolved, the marker otherwise.
    pub fn label(&self) -> String {
        match &self.resolved {
            Some(record) => record.name.clone(),
            None => self.marker(),
        }
    }
}

/// A node of a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Text(TextRun),
    Token(TokenReference),
}

impl Node {
    /// Plain text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextRun::plain(text))
    }

    /// Formatted text node.
    pub fn formatted(text: impl Into<String>, attributes: impl Into<FormatSet>) -> Self {
        Node::Text(TextRun::new(text, attributes.into()))
    }

    /// Resolved reference node.
    pub fn token(record: TokenRecord) -> Self {
        Node::Token(TokenReference::resolved(record))
    }

    /// Editing length: characters of a text run, one for a reference.
    pub fn len(&self) -> usize {
        match self {
            Node::Text(run) => run.len(),
            Node::Token(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_token(&self) -> Option<&TokenReference> {
        match self {
            Node::Token(reference) => Some(reference),
            Node::Text(_) => None,
        }
    }
}

impl From<TextRun> for Node {
    fn from(run: TextRun) -> Self {
        Node::Text(run)
    }
}

impl From<TokenReference> for Node {
    fn from(reference: TokenReference) -> Self {
        Node::Token(reference)
    }
}
