//! Document - an ordered sequence of text runs and token references.
//!
//! Positions used by the editing operations count characters of text runs
//! and count each reference as a single position, the way an editor treats
//! an embed.

use crate::error::{ModelError, Result};
use crate::format::FormatSet;
use crate::node::{Node, TextRun, TokenReference};
use serde::{Deserialize, Serialize};

/// A formatted document with embedded token references.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from nodes as given, without normalizing.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Build a normalized document from nodes.
    pub fn normalized(nodes: Vec<Node>) -> Self {
        let mut doc = Self { nodes };
        doc.normalize();
        doc
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Append a node without normalizing.
    pub fn push(&mut self, node: impl Into<Node>) {
        self.nodes.push(node.into());
    }

    /// Editing length of the whole document.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(Node::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All references in reading order.
    pub fn references(&self) -> impl Iterator<Item = &TokenReference> + '_ {
        self.nodes.iter().filter_map(Node::as_token)
    }

    /// Editing position of every reference, in reading order.
    pub fn reference_positions(&self) -> Vec<usize> {
        let mut positions = Vec::new();
        let mut offset = 0;
        for node in &self.nodes {
            if matches!(node, Node::Token(_)) {
                positions.push(offset);
            }
            offset += node.len();
        }
        positions
    }

    /// Text with references rendered by their labels.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(run) => out.push_str(&run.text),
                Node::Token(reference) => out.push_str(&reference.label()),
            }
        }
        out
    }

    /// Whether the document holds no empty runs and no mergeable neighbours.
    pub fn is_normalized(&self) -> bool {
        let no_empty = self
            .nodes
            .iter()
            .all(|node| !matches!(node, Node::Text(run) if run.is_empty()));
        let maximal = self.nodes.windows(2).all(|pair| match (&pair[0], &pair[1]) {
            (Node::Text(a), Node::Text(b)) => a.attributes != b.attributes,
            _ => true,
        });
        no_empty && maximal
    }

    /// Drop empty text runs and merge adjacent runs with equal attributes.
    pub fn normalize(&mut self) {
        let nodes = std::mem::take(&mut self.nodes);
        let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());

        for node in nodes {
            match node {
                Node::Text(run) if run.is_empty() => {}
                Node::Text(run) => match merged.last_mut() {
                    Some(Node::Text(prev)) if prev.attributes == run.attributes => {
                        prev.text.push_str(&run.text);
                    }
                    _ => merged.push(Node::Text(run)),
                },
                token => merged.push(token),
            }
        }

        self.nodes = merged;
    }

    /// Locate a position: the index of the node containing it and the offset
    /// inside that node. The end of the document maps to `(nodes.len(), 0)`.
    pub fn node_index_at(&self, position: usize) -> Result<(usize, usize)> {
        let mut offset = 0;
        for (index, node) in self.nodes.iter().enumerate() {
            let len = node.len();
            if position < offset + len {
                return Ok((index, position - offset));
            }
            offset += len;
        }

        if position == offset {
            Ok((self.nodes.len(), 0))
        } else {
            Err(ModelError::PositionOutOfBounds {
                position,
                length: offset,
            })
        }
    }

    /// Insert text with the given attributes at a position.
    pub fn insert_text(&mut self, position: usize, text: &str, attributes: FormatSet) -> Result<()> {
        let (index, offset) = self.node_index_at(position)?;
        if text.is_empty() {
            return Ok(());
        }

        if let Some(Node::Text(run)) = self.nodes.get_mut(index) {
            if run.attributes == attributes {
                let at = byte_offset(&run.text, offset);
                run.text.insert_str(at, text);
                self.normalize();
                return Ok(());
            }
        }

        self.insert_node_at(index, offset, Node::Text(TextRun::new(text, attributes)));
        Ok(())
    }

    /// Insert a node at a position, splitting a text run if the position
    /// falls inside it.
    pub fn insert_node(&mut self, position: usize, node: impl Into<Node>) -> Result<()> {
        let (index, offset) = self.node_index_at(position)?;
        self.insert_node_at(index, offset, node.into());
        Ok(())
    }

    /// Delete `length` positions starting at `position`. Returns the
    /// references that were removed, in reading order.
    pub fn delete(&mut self, position: usize, length: usize) -> Result<Vec<TokenReference>> {
        let total = self.len();
        let end = position.saturating_add(length);
        if position > total || end > total {
            return Err(ModelError::PositionOutOfBounds {
                position: end.max(position),
                length: total,
            });
        }

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.nodes.len());
        let mut offset = 0;

        for node in std::mem::take(&mut self.nodes) {
            let len = node.len();
            let (start, stop) = (offset, offset + len);
            offset = stop;

            if stop <= position || start >= end {
                kept.push(node);
                continue;
            }

            match node {
                Node::Token(reference) => removed.push(reference),
                Node::Text(run) => {
                    let cut_from = position.saturating_sub(start);
                    let cut_to = end.min(stop) - start;
                    let text: String = run
                        .text
                        .chars()
                        .enumerate()
                        .filter(|(i, _)| *i < cut_from || *i >= cut_to)
                        .map(|(_, c)| c)
                        .collect();
                    kept.push(Node::Text(TextRun::new(text, run.attributes)));
                }
            }
        }

        self.nodes = kept;
        self.normalize();
        Ok(removed)
    }

    fn insert_node_at(&mut self, index: usize, offset: usize, node: Node) {
        if offset == 0 {
            self.nodes.insert(index, node);
        } else if let Some(Node::Text(run)) = self.nodes.get_mut(index) {
            let at = byte_offset(&run.text, offset);
            let tail = run.text.split_off(at);
            let attributes = run.attributes;
            self.nodes.insert(index + 1, node);
            self.nodes
                .insert(index + 2, Node::Text(TextRun::new(tail, attributes)));
        } else {
            // References have length one, so an inner offset only occurs in text.
            self.nodes.insert(index + 1, node);
        }
        self.normalize();
    }
}

impl FromIterator<Node> for Document {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self::from_nodes(iter.into_iter().collect())
    }
}

impl IntoIterator for Document {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatMark;
    use crate::token::{TokenRecord, TokenType};

    fn record(id: &str) -> TokenRecord {
        TokenRecord::new(id, format!("Token {}", id), TokenType::new("RP", "Doctor", "#0045ff"))
    }

    #[test]
    fn test_normalize_merges_and_elides() {
        let mut doc = Document::from_nodes(vec![
            Node::text("Hello"),
            Node::text(""),
            Node::text(" World"),
            Node::formatted("!", FormatMark::Bold),
            Node::formatted("!", FormatMark::Bold),
        ]);
        assert!(!doc.is_normalized());

        doc.normalize();

        assert!(doc.is_normalized());
        assert_eq!(
            doc.nodes(),
            &[
                Node::text("Hello World"),
                Node::formatted("!!", FormatMark::Bold)
            ]
        );
    }

    #[test]
    fn test_normalize_keeps_references_between_text() {
        let doc = Document::normalized(vec![
            Node::text("a"),
            Node::token(record("t1")),
            Node::text("b"),
        ]);
        assert_eq!(doc.nodes().len(), 3);
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_insert_text_extends_matching_run() {
        let mut doc = Document::normalized(vec![Node::text("Hello World")]);
        doc.insert_text(5, ",", FormatSet::new()).unwrap();
        assert_eq!(doc.nodes(), &[Node::text("Hello, World")]);
    }

    #[test]
    fn test_insert_text_splits_differently_formatted_run() {
        let mut doc = Document::normalized(vec![Node::text("Hello World")]);
        doc.insert_text(6, "big ", FormatMark::Bold.into()).unwrap();

        assert_eq!(
            doc.nodes(),
            &[
                Node::text("Hello "),
                Node::formatted("big ", FormatMark::Bold),
                Node::text("World"),
            ]
        );
    }

    #[test]
    fn test_insert_reference_inside_run() {
        let mut doc = Document::normalized(vec![Node::text("Dear , hi")]);
        doc.insert_node(5, Node::token(record("t1"))).unwrap();

        assert_eq!(doc.nodes().len(), 3);
        assert_eq!(doc.reference_positions(), vec![5]);
        assert_eq!(doc.plain_text(), "Dear Token t1, hi");
    }

    #[test]
    fn test_insert_at_end_and_out_of_bounds() {
        let mut doc = Document::normalized(vec![Node::text("abc")]);
        doc.insert_node(3, Node::token(record("t1"))).unwrap();
        assert_eq!(doc.len(), 4);

        let err = doc.insert_text(9, "x", FormatSet::new()).unwrap_err();
        assert_eq!(
            err,
            ModelError::PositionOutOfBounds {
                position: 9,
                length: 4
            }
        );
    }

    #[test]
    fn test_delete_across_reference() {
        let mut doc = Document::normalized(vec![
            Node::text("ab"),
            Node::token(record("t1")),
            Node::text("cd"),
        ]);

        let removed = doc.delete(1, 3).unwrap();

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].token_id, "t1");
        assert_eq!(doc.nodes(), &[Node::text("ad")]);
    }

    #[test]
    fn test_delete_out_of_bounds() {
        let mut doc = Document::normalized(vec![Node::text("ab")]);
        assert!(doc.delete(1, 5).is_err());
        assert_eq!(doc.nodes(), &[Node::text("ab")]);
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut doc = Document::normalized(vec![Node::text("héllo")]);
        doc.insert_text(2, "-", FormatMark::Code.into()).unwrap();
        assert_eq!(doc.nodes()[0], Node::text("hé"));
        assert_eq!(doc.nodes()[2], Node::text("llo"));
    }
}
