//! Formatting marks carried by text runs.
//!
//! Marks come in two families:
//! - Inline marks (bold, italic, underline, strike, code) that wrap spans.
//! - Block marks (header, list, blockquote) that apply to a whole line-run.
//!
//! A [`FormatSet`] holds at most one header level and one list kind, so the
//! same set always serializes to the same markup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of list a line-run belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Bullet,
}

/// A single formatting mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Blockquote,
    /// Header with a level in `1..=6`.
    Header(u8),
    List(ListKind),
}

impl FormatMark {
    /// Inline marks in wrapping order, innermost first.
    pub const INLINE_ORDER: [FormatMark; 5] = [
        FormatMark::Code,
        FormatMark::Strike,
        FormatMark::Underline,
        FormatMark::Italic,
        FormatMark::Bold,
    ];

    /// Whether this mark applies to a whole line-run.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            FormatMark::Blockquote | FormatMark::Header(_) | FormatMark::List(_)
        )
    }
}

impl fmt::Display for FormatMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatMark::Bold => write!(f, "bold"),
            FormatMark::Italic => write!(f, "italic"),
            FormatMark::Underline => write!(f, "underline"),
            FormatMark::Strike => write!(f, "strike"),
            FormatMark::Code => write!(f, "code"),
            FormatMark::Blockquote => write!(f, "blockquote"),
            FormatMark::Header(level) => write!(f, "header({})", level),
            FormatMark::List(ListKind::Ordered) => write!(f, "list(ordered)"),
            FormatMark::List(ListKind::Bullet) => write!(f, "list(bullet)"),
        }
    }
}

/// The attribute set of a text run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<FormatMark>", into = "Vec<FormatMark>")]
pub struct FormatSet {
    bold: bool,
    italic: bool,
    underline: bool,
    strike: bool,
    code: bool,
    blockquote: bool,
    header: Option<u8>,
    list: Option<ListKind>,
}

impl FormatSet {
    /// An empty set (plain text).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, mark: FormatMark) -> Self {
        self.insert(mark);
        self
    }

    /// Add a mark. A header or list mark replaces any previous one;
    /// header levels are clamped to `1..=6`.
    pub fn insert(&mut self, mark: FormatMark) {
        match mark {
            FormatMark::Bold => self.bold = true,
            FormatMark::Italic => self.italic = true,
            FormatMark::Underline => self.underline = true,
            FormatMark::Strike => self.strike = true,
            FormatMark::Code => self.code = true,
            FormatMark::Blockquote => self.blockquote = true,
            FormatMark::Header(level) => self.header = Some(level.clamp(1, 6)),
            FormatMark::List(kind) => self.list = Some(kind),
        }
    }

    /// Remove a mark. Header and list marks are removed regardless of level
    /// or kind.
    pub fn remove(&mut self, mark: FormatMark) {
        match mark {
            FormatMark::Bold => self.bold = false,
            FormatMark::Italic => self.italic = false,
            FormatMark::Underline => self.underline = false,
            FormatMark::Strike => self.strike = false,
            FormatMark::Code => self.code = false,
            FormatMark::Blockquote => self.blockquote = false,
            FormatMark::Header(_) => self.header = None,
            FormatMark::List(_) => self.list = None,
        }
    }

    pub fn contains(&self, mark: FormatMark) -> bool {
        match mark {
            FormatMark::Bold => self.bold,
            FormatMark::Italic => self.italic,
            FormatMark::Underline => self.underline,
            FormatMark::Strike => self.strike,
            FormatMark::Code => self.code,
            FormatMark::Blockquote => self.blockquote,
            FormatMark::Header(level) => self.header == Some(level),
            FormatMark::List(kind) => self.list == Some(kind),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn header(&self) -> Option<u8> {
        self.header
    }

    pub fn list(&self) -> Option<ListKind> {
        self.list
    }

    pub fn is_blockquote(&self) -> bool {
        self.blockquote
    }

    /// Only the block marks of this set.
    pub fn block(&self) -> FormatSet {
        FormatSet {
            blockquote: self.blockquote,
            header: self.header,
            list: self.list,
            ..FormatSet::default()
        }
    }

    /// Only the inline marks of this set.
    pub fn inline(&self) -> FormatSet {
        FormatSet {
            blockquote: false,
            header: None,
            list: None,
            ..*self
        }
    }

    /// Whether both sets carry identical block marks.
    pub fn same_block(&self, other: &FormatSet) -> bool {
        self.block() == other.block()
    }

    /// Marks in canonical order: inline marks innermost first, then block
    /// marks.
    pub fn iter(&self) -> impl Iterator<Item = FormatMark> + '_ {
        let inline = FormatMark::INLINE_ORDER
            .into_iter()
            .filter(move |mark| self.contains(*mark));
        let block = [
            self.blockquote.then_some(FormatMark::Blockquote),
            self.list.map(FormatMark::List),
            self.header.map(FormatMark::Header),
        ]
        .into_iter()
        .flatten();
        inline.chain(block)
    }
}

impl From<FormatMark> for FormatSet {
    fn from(mark: FormatMark) -> Self {
        FormatSet::new().with(mark)
    }
}

impl FromIterator<FormatMark> for FormatSet {
    fn from_iter<I: IntoIterator<Item = FormatMark>>(iter: I) -> Self {
        let mut set = FormatSet::new();
        for mark in iter {
            set.insert(mark);
        }
        set
    }
}

impl From<Vec<FormatMark>> for FormatSet {
    fn from(marks: Vec<FormatMark>) -> Self {
        marks.into_iter().collect()
    }
}

impl From<FormatSet> for Vec<FormatMark> {
    fn from(set: FormatSet) -> Self {
        set.iter().collect()
    }
}
