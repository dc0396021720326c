//! Encoder - Document to portable string.
//!
//! Block marks become a line prefix, emitted once per line-run, in the fixed
//! order blockquote, list, header. Inline marks wrap the run innermost to
//! outermost: code, strike, underline, italic, bold. References become
//! `[TOKEN:<type_id>:<token_id>]`. Nothing is escaped.

use tokenfield_model::{Document, FormatMark, FormatSet, ListKind, Node, TextRun};

/// Encode a document into its portable string form. Never fails.
pub fn encode(doc: &Document) -> String {
    let mut out = String::new();
    let mut open_block: Option<FormatSet> = None;

    for node in doc.nodes() {
        match node {
            Node::Text(run) => {
                let block = run.attributes.block();
                if open_block != Some(block) {
                    push_block_prefix(&mut out, &block);
                }
                push_inline(&mut out, run);
                open_block = Some(block);
            }
            Node::Token(reference) => {
                out.push_str(&reference.marker());
                open_block = None;
            }
        }
    }

    out
}

/// The line prefix for a set of block marks.
pub fn block_prefix(block: &FormatSet) -> String {
    let mut prefix = String::new();
    push_block_prefix(&mut prefix, block);
    prefix
}

fn push_block_prefix(out: &mut String, block: &FormatSet) {
    if block.is_blockquote() {
        out.push_str("> ");
    }
    match block.list() {
        Some(ListKind::Ordered) => out.push_str("1. "),
        Some(ListKind::Bullet) => out.push_str("- "),
        None => {}
    }
    if let Some(level) = block.header() {
        for _ in 0..level {
            out.push('#');
        }
        out.push(' ');
    }
}

fn push_inline(out: &mut String, run: &TextRun) {
    let wraps: Vec<&str> = FormatMark::INLINE_ORDER
        .iter()
        .filter(|mark| run.attributes.contains(**mark))
        .filter_map(|mark| inline_delimiter(*mark))
        .collect();

    for delimiter in wraps.iter().rev() {
        out.push_str(delimiter);
    }
    out.push_str(&run.text);
    for delimiter in &wraps {
        out.push_str(delimiter);
    }
}

/// The delimiter pair used for an inline mark.
pub fn inline_delimiter(mark: FormatMark) -> Option<&'static str> {
    match mark {
        FormatMark::Bold => Some("**"),
        FormatMark::Italic => Some("*"),
        FormatMark::Underline => Some("__"),
        FormatMark::Strike => Some("~~"),
        FormatMark::Code => Some("`"),
        FormatMark::Blockquote | FormatMark::Header(_) | FormatMark::List(_) => None,
    }
}
