//! Formatting reconstruction for plain segments.
//!
//! A segment may start with one block marker, tested in order: header
//! (`#{1,6} `), blockquote (`> `), ordered list (`\d+\. `), bullet list
//! (`[*-] `). The rest is scanned left to right; at each position the
//! inline matchers are tried in order and the first that matches wins:
//!
//! | matcher   | mark      |
//! |-----------|-----------|
//! | `**x**`   | bold      |
//! | `*x*`     | italic    |
//! | `__x__`   | underline |
//! | `~~x~~`   | strike    |
//! | `` `x` `` | code      |
//!
//! Span content is non-empty and stays on one line. Each span yields a run
//! with exactly one inline mark; runs also carry the segment's block mark.

use tokenfield_model::{FormatMark, FormatSet, ListKind, TextRun};

/// Inline matchers in priority order.
pub const INLINE_MATCHERS: [(&str, FormatMark); 5] = [
    ("**", FormatMark::Bold),
    ("*", FormatMark::Italic),
    ("__", FormatMark::Underline),
    ("~~", FormatMark::Strike),
    ("`", FormatMark::Code),
];

/// Parse a plain segment into text runs, in text order. Empty runs are not
/// produced.
pub fn parse_segment(segment: &str) -> Vec<TextRun> {
    let (block, body) = split_block(segment);
    parse_inline(body, block)
}

/// Strip at most one leading block marker.
pub fn split_block(segment: &str) -> (FormatSet, &str) {
    if let Some((level, rest)) = header(segment) {
        return (FormatMark::Header(level).into(), rest);
    }
    if let Some(rest) = segment.strip_prefix("> ") {
        return (FormatMark::Blockquote.into(), rest);
    }
    if let Some(rest) = ordered_item(segment) {
        return (FormatMark::List(ListKind::Ordered).into(), rest);
    }
    if let Some(rest) = segment
        .strip_prefix("* ")
        .or_else(|| segment.strip_prefix("- "))
    {
        return (FormatMark::List(ListKind::Bullet).into(), rest);
    }
    (FormatSet::new(), segment)
}

/// Scan inline spans, giving every run the block marks in `block`.
pub fn parse_inline(text: &str, block: FormatSet) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(c) = text[cursor..].chars().next() {
        let span = if matches!(c, '*' | '_' | '~' | '`') {
            INLINE_MATCHERS.iter().find_map(|(delimiter, mark)| {
                match_span(&text[cursor..], delimiter).map(|(content, len)| (*mark, content, len))
            })
        } else {
            None
        };

        match span {
            Some((mark, content, len)) => {
                push_run(&mut runs, &text[plain_start..cursor], block);
                push_run(&mut runs, content, block.with(mark));
                cursor += len;
                plain_start = cursor;
            }
            None => cursor += c.len_utf8(),
        }
    }

    push_run(&mut runs, &text[plain_start..], block);
    runs
}

/// Match `delimiter content delimiter` at the start of `text`. Returns the
/// content and the number of bytes consumed.
fn match_span<'a>(text: &'a str, delimiter: &str) -> Option<(&'a str, usize)> {
    let body = text.strip_prefix(delimiter)?;
    let first = body.chars().next().filter(|c| *c != '\n')?;
    // `****` is an empty bold span, not italic around `*`.
    if delimiter.len() == 1 && body.starts_with(delimiter) {
        return None;
    }

    let line = body.split('\n').next().unwrap_or(body);
    let from = first.len_utf8();
    let close = from + line[from..].find(delimiter)?;

    Some((&body[..close], delimiter.len() * 2 + close))
}

fn header(segment: &str) -> Option<(u8, &str)> {
    let hashes = segment.bytes().take_while(|b| *b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = segment[hashes..].strip_prefix(' ')?;
    Some((hashes as u8, rest))
}

fn ordered_item(segment: &str) -> Option<&str> {
    let digits = segment.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    segment[digits..].strip_prefix(". ")
}

fn push_run(runs: &mut Vec<TextRun>, text: &str, attributes: FormatSet) {
    if !text.is_empty() {
        runs.push(TextRun::new(text, attributes));
    }
}
