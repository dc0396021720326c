//! Token scanner - splits a portable string into plain segments and
//! `[TOKEN:<type_id>:<token_id>]` markers.
//!
//! `type_id` is one or more characters other than `:` and `]`, `token_id` is
//! one or more characters other than `]`. Matches never overlap; the cursor
//! always moves past a whole marker, and a candidate that fails to match is
//! plain text.

use std::ops::Range;

const OPEN: &str = "[TOKEN:";

/// A well-formed token marker found in the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker<'a> {
    /// The full marker text, brackets included.
    pub raw: &'a str,
    pub type_id: &'a str,
    pub token_id: &'a str,
    /// Byte range of the marker in the scanned text.
    pub span: Range<usize>,
}

/// A piece of scanned input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Token(Marker<'a>),
}

/// Forward scanner over a portable string.
#[derive(Clone, Debug)]
pub struct Scanner<'a> {
    text: &'a str,
    cursor: usize,
    pending: Option<Marker<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            cursor: 0,
            pending: None,
        }
    }

    /// Current byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(marker) = self.pending.take() {
            self.cursor = marker.span.end;
            return Some(Segment::Token(marker));
        }

        if self.cursor >= self.text.len() {
            return None;
        }

        match find_marker(self.text, self.cursor) {
            Some(marker) if marker.span.start == self.cursor => {
                self.cursor = marker.span.end;
                Some(Segment::Token(marker))
            }
            Some(marker) => {
                let plain = &self.text[self.cursor..marker.span.start];
                self.cursor = marker.span.start;
                self.pending = Some(marker);
                Some(Segment::Plain(plain))
            }
            None => {
                let plain = &self.text[self.cursor..];
                self.cursor = self.text.len();
                Some(Segment::Plain(plain))
            }
        }
    }
}

/// Scan a whole string into segments.
pub fn scan(text: &str) -> Vec<Segment<'_>> {
    Scanner::new(text).collect()
}

/// Find the first well-formed marker starting at or after `from`.
pub fn find_marker(text: &str, from: usize) -> Option<Marker<'_>> {
    let mut search = from;
    loop {
        let start = search + text.get(search..)?.find(OPEN)?;
        if let Some(marker) = match_at(text, start) {
            return Some(marker);
        }
        // '[' is one byte, so this stays on a char boundary.
        search = start + 1;
    }
}

/// Try to match a marker whose `[TOKEN:` prefix begins at `start`.
fn match_at(text: &str, start: usize) -> Option<Marker<'_>> {
    let type_start = start + OPEN.len();
    let rest = &text[type_start..];

    let type_len = rest.find(|c: char| c == ':' || c == ']')?;
    if type_len == 0 || rest.as_bytes()[type_len] != b':' {
        return None;
    }

    let token_start = type_start + type_len + 1;
    let token_len = text[token_start..].find(']')?;
    if token_len == 0 {
        return None;
    }

    let end = token_start + token_len + 1;
    Some(Marker {
        raw: &text[start..end],
        type_id: &text[type_start..type_start + type_len],
        token_id: &text[token_start..token_start + token_len],
        span: start..end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token<'a>(segment: &Segment<'a>) -> (&'a str, &'a str) {
        match segment {
            Segment::Token(marker) => (marker.type_id, marker.token_id),
            Segment::Plain(text) => panic!("expected token, got plain {:?}", text),
        }
    }

    #[test]
    fn test_plain_only() {
        assert_eq!(scan("hello world"), vec![Segment::Plain("hello world")]);
        assert!(scan("").is_empty());
    }

    #[test]
    fn test_tokens_and_text_in_order() {
        let segments = scan("[TOKEN:A:1]text[TOKEN:B:2]");
        assert_eq!(segments.len(), 3);
        assert_eq!(token(&segments[0]), ("A", "1"));
        assert_eq!(segments[1], Segment::Plain("text"));
        assert_eq!(token(&segments[2]), ("B", "2"));
    }

    #[test]
    fn test_token_id_may_contain_colons() {
        let segments = scan("x[TOKEN:RP:a:b]y");
        assert_eq!(token(&segments[1]), ("RP", "a:b"));
        assert_eq!(segments[2], Segment::Plain("y"));
    }

    #[test]
    fn test_malformed_markers_are_plain() {
        for text in [
            "[TOKEN::t1]",
            "[TOKEN:RP:]",
            "[TOKEN:RP]",
            "[TOKEN:RP:t1",
            "[token:RP:t1]",
        ] {
            assert_eq!(scan(text), vec![Segment::Plain(text)], "{}", text);
        }
    }

    #[test]
    fn test_failed_candidate_resumes_scanning() {
        let segments = scan("[TOKEN:bad][TOKEN:RP:t1]");
        assert_eq!(segments[0], Segment::Plain("[TOKEN:bad]"));
        assert_eq!(token(&segments[1]), ("RP", "t1"));
    }

    #[test]
    fn test_nested_candidate_matches_outer_first() {
        // The outer candidate swallows the inner one: type "[TOKEN", id "A:1".
        let segments = scan("[TOKEN:[TOKEN:A:1]");
        assert_eq!(segments.len(), 1);
        assert_eq!(token(&segments[0]), ("[TOKEN", "A:1"));
    }

    #[test]
    fn test_marker_span_and_raw() {
        let text = "héllo [TOKEN:RP:t1]!";
        let marker = find_marker(text, 0).unwrap();
        assert_eq!(marker.raw, "[TOKEN:RP:t1]");
        assert_eq!(&text[marker.span.clone()], marker.raw);
        assert!(find_marker(text, marker.span.end).is_none());
    }

    #[test]
    fn test_cursor_advances_past_match() {
        let mut scanner = Scanner::new("ab[TOKEN:X:1]");
        assert_eq!(scanner.next(), Some(Segment::Plain("ab")));
        assert_eq!(scanner.cursor(), 2);
        assert!(matches!(scanner.next(), Some(Segment::Token(_))));
        assert_eq!(scanner.cursor(), 13);
        assert_eq!(scanner.next(), None);
    }
}
