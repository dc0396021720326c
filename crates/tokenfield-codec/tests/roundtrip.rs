//! Property-based tests for the portable string codec
//!
//! These tests verify the round-trip laws:
//!  - Decoding is a fixed point of encode-then-decode
//!  - Text without formatting syntax survives byte for byte
//!  - Unresolvable markers survive byte for byte
//!  - Resolved references keep the marker they were decoded from

use futures::executor::block_on;
use proptest::prelude::*;
use tokenfield_codec::{decode, decode_unresolved, encode, MemoryResolver};
use tokenfield_model::{Node, TokenRecord, TokenType};

fn catalog() -> MemoryResolver {
    MemoryResolver::with_records([
        TokenRecord::new("t1", "Doctor Name", TokenType::new("RP", "Doctor", "#0045ff")),
        TokenRecord::new("t2", "Clinic", TokenType::new("PL", "Place", "#00aa00")),
    ])
}

fn marker_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("[TOKEN:RP:t1]".to_string()),
        Just("[TOKEN:PL:t2]".to_string()),
        // Type mismatch and unknown id.
        Just("[TOKEN:PL:t1]".to_string()),
        "[a-z0-9]{1,4}".prop_map(|id| format!("[TOKEN:XX:{}]", id)),
    ]
}

fn block_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        4 => Just(""),
        1 => Just("# "),
        1 => Just("### "),
        1 => Just("> "),
        1 => Just("1. "),
        1 => Just("- "),
    ]
}

fn inline_strategy() -> impl Strategy<Value = String> {
    ("[a-z ]{1,8}", 0usize..6).prop_map(|(word, wrap)| {
        let delimiter = ["", "**", "*", "__", "~~", "`"][wrap];
        format!("{}{}{}", delimiter, word, delimiter)
    })
}

/// Segments of well-formed markup separated by markers.
fn markup_strategy() -> impl Strategy<Value = String> {
    let segment = (block_strategy(), prop::collection::vec(inline_strategy(), 0..4))
        .prop_map(|(block, inline)| format!("{}{}", block, inline.concat()));
    prop::collection::vec((segment, prop::option::of(marker_strategy())), 0..5).prop_map(
        |pieces| {
            pieces
                .into_iter()
                .map(|(segment, marker)| format!("{}{}", segment, marker.unwrap_or_default()))
                .collect()
        },
    )
}

/// Text with no formatting syntax, interleaved with markers.
fn plain_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            3 => "[a-zé ,:\\[\\]\n]{0,10}",
            1 => marker_strategy(),
        ],
        0..8,
    )
    .prop_map(|pieces| pieces.concat())
}

// ============================================================================
// Fixed point
// ============================================================================

proptest! {
    #[test]
    fn decode_is_a_fixed_point_of_encode(text in markup_strategy()) {
        let resolver = catalog();
        let doc = block_on(decode(&text, &resolver));
        let again = block_on(decode(&encode(&doc), &resolver));
        prop_assert_eq!(doc, again);
    }

    #[test]
    fn decode_unresolved_is_a_fixed_point_of_encode(text in markup_strategy()) {
        let doc = decode_unresolved(&text);
        prop_assert_eq!(decode_unresolved(&encode(&doc)), doc);
    }

    #[test]
    fn decoded_documents_are_normalized(text in markup_strategy()) {
        let doc = block_on(decode(&text, &catalog()));
        prop_assert!(doc.is_normalized());
    }
}

// ============================================================================
// Byte-for-byte
// ============================================================================

proptest! {
    #[test]
    fn plain_text_survives_byte_for_byte(text in plain_strategy()) {
        let doc = block_on(decode(&text, &catalog()));
        prop_assert_eq!(encode(&doc), text.clone());
        prop_assert_eq!(encode(&decode_unresolved(&text)), text);
    }

    #[test]
    fn resolved_references_keep_their_marker(text in plain_strategy()) {
        let doc = block_on(decode(&text, &catalog()));
        for reference in doc.references() {
            prop_assert!(reference.is_consistent());
            prop_assert!(text.contains(&reference.marker()));
        }
    }
}

#[test]
fn test_unknown_marker_stays_literal() {
    let text = "Hi [TOKEN:XX:nope], welcome";
    let doc = block_on(decode(text, &catalog()));

    assert_eq!(doc.nodes(), &[Node::text(text)]);
    assert_eq!(encode(&doc), text);
}
