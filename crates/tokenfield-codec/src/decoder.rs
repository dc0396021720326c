//! Decoder - portable string to Document.
//!
//! Decoding runs in three steps:
//! 1. Scan the input into plain segments and token markers.
//! 2. Rebuild the formatting of every plain segment.
//! 3. Resolve every marker through a [`TokenResolver`].
//!
//! A marker only becomes a [`TokenReference`] when the resolver returns a
//! record whose id and type id both match the marker. Anything else,
//! including a resolver error, leaves the marker as literal text. Decoding
//! never fails.

use crate::markup::parse_segment;
use crate::resolver::TokenResolver;
use crate::scanner::{Scanner, Segment};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokenfield_model::{Document, Node, TextRun, TokenRecord, TokenReference};
use tracing::{debug, instrument, warn};

/// How resolver calls are scheduled during a decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResolveMode {
    /// Await one lookup at a time, in text order.
    Sequential,
    /// Keep up to `limit` lookups in flight. Results are joined back by
    /// position, so output order never depends on completion order.
    Concurrent { limit: usize },
}

impl Default for ResolveMode {
    fn default() -> Self {
        ResolveMode::Concurrent { limit: 16 }
    }
}

/// Configuration for the decoder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    #[serde(default)]
    pub mode: ResolveMode,
}

/// Why a marker was kept as literal text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// The resolver has no token with this id.
    NotFound,
    /// The record's type differs from the marker's type.
    TypeMismatch { found: String },
    /// The record's id differs from the marker's id.
    IdMismatch { found: String },
    /// The lookup failed.
    ResolverFailed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotFound => write!(f, "not found"),
            FallbackReason::TypeMismatch { found } => write!(f, "type mismatch (found {})", found),
            FallbackReason::IdMismatch { found } => write!(f, "id mismatch (found {})", found),
            FallbackReason::ResolverFailed(e) => write!(f, "resolver failed: {}", e),
        }
    }
}

/// A marker that stayed literal text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fallback {
    pub marker: String,
    pub reason: FallbackReason,
}

/// Summary of a decode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Markers that became resolved references.
    pub resolved: usize,
    /// Markers that stayed literal text, in text order.
    pub unresolved: Vec<Fallback>,
}

impl DecodeReport {
    /// Total markers seen.
    pub fn markers(&self) -> usize {
        self.resolved + self.unresolved.len()
    }
}

/// A marker waiting for resolution.
struct PendingToken {
    slot: usize,
    raw: String,
    type_id: String,
    token_id: String,
}

/// Output position of a decoded piece.
enum Slot {
    Runs(Vec<TextRun>),
    Token,
}

type Resolution = std::result::Result<TokenRecord, FallbackReason>;

/// Decodes portable strings against a resolver.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode `text`, resolving every marker.
    pub async fn decode<R>(&self, text: &str, resolver: &R) -> Document
    where
        R: TokenResolver + ?Sized,
    {
        self.decode_with_report(text, resolver).await.0
    }

    /// Decode `text` and report which markers fell back to literal text.
    #[instrument(skip_all, fields(bytes = text.len()))]
    pub async fn decode_with_report<R>(&self, text: &str, resolver: &R) -> (Document, DecodeReport)
    where
        R: TokenResolver + ?Sized,
    {
        let (slots, pending) = split(text);
        let resolutions = self.resolve_all(&pending, resolver).await;

        let mut report = DecodeReport::default();
        let mut tokens: Vec<Option<Node>> = (0..slots.len()).map(|_| None).collect();

        for (token, resolution) in pending.into_iter().zip(resolutions) {
            let node = match resolution {
                Ok(record) => {
                    report.resolved += 1;
                    Node::Token(TokenReference {
                        type_id: token.type_id,
                        token_id: token.token_id,
                        resolved: Some(record),
                    })
                }
                Err(reason) => {
                    debug!(marker = %token.raw, %reason, "token kept as literal text");
                    let node = Node::text(token.raw.clone());
                    report.unresolved.push(Fallback {
                        marker: token.raw,
                        reason,
                    });
                    node
                }
            };
            tokens[token.slot] = Some(node);
        }

        let nodes = slots
            .into_iter()
            .zip(tokens)
            .flat_map(|(slot, token)| match slot {
                Slot::Runs(runs) => runs.into_iter().map(Node::Text).collect::<Vec<_>>(),
                Slot::Token => token.into_iter().collect(),
            })
            .collect();

        debug!(
            resolved = report.resolved,
            unresolved = report.unresolved.len(),
            "decode finished"
        );
        (Document::normalized(nodes), report)
    }

    async fn resolve_all<R>(&self, pending: &[PendingToken], resolver: &R) -> Vec<Resolution>
    where
        R: TokenResolver + ?Sized,
    {
        match self.config.mode {
            ResolveMode::Sequential => {
                let mut resolutions = Vec::with_capacity(pending.len());
                for token in pending {
                    resolutions.push(resolve_one(resolver, &token.type_id, &token.token_id).await);
                }
                resolutions
            }
            ResolveMode::Concurrent { limit } => {
                let mut resolutions: Vec<Option<Resolution>> =
                    (0..pending.len()).map(|_| None).collect();

                // Built eagerly so the stream holds futures, not a borrowed
                // closure; keeps the decode future `Send` for spawned loads.
                let lookups: Vec<_> = pending
                    .iter()
                    .enumerate()
                    .map(|(index, token)| async move {
                        (index, resolve_one(resolver, &token.type_id, &token.token_id).await)
                    })
                    .collect();
                let mut completed = stream::iter(lookups).buffer_unordered(limit.max(1));

                while let Some((index, resolution)) = completed.next().await {
                    resolutions[index] = Some(resolution);
                }

                resolutions
                    .into_iter()
                    .map(|resolution| {
                        resolution.unwrap_or_else(|| {
                            Err(FallbackReason::ResolverFailed("lookup not completed".into()))
                        })
                    })
                    .collect()
            }
        }
    }
}

/// Apply the fallback policy to a single lookup.
async fn resolve_one<R>(resolver: &R, type_id: &str, token_id: &str) -> Resolution
where
    R: TokenResolver + ?Sized,
{
    match resolver.get_token_by_id(token_id).await {
        Err(e) => {
            warn!(token_id, error = %e, "token lookup failed");
            Err(FallbackReason::ResolverFailed(e.to_string()))
        }
        Ok(None) => Err(FallbackReason::NotFound),
        Ok(Some(record)) if record.type_id() != type_id => Err(FallbackReason::TypeMismatch {
            found: record.token_type.id,
        }),
        Ok(Some(record)) if record.id != token_id => {
            Err(FallbackReason::IdMismatch { found: record.id })
        }
        Ok(Some(record)) => Ok(record),
    }
}

/// Scan and rebuild formatting; markers get an empty slot to be filled.
fn split(text: &str) -> (Vec<Slot>, Vec<PendingToken>) {
    let mut slots = Vec::new();
    let mut pending = Vec::new();

    for segment in Scanner::new(text) {
        match segment {
            Segment::Plain(plain) => slots.push(Slot::Runs(parse_segment(plain))),
            Segment::Token(marker) => {
                pending.push(PendingToken {
                    slot: slots.len(),
                    raw: marker.raw.to_string(),
                    type_id: marker.type_id.to_string(),
                    token_id: marker.token_id.to_string(),
                });
                slots.push(Slot::Token);
            }
        }
    }

    (slots, pending)
}

/// Decode with the default configuration.
pub async fn decode<R>(text: &str, resolver: &R) -> Document
where
    R: TokenResolver + ?Sized,
{
    Decoder::default().decode(text, resolver).await
}

/// Decode without a resolver. Every well-formed marker becomes an
/// unresolved reference, so the result encodes back to the same markers.
pub fn decode_unresolved(text: &str) -> Document {
    let nodes = Scanner::new(text)
        .flat_map(|segment| match segment {
            Segment::Plain(plain) => parse_segment(plain)
                .into_iter()
                .map(Node::Text)
                .collect::<Vec<_>>(),
            Segment::Token(marker) => vec![Node::Token(TokenReference::unresolved(
                marker.type_id,
                marker.token_id,
            ))],
        })
        .collect();
    Document::normalized(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use crate::resolver::{MemoryResolver, UnavailableResolver};
    use tokenfield_model::{FormatMark, TokenType};

    fn record(id: &str, type_id: &str) -> TokenRecord {
        TokenRecord::new(id, "Doctor Name", TokenType::new(type_id, "Doctor Token", "#0045ff"))
    }

    #[tokio::test]
    async fn test_resolvable_token() {
        let resolver = MemoryResolver::with_records([record("t1", "RP")]);
        let doc = decode("[TOKEN:RP:t1]", &resolver).await;

        assert_eq!(doc.nodes(), &[Node::token(record("t1", "RP"))]);
        assert_eq!(encode(&doc), "[TOKEN:RP:t1]");
    }

    #[tokio::test]
    async fn test_type_mismatch_falls_back() {
        let resolver = MemoryResolver::with_records([record("t1", "AB")]);
        let (doc, report) = Decoder::default()
            .decode_with_report("[TOKEN:RP:t1]", &resolver)
            .await;

        assert_eq!(doc.nodes(), &[Node::text("[TOKEN:RP:t1]")]);
        assert_eq!(
            report.unresolved[0].reason,
            FallbackReason::TypeMismatch { found: "AB".into() }
        );
    }

    #[tokio::test]
    async fn test_not_found_round_trips_byte_for_byte() {
        let resolver = MemoryResolver::new();
        let text = "Dear [TOKEN:RP:t1], **welcome**";
        let doc = decode(text, &resolver).await;

        assert_eq!(doc.references().count(), 0);
        assert_eq!(encode(&doc), text);
    }

    #[tokio::test]
    async fn test_resolver_failure_falls_back() {
        let (doc, report) = Decoder::default()
            .decode_with_report("a[TOKEN:RP:t1]b", &UnavailableResolver)
            .await;

        assert_eq!(doc.nodes(), &[Node::text("a[TOKEN:RP:t1]b")]);
        assert!(matches!(
            report.unresolved[0].reason,
            FallbackReason::ResolverFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_sequential_and_concurrent_agree() {
        let resolver =
            MemoryResolver::with_records([record("1", "A"), record("2", "B"), record("3", "A")]);
        let text = "# Hi [TOKEN:A:1] and [TOKEN:B:2]*x*[TOKEN:B:3] [TOKEN:A:3]";

        let sequential = Decoder::new(DecoderConfig {
            mode: ResolveMode::Sequential,
        });
        let concurrent = Decoder::new(DecoderConfig {
            mode: ResolveMode::Concurrent { limit: 2 },
        });

        let (a, report_a) = sequential.decode_with_report(text, &resolver).await;
        let (b, report_b) = concurrent.decode_with_report(text, &resolver).await;

        assert_eq!(a, b);
        assert_eq!(report_a, report_b);
        assert_eq!(report_a.resolved, 3);
        assert_eq!(report_a.unresolved.len(), 1);
        assert_eq!(encode(&a), text);
    }

    #[tokio::test]
    async fn test_concurrent_decode_runs_on_spawned_task() {
        let resolver = std::sync::Arc::new(MemoryResolver::with_records([
            record("1", "A"),
            record("2", "A"),
        ]));
        let decoder = Decoder::new(DecoderConfig {
            mode: ResolveMode::Concurrent { limit: 4 },
        });

        let handle = tokio::spawn(async move {
            decoder
                .decode_with_report("[TOKEN:A:1] [TOKEN:A:2] [TOKEN:A:9]", resolver.as_ref())
                .await
        });
        let (doc, report) = handle.await.unwrap();

        assert_eq!(report.resolved, 2);
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(encode(&doc), "[TOKEN:A:1] [TOKEN:A:2] [TOKEN:A:9]");
    }

    #[tokio::test]
    async fn test_formatting_idempotence() {
        let resolver = MemoryResolver::new();
        let doc = decode("**bold** and *italic*", &resolver).await;

        assert_eq!(
            doc.nodes(),
            &[
                Node::formatted("bold", FormatMark::Bold),
                Node::text(" and "),
                Node::formatted("italic", FormatMark::Italic),
            ]
        );
        assert_eq!(encode(&doc), "**bold** and *italic*");
    }

    #[tokio::test]
    async fn test_block_marker_after_reference() {
        let resolver = MemoryResolver::with_records([record("t1", "RP")]);
        let doc = decode("[TOKEN:RP:t1]> quoted", &resolver).await;

        assert_eq!(doc.nodes()[1], Node::formatted("quoted", FormatMark::Blockquote));
    }

    #[test]
    fn test_decode_unresolved_keeps_markers() {
        let text = "Hi [TOKEN:RP:t1]!";
        let doc = decode_unresolved(text);

        assert_eq!(
            doc.nodes()[1],
            Node::Token(TokenReference::unresolved("RP", "t1"))
        );
        assert_eq!(encode(&doc), text);
    }

    #[test]
    fn test_resolve_mode_serde() {
        let mode: ResolveMode = serde_json::from_str(r#"{"mode":"concurrent","limit":4}"#).unwrap();
        assert_eq!(mode, ResolveMode::Concurrent { limit: 4 });

        let config: DecoderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.mode, ResolveMode::default());
    }
}
