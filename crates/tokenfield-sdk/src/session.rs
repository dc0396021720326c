//! Editing sessions: load portable strings into an editor and save them back.

use crate::cache::CachingResolver;
use crate::config::SessionConfig;
use crate::editor::Editor;
use crate::error::{Result, SdkError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokenfield_codec::{encode, DecodeReport, Decoder, TokenResolver};
use tokenfield_model::{Document, TokenRecord};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Events emitted by a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A load replaced the editor's document.
    Loaded {
        generation: u64,
        resolved: usize,
        unresolved: usize,
    },
    /// A load finished after a newer one had started; its result was dropped.
    LoadDiscarded { generation: u64 },
    /// A document was encoded.
    Saved { bytes: usize },
}

/// Couples a resolver, a decoder and an editor.
///
/// Loads are last-writer-wins: every call to [`load`](Session::load) takes a
/// new generation, and a load only replaces the editor's document if no
/// newer load started while it was resolving.
pub struct Session {
    resolver: Arc<dyn TokenResolver>,
    decoder: Decoder,
    editor: Editor,
    generation: AtomicU64,
    config: SessionConfig,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create a session with the default configuration.
    pub fn new(resolver: Arc<dyn TokenResolver>) -> Self {
        let config = SessionConfig::default();
        let (event_tx, _) = broadcast::channel(config.event_capacity);
        Self {
            resolver,
            decoder: Decoder::new(config.decoder_config()),
            editor: Editor::with_capacity(config.event_capacity),
            generation: AtomicU64::new(0),
            config,
            event_tx,
        }
    }

    /// Create a session with an explicit configuration.
    pub fn with_config<R>(resolver: R, config: SessionConfig) -> Result<Self>
    where
        R: TokenResolver + 'static,
    {
        config.validate()?;

        let resolver: Arc<dyn TokenResolver> = if config.cache_lookups {
            Arc::new(CachingResolver::new(resolver))
        } else {
            Arc::new(resolver)
        };
        let (event_tx, _) = broadcast::channel(config.event_capacity);

        Ok(Self {
            resolver,
            decoder: Decoder::new(config.decoder_config()),
            editor: Editor::with_capacity(config.event_capacity),
            generation: AtomicU64::new(0),
            config,
            event_tx,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Generation of the most recently started load.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Decode `text` and make it the editor's document.
    ///
    /// Fails only with [`SdkError::Superseded`] when a newer load started
    /// before this one finished resolving.
    pub async fn load(&self, text: &str) -> Result<Document> {
        self.load_with_report(text).await.map(|(document, _)| document)
    }

    /// Like [`load`](Session::load), also reporting which markers stayed
    /// literal text.
    pub async fn load_with_report(&self, text: &str) -> Result<(Document, DecodeReport)> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (document, report) = self
            .decoder
            .decode_with_report(text, self.resolver.as_ref())
            .await;

        let current = || self.generation.load(Ordering::SeqCst) == generation;
        if !self.editor.replace_if(document.clone(), current) {
            warn!(generation, latest = self.generation(), "load superseded, result discarded");
            let _ = self.event_tx.send(SessionEvent::LoadDiscarded { generation });
            return Err(SdkError::Superseded { generation });
        }

        info!(
            generation,
            resolved = report.resolved,
            unresolved = report.unresolved.len(),
            "document loaded"
        );
        let _ = self.event_tx.send(SessionEvent::Loaded {
            generation,
            resolved: report.resolved,
            unresolved: report.unresolved.len(),
        });
        Ok((document, report))
    }

    /// Reload from a portable string. Same as [`load`](Session::load).
    pub async fn reload(&self, text: &str) -> Result<Document> {
        self.load(text).await
    }

    /// Encode the editor's current document.
    pub fn save(&self) -> String {
        self.save_document(&self.editor.document())
    }

    /// Encode any document.
    pub fn save_document(&self, document: &Document) -> String {
        let encoded = encode(document);
        info!(bytes = encoded.len(), references = document.references().count(), "document saved");
        let _ = self.event_tx.send(SessionEvent::Saved {
            bytes: encoded.len(),
        });
        encoded
    }

    /// Search the resolver's catalog, for token pickers.
    pub async fn search_tokens(&self, query: &str) -> Result<Vec<TokenRecord>> {
        Ok(self.resolver.search_tokens(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfigBuilder;
    use tokenfield_codec::{MemoryResolver, ResolveMode, UnavailableResolver};
    use tokenfield_model::{FormatSet, TokenType};

    fn doctor() -> TokenRecord {
        TokenRecord::new("t1", "Doctor Name", TokenType::new("RP", "Doctor", "#0045ff"))
    }

    fn session() -> Session {
        Session::new(Arc::new(MemoryResolver::with_records([doctor()])))
    }

    #[tokio::test]
    async fn test_load_then_save() {
        let session = session();
        let doc = session.load("Dear [TOKEN:RP:t1], **welcome**").await.unwrap();

        assert_eq!(doc.references().count(), 1);
        assert_eq!(session.editor().document(), doc);
        assert_eq!(session.save(), "Dear [TOKEN:RP:t1], **welcome**");
    }

    #[tokio::test]
    async fn test_unresolved_markers_heal_later() {
        let catalog = Arc::new(MemoryResolver::new());
        let session = Session::new(catalog.clone());

        let doc = session.load("[TOKEN:RP:t1]").await.unwrap();
        assert_eq!(doc.references().count(), 0);
        let saved = session.save();
        assert_eq!(saved, "[TOKEN:RP:t1]");

        catalog.insert(doctor());
        let healed = session.reload(&saved).await.unwrap();
        assert_eq!(healed.references().count(), 1);
    }

    #[tokio::test]
    async fn test_resolver_failure_is_not_an_error() {
        let session = Session::new(Arc::new(UnavailableResolver));
        let (doc, report) = session.load_with_report("x[TOKEN:RP:t1]").await.unwrap();

        assert_eq!(doc.plain_text(), "x[TOKEN:RP:t1]");
        assert_eq!(report.unresolved.len(), 1);
        assert!(session.search_tokens("doc").await.is_err());
    }

    #[tokio::test]
    async fn test_events() {
        let session = session();
        let mut events = session.subscribe();

        session.load("[TOKEN:RP:t1][TOKEN:RP:t2]").await.unwrap();
        session.save();

        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::Loaded {
                generation: 1,
                resolved: 1,
                unresolved: 1
            }
        );
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Saved { bytes: 26 });
    }

    #[tokio::test]
    async fn test_edits_after_load_are_saved() {
        let session = session();
        session.load("Hi ").await.unwrap();

        session
            .editor()
            .insert_reference(doctor(), 3)
            .unwrap();
        session.editor().insert_text(4, "!", FormatSet::new()).unwrap();

        assert_eq!(session.save(), "Hi [TOKEN:RP:t1]!");
    }

    #[test]
    fn test_with_config_validates() {
        let config = SessionConfigBuilder::new().event_capacity(0).build();
        assert!(matches!(
            Session::with_config(MemoryResolver::new(), config),
            Err(SdkError::Config(_))
        ));

        let config = SessionConfigBuilder::new().sequential().cache_lookups(true).build();
        let session = Session::with_config(MemoryResolver::new(), config).unwrap();
        assert_eq!(session.generation(), 0);
        assert!(session.config().cache_lookups);
        assert_eq!(session.config().resolve_mode, ResolveMode::Sequential);
    }
}
