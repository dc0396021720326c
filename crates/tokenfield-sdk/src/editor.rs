//! Editing surface for a token-aware document.
//!
//! Every reference in the document is an embed with a stable [`EmbedId`].
//! Each embed gets a [`ReferenceHandle`] when it is created; the handle is
//! the only way a rendered reference can remove itself. Handles point back
//! to the editor weakly and go inert when their embed is gone, including
//! after the whole document is replaced by a load.

use crate::error::Result;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};
use tokenfield_model::{Document, FormatSet, Node, TokenRecord, TokenReference};
use tokio::sync::broadcast;
use ulid::Ulid;

/// Stable identity of an embedded reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmbedId(Ulid);

impl EmbedId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EmbedId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EmbedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Events emitted by the editor.
#[derive(Clone, Debug)]
pub enum EditEvent {
    /// A local edit changed the document.
    Changed(Document),
    /// The document was replaced outright.
    Replaced(Document),
}

/// Document plus one embed id per reference, in reading order.
struct EditorState {
    document: Document,
    embeds: Vec<EmbedId>,
}

impl EditorState {
    fn new(document: Document) -> Self {
        let embeds = document.references().map(|_| EmbedId::new()).collect();
        Self { document, embeds }
    }

    /// Number of references strictly before `position`.
    fn embeds_before(&self, position: usize) -> usize {
        self.document
            .reference_positions()
            .iter()
            .take_while(|p| **p < position)
            .count()
    }
}

struct Shared {
    state: RwLock<EditorState>,
    events: broadcast::Sender<EditEvent>,
}

impl Shared {
    fn emit(&self, event: EditEvent) {
        let _ = self.events.send(event);
    }

    fn remove_embed(&self, embed: EmbedId) -> bool {
        let mut state = self.state.write();
        let Some(index) = state.embeds.iter().position(|id| *id == embed) else {
            return false;
        };
        let Some(position) = state.document.reference_positions().get(index).copied() else {
            return false;
        };
        if state.document.delete(position, 1).is_err() {
            return false;
        }
        state.embeds.remove(index);
        self.emit(EditEvent::Changed(state.document.clone()));
        true
    }
}

/// Capability to remove one embedded reference.
#[derive(Clone)]
pub struct ReferenceHandle {
    embed: EmbedId,
    editor: Weak<Shared>,
}

impl ReferenceHandle {
    pub fn embed(&self) -> EmbedId {
        self.embed
    }

    /// Whether the embed is still in the document.
    pub fn is_live(&self) -> bool {
        self.editor
            .upgrade()
            .map(|shared| shared.state.read().embeds.contains(&self.embed))
            .unwrap_or(false)
    }

    /// The reference this handle points at, if it still exists.
    pub fn reference(&self) -> Option<TokenReference> {
        let shared = self.editor.upgrade()?;
        let state = shared.state.read();
        let index = state.embeds.iter().position(|id| *id == self.embed)?;
        let reference = state.document.references().nth(index).cloned();
        reference
    }

    /// Remove the reference from the document. Returns `false` when the
    /// handle is inert.
    pub fn remove(&self) -> bool {
        match self.editor.upgrade() {
            Some(shared) => shared.remove_embed(self.embed),
            None => false,
        }
    }
}

impl fmt::Debug for ReferenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceHandle")
            .field("embed", &self.embed)
            .finish()
    }
}

/// An embedded reference as listed by [`Editor::embeds`].
#[derive(Clone, Debug)]
pub struct Embed {
    pub handle: ReferenceHandle,
    pub position: usize,
    pub reference: TokenReference,
}

/// A document being edited.
#[derive(Clone)]
pub struct Editor {
    shared: Arc<Shared>,
}

impl Editor {
    /// Create an editor over an empty document.
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Create an editor whose event channel holds `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(EditorState::new(Document::new())),
                events,
            }),
        }
    }

    /// Subscribe to edit events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditEvent> {
        self.shared.events.subscribe()
    }

    /// A snapshot of the current document.
    pub fn document(&self) -> Document {
        self.shared.state.read().document.clone()
    }

    pub fn len(&self) -> usize {
        self.shared.state.read().document.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a reference to `record` at `position`.
    pub fn insert_reference(&self, record: TokenRecord, position: usize) -> Result<ReferenceHandle> {
        let embed = EmbedId::new();
        let mut state = self.shared.state.write();

        let index = state.embeds_before(position);
        state.document.insert_node(position, Node::token(record))?;
        state.embeds.insert(index, embed);

        self.shared.emit(EditEvent::Changed(state.document.clone()));
        Ok(self.handle_for(embed))
    }

    /// Insert text with the given attributes at `position`.
    pub fn insert_text(&self, position: usize, text: &str, attributes: FormatSet) -> Result<()> {
        let mut state = self.shared.state.write();
        state.document.insert_text(position, text, attributes)?;
        self.shared.emit(EditEvent::Changed(state.document.clone()));
        Ok(())
    }

    /// Delete a range. Returns the references that were removed.
    pub fn delete(&self, position: usize, length: usize) -> Result<Vec<TokenReference>> {
        let mut state = self.shared.state.write();

        let first = state.embeds_before(position);
        let removed = state.document.delete(position, length)?;
        state.embeds.drain(first..first + removed.len());

        self.shared.emit(EditEvent::Changed(state.document.clone()));
        Ok(removed)
    }

    /// Every embed currently in the document, in reading order.
    pub fn embeds(&self) -> Vec<Embed> {
        let state = self.shared.state.read();
        state
            .embeds
            .iter()
            .zip(state.document.reference_positions())
            .zip(state.document.references())
            .map(|((embed, position), reference)| Embed {
                handle: self.handle_for(*embed),
                position,
                reference: reference.clone(),
            })
            .collect()
    }

    /// Replace the document outright. Every existing handle goes inert.
    pub fn replace(&self, document: Document) {
        self.replace_if(document, || true);
    }

    /// Replace the document if `accept` agrees, checked under the write lock.
    pub(crate) fn replace_if(&self, document: Document, accept: impl FnOnce() -> bool) -> bool {
        let mut state = self.shared.state.write();
        if !accept() {
            return false;
        }
        *state = EditorState::new(document);
        self.shared.emit(EditEvent::Replaced(state.document.clone()));
        true
    }

    fn handle_for(&self, embed: EmbedId) -> ReferenceHandle {
        ReferenceHandle {
            embed,
            editor: Arc::downgrade(&self.shared),
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
