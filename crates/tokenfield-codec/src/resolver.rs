//! Token resolver abstraction and an in-memory catalog.

use crate::error::{ResolveError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use tokenfield_model::TokenRecord;

/// Looks up authoritative token records.
///
/// Implemented by the repository layer that talks to the content backend.
/// The decoder only calls [`get_token_by_id`](TokenResolver::get_token_by_id);
/// the listing and search calls serve token pickers.
#[async_trait]
pub trait TokenResolver: Send + Sync {
    /// Fetch a single token. `Ok(None)` when it does not exist.
    async fn get_token_by_id(&self, id: &str) -> Result<Option<TokenRecord>>;

    /// Every token known to the backend.
    async fn get_all_tokens(&self) -> Result<Vec<TokenRecord>>;

    /// Tokens matching a free-text query.
    async fn search_tokens(&self, query: &str) -> Result<Vec<TokenRecord>>;
}

#[async_trait]
impl<R: TokenResolver + ?Sized> TokenResolver for Arc<R> {
    async fn get_token_by_id(&self, id: &str) -> Result<Option<TokenRecord>> {
        (**self).get_token_by_id(id).await
    }

    async fn get_all_tokens(&self) -> Result<Vec<TokenRecord>> {
        (**self).get_all_tokens().await
    }

    async fn search_tokens(&self, query: &str) -> Result<Vec<TokenRecord>> {
        (**self).search_tokens(query).await
    }
}

#[derive(Debug, Default)]
struct Catalog {
    order: Vec<String>,
    records: HashMap<String, TokenRecord>,
}

/// In-memory resolver backed by a token catalog.
///
/// Records keep their insertion order for listing and search.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    catalog: RwLock<Catalog>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver from records. Later duplicates replace earlier ones.
    pub fn with_records(records: impl IntoIterator<Item = TokenRecord>) -> Self {
        let resolver = Self::new();
        for record in records {
            resolver.insert(record);
        }
        resolver
    }

    /// Load a catalog from a JSON array of token records.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<TokenRecord> = serde_json::from_str(json)?;
        Ok(Self::with_records(records))
    }

    /// Load a catalog from a reader yielding a JSON array of token records.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    /// Add or replace a record.
    pub fn insert(&self, record: TokenRecord) {
        let mut catalog = self.catalog.write();
        if !catalog.records.contains_key(&record.id) {
            catalog.order.push(record.id.clone());
        }
        catalog.records.insert(record.id.clone(), record);
    }

    /// Remove a record by id.
    pub fn remove(&self, id: &str) -> Option<TokenRecord> {
        let mut catalog = self.catalog.write();
        let removed = catalog.records.remove(id);
        if removed.is_some() {
            catalog.order.retain(|known| known != id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.catalog.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records in insertion order.
    pub fn records(&self) -> Vec<TokenRecord> {
        let catalog = self.catalog.read();
        catalog
            .order
            .iter()
            .filter_map(|id| catalog.records.get(id).cloned())
            .collect()
    }
}

/// Case-insensitive match against a record's id, name, type id and type name.
pub fn matches_query(record: &TokenRecord, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    [
        &record.id,
        &record.name,
        &record.token_type.id,
        &record.token_type.name,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&query))
}

#[async_trait]
impl TokenResolver for MemoryResolver {
    async fn get_token_by_id(&self, id: &str) -> Result<Option<TokenRecord>> {
        Ok(self.catalog.read().records.get(id).cloned())
    }

    async fn get_all_tokens(&self) -> Result<Vec<TokenRecord>> {
        Ok(self.records())
    }

    async fn search_tokens(&self, query: &str) -> Result<Vec<TokenRecord>> {
        Ok(self
            .records()
            .into_iter()
            .filter(|record| matches_query(record, query))
            .collect())
    }
}

/// A resolver that is never reachable. Every lookup fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableResolver;

#[async_trait]
impl TokenResolver for UnavailableResolver {
    async fn get_token_by_id(&self, _id: &str) -> Result<Option<TokenRecord>> {
        Err(ResolveError::Unavailable)
    }

    async fn get_all_tokens(&self) -> Result<Vec<TokenRecord>> {
        Err(ResolveError::Unavailable)
    }

    async fn search_tokens(&self, _query: &str) -> Result<Vec<TokenRecord>> {
        Err(ResolveError::Unavailable)
    }
}
