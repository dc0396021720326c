//! Memoizing resolver wrapper.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tokenfield_codec::{ResolveError, TokenResolver};
use tokenfield_model::TokenRecord;
use tracing::debug;

/// Remembers the answers of an inner resolver.
///
/// Both hits and confirmed absences are cached. Errors are not, so a lookup
/// that failed is retried on the next call.
pub struct CachingResolver<R> {
    inner: R,
    entries: RwLock<HashMap<String, Option<TokenRecord>>>,
}

impl<R: TokenResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Forget a single id.
    pub fn invalidate(&self, id: &str) {
        self.entries.write().remove(id);
    }

    /// Number of cached ids.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<R: TokenResolver> TokenResolver for CachingResolver<R> {
    async fn get_token_by_id(&self, id: &str) -> Result<Option<TokenRecord>, ResolveError> {
        let cached = self.entries.read().get(id).cloned();
        if let Some(entry) = cached {
            debug!(token_id = id, "token cache hit");
            return Ok(entry);
        }

        let found = self.inner.get_token_by_id(id).await?;
        self.entries.write().insert(id.to_string(), found.clone());
        Ok(found)
    }

    async fn get_all_tokens(&self) -> Result<Vec<TokenRecord>, ResolveError> {
        let records = self.inner.get_all_tokens().await?;
        let mut entries = self.entries.write();
        for record in &records {
            entries.insert(record.id.clone(), Some(record.clone()));
        }
        Ok(records)
    }

    async fn search_tokens(&self, query: &str) -> Result<Vec<TokenRecord>, ResolveError> {
        self.inner.search_tokens(query).await
    }
}
