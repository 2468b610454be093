//! Memoized match results.
//!
//! Keyed by a content hash of the matcher config, the shape and the request
//! (required flag, cardinality, host type and bundle), so matchers with
//! different configs may share a cache. The data provider is not part of
//! the key: share a cache only between matchers over the same provider.
//! Entries never go stale on their own: whoever changes field metadata
//! clears the cache.

use crate::config::MatcherConfig;
use crate::matcher::MatchScope;
use propbind_shape::PropShape;
use propbind_types::{Cardinality, FieldExpression};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Debug, Default)]
pub struct MatchCache {
    entries: RwLock<HashMap<String, Arc<Vec<FieldExpression>>>>,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key of one match request.
    pub fn key(
        config: &MatcherConfig,
        shape: &PropShape,
        required: bool,
        cardinality: Cardinality,
        scope: Option<&MatchScope>,
    ) -> String {
        let (entity_type, bundle) = scope.map_or(("", ""), |s| {
            (s.entity_type.as_str(), s.bundle.as_deref().unwrap_or(""))
        });
        let content = format!(
            "{}|{}|{required}|{cardinality}|{entity_type}|{bundle}",
            config.fingerprint(),
            shape.content_hash()
        );
        hex::encode(Sha256::digest(content.as_bytes()))
    }

    /// Returns the cached result for `key`, computing it on first use.
    pub fn get_or_insert_with(
        &self,
        key: String,
        compute: impl FnOnce() -> Vec<FieldExpression>,
    ) -> Arc<Vec<FieldExpression>> {
        if let Some(found) = self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return Arc::clone(found);
        }

        let computed = Arc::new(compute());
        debug!(key = %key, matches = computed.len(), "Cached match result");
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(entries.entry(key).or_insert(computed))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry. Call when field or type metadata changes.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
