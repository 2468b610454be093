//! Normalized shape caching
//!
//! Normalization is pure, so a fragment's result is memoized under the
//! SHA-256 of its JSON text. Entries never go stale on their own; callers
//! clear the cache when the well-known definitions change.

use crate::{PropShape, Result, ShapeNormalizer};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Read-through cache in front of a [`ShapeNormalizer`].
#[derive(Debug, Default)]
pub struct ShapeCache {
    normalizer: ShapeNormalizer,
    shapes: RwLock<HashMap<String, Arc<PropShape>>>,
}

impl ShapeCache {
    pub fn new(normalizer: ShapeNormalizer) -> Self {
        Self {
            normalizer,
            shapes: RwLock::new(HashMap::new()),
        }
    }

    pub fn normalizer(&self) -> &ShapeNormalizer {
        &self.normalizer
    }

    /// Returns the normalized shape for `raw`, normalizing on first use.
    ///
    /// Errors are not cached.
    pub fn normalize(&self, raw: &Value) -> Result<Arc<PropShape>> {
        let key = hex::encode(Sha256::digest(raw.to_string().as_bytes()));
        if let Some(shape) = self.read().get(&key) {
            return Ok(Arc::clone(shape));
        }

        let shape = Arc::new(self.normalizer.normalize(raw)?);
        debug!(key = %key, "Normalized prop shape");
        let mut shapes = self.shapes.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(shapes.entry(key).or_insert(shape)))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.shapes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<PropShape>>> {
        self.shapes.read().unwrap_or_else(|e| e.into_inner())
    }
}
