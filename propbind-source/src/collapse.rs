//! Compact storage of static prop sources.
//!
//! A static source whose metadata equals the component's declared default
//! for that prop is stored as its bare value; reading it back restores the
//! metadata from the default.

use crate::error::{PropSourceError, Result};
use crate::source::{PropSource, StaticPropSource, SOURCE_TYPE_KEY};
use serde_json::Value;
use std::collections::BTreeMap;

/// Collapses and restores prop sources against a component's defaults.
#[derive(Debug, Clone, Default)]
pub struct PropSourceCollapser {
    defaults: BTreeMap<String, StaticPropSource>,
}

impl PropSourceCollapser {
    /// `defaults` maps prop name → the component's declared default source.
    pub fn new(defaults: BTreeMap<String, StaticPropSource>) -> Self {
        Self { defaults }
    }

    #[must_use]
    pub fn with_default(mut self, prop: &str, source: StaticPropSource) -> Self {
        self.defaults.insert(prop.into(), source);
        self
    }

    pub fn default_for(&self, prop: &str) -> Option<&StaticPropSource> {
        self.defaults.get(prop)
    }

    /// The stored form of `source`: the bare value when only the value
    /// differs from the default, else the full source.
    pub fn collapse(&self, source: &PropSource, prop: &str) -> Result<Value> {
        if let (PropSource::Static(s), Some(default)) = (source, self.defaults.get(prop)) {
            if s.same_metadata(default) {
                return Ok(s.value.clone());
            }
        }
        source.to_value()
    }

    /// Reads a stored value back into a source.
    ///
    /// Anything without a `sourceType` key is a bare value, including
    /// `null` for a prop still being edited.
    pub fn uncollapse(&self, stored: &Value, prop: &str) -> Result<PropSource> {
        if stored.get(SOURCE_TYPE_KEY).is_some() {
            return PropSource::from_value(stored.clone());
        }
        let default = self
            .defaults
            .get(prop)
            .ok_or_else(|| PropSourceError::UnknownProp(prop.to_string()))?;
        Ok(PropSource::Static(StaticPropSource {
            value: stored.clone(),
            ..default.clone()
        }))
    }
}
