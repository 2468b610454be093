//! Matcher configuration, read from `matcher.toml`.
//!
//! Controls how deep references are followed and which field types are
//! kept out of suggestions.

use crate::error::{MatcherError, Result};
use propbind_graph::{FieldTypeException, WalkPolicy, DEFAULT_DENIED_FIELD_TYPES};
use propbind_shape::{PropShape, ShapeKind, ShapeNormalizer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{info, warn};

/// A denied field type that may still feed one exact shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTypeExceptionConfig {
    /// Raw schema fragment, normalized before comparison.
    pub shape: Value,
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Reference depth for plain scalar shapes.
    #[serde(default = "default_depth")]
    pub default_depth: u32,
    #[serde(default = "default_object_depth")]
    pub object_depth: u32,
    /// Reference depth for URI-like string shapes.
    #[serde(default = "default_uri_depth")]
    pub uri_depth: u32,
    #[serde(default = "default_denied_field_types")]
    pub denied_field_types: Vec<String>,
    #[serde(default = "default_field_type_exceptions")]
    pub field_type_exceptions: Vec<FieldTypeExceptionConfig>,
    #[serde(default)]
    pub denied_property_names: Vec<String>,
}

fn default_depth() -> u32 {
    1
}

fn default_object_depth() -> u32 {
    2
}

fn default_uri_depth() -> u32 {
    2
}

fn default_denied_field_types() -> Vec<String> {
    DEFAULT_DENIED_FIELD_TYPES
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn default_field_type_exceptions() -> Vec<FieldTypeExceptionConfig> {
    vec![FieldTypeExceptionConfig {
        shape: json!({"type": "number"}),
        field_type: "list_integer".into(),
    }]
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            default_depth: default_depth(),
            object_depth: default_object_depth(),
            uri_depth: default_uri_depth(),
            denied_field_types: default_denied_field_types(),
            field_type_exceptions: default_field_type_exceptions(),
            denied_property_names: Vec::new(),
        }
    }
}

impl MatcherConfig {
    /// Loads config from `path`.
    /// Falls back to defaults with a warning if the file is missing or invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No matcher config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded matcher config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse matcher config {:?}: {}. Falling back to defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read matcher config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Parses config from TOML text. Unlike [`load_from`](Self::load_from),
    /// errors are returned.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| MatcherError::Config(e.to_string()))
    }

    /// Short content hash of every setting; equal configs share it.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(format!("{self:?}").as_bytes());
        hex::encode(&digest[..8])
    }

    /// Reference depth used when matching `shape`.
    pub fn depth_for(&self, shape: &PropShape) -> u32 {
        match shape.kind() {
            ShapeKind::Object => self.object_depth,
            ShapeKind::Array => shape
                .items
                .as_deref()
                .map_or(self.default_depth, |items| self.depth_for(items)),
            ShapeKind::Scalar if shape.is_uri_like() => self.uri_depth,
            ShapeKind::Scalar => self.default_depth,
        }
    }

    /// Builds the walker policy, normalizing every exception shape.
    pub fn walk_policy(&self, normalizer: &ShapeNormalizer) -> Result<WalkPolicy> {
        let exceptions = self
            .field_type_exceptions
            .iter()
            .map(|e| -> Result<FieldTypeException> {
                Ok(FieldTypeException {
                    shape: normalizer.normalize(&e.shape)?,
                    field_type: e.field_type.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(WalkPolicy {
            denied_field_types: self.denied_field_types.iter().cloned().collect(),
            denied_property_names: self.denied_property_names.iter().cloned().collect(),
            exceptions,
        })
    }
}
