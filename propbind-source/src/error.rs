//! Error types for prop sources.

use propbind_types::{AdapterId, ComponentId, FieldExpression};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PropSourceError>;

#[derive(Debug, Error)]
pub enum PropSourceError {
    #[error("no default declared for prop '{0}'")]
    UnknownProp(String),

    #[error("invalid static value for field type '{field_type}': {reason}")]
    InvalidStaticValue { field_type: String, reason: String },

    /// Recoverable: the caller has no host entity to evaluate against.
    #[error("a host entity is required to evaluate '{0}'")]
    HostContextRequired(FieldExpression),

    #[error("expression '{expression}' is rooted on '{expected}', host entity is '{actual}'")]
    HostMismatch {
        expression: FieldExpression,
        expected: String,
        actual: String,
    },

    #[error("required value missing for '{0}'")]
    RequiredValueMissing(FieldExpression),

    #[error("no base path known for component '{0}'")]
    UnknownComponent(ComponentId),

    #[error("adapter '{adapter}' failed: {reason}")]
    AdapterFailed { adapter: AdapterId, reason: String },

    #[error("expression error: {0}")]
    Expression(#[from] propbind_types::Error),

    #[error("shape error: {0}")]
    Shape(#[from] propbind_shape::ShapeError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
