//! Error types for shape normalization.

use thiserror::Error;

/// Result type for shape operations.
pub type Result<T> = std::result::Result<T, ShapeError>;

/// Errors raised while normalizing a schema fragment.
///
/// These are configuration errors in a component's prop declarations;
/// a shape that merely matches nothing is not an error.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// `$ref` names a shape that is not one of the well-known definitions.
    #[error("unknown shape reference: {0}")]
    UnknownShapeReference(String),

    /// The fragment has no `type` and no `$ref`.
    #[error("schema fragment has no type")]
    MissingType,

    /// `type` is present but not one of the supported JSON types.
    #[error("unsupported schema type: {0}")]
    UnsupportedType(String),

    /// The fragment is structurally invalid (not an object, bad `required`, …).
    #[error("malformed schema fragment: {0}")]
    Malformed(String),
}
