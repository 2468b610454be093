//! Error types for the matcher.

use propbind_shape::ShapeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatcherError>;

#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("invalid matcher config: {0}")]
    Config(String),
}
