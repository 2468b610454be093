//! Core type definitions for propbind.
//!
//! This crate defines the vocabulary shared by the matching engine, the prop
//! sources and the versioned component definitions:
//! - [`FieldExpression`] — an addressable path into an entity's typed data
//!   (a field item property, a chain through an entity reference, or an
//!   object assembled from several properties of one field)
//! - [`Cardinality`] — how many items a field holds or a prop requests
//! - Identifiers ([`ComponentId`], [`AdapterId`]) and content-derived
//!   [`SuggestionId`]s
//!
//! Nothing here knows about schemas or the data graph; those live in
//! `propbind-shape` and `propbind-graph`.

mod cardinality;
mod expression;
mod ids;

pub use cardinality::Cardinality;
pub use expression::{DirectField, FieldExpression, MappedField, ObjectField, ReferenceField};
pub use ids::{AdapterId, ComponentId, SuggestionId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid field expression '{input}': {reason}")]
    InvalidExpression { input: String, reason: String },

    #[error("invalid cardinality: {0}")]
    InvalidCardinality(i64),
}
