//! Typed data graph for propbind.
//!
//! Describes what structured content looks like, not the content itself:
//! - [`FieldDefinition`], [`PropertyDefinition`], [`FieldTypeDefinition`] —
//!   entity fields and their item-level properties
//! - [`TypedDataProvider`] — the read-only metadata interface the host CMS
//!   implements; [`InMemoryTypedData`] is a self-contained implementation
//! - [`TypedDataGraphWalker`] — enumerates an entity type's properties and
//!   follows entity references up to an explicit recursion budget
//!
//! The walker never detects cycles: every recursive step spends one unit of
//! budget, so a self-referencing entity type still terminates.

mod catalog;
mod definition;
mod provider;
mod walker;

pub use catalog::standard_field_types;
pub use definition::{
    EntityTypeRef, FieldDefinition, FieldTypeDefinition, PrimitiveKind, PropertyDefinition,
    PropertyRole,
};
pub use provider::{InMemoryTypedData, TypedDataProvider};
pub use walker::{
    DataLeaf, FieldTypeException, LeafKind, ReferenceHop, SkipReason, TypedDataGraphWalker,
    WalkPolicy, DEFAULT_DENIED_FIELD_TYPES,
};
