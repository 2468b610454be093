//! Prop shapes for propbind.
//!
//! A component declares each prop with a JSON-Schema-like fragment. This
//! crate turns those fragments into canonical [`PropShape`]s and translates a
//! scalar shape into the [`ShapeRequirements`] a piece of structured data
//! must meet to feed that prop:
//! - [`ShapeNormalizer`] — resolves `$ref` shorthands to well-known shapes
//!   and strips annotation keywords
//! - [`ShapeRequirementTranslator`] — `format`, `enum`, `pattern`,
//!   `contentMediaType`, … → requirements
//! - [`ShapeCache`] — read-through memoization keyed by content hash
//!
//! Only the keywords the matcher uses are understood; this is not a JSON
//! Schema validator.

mod cache;
mod error;
mod normalize;
mod requirement;
mod shape;
mod translate;

pub use cache::ShapeCache;
pub use error::{Result, ShapeError};
pub use normalize::{ShapeNormalizer, DEFINITIONS_PREFIX};
pub use requirement::{
    constraint, ConstraintMap, ConstraintOptions, DataConstraints, ShapeRequirement,
    ShapeRequirements,
};
pub use shape::{JsonSchemaType, PropShape, ShapeKind};
pub use translate::{ShapeRequirementTranslator, FILE_REFERENCE, FORMATTED_TEXT};
