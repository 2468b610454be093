//! Prop sources for propbind.
//!
//! A prop's value comes from exactly one [`PropSource`]:
//! - `Static` — a literal, described as a value of some field type
//! - `Dynamic` — a [`FieldExpression`](propbind_types::FieldExpression)
//!   read from the host entity
//! - `DefaultRelativeUrl` — a component's example value with URLs relative
//!   to the component
//! - `Adapted` — an adapter's output, fed by other sources
//!
//! [`PropSourceCollapser`] stores static sources compactly, and
//! [`PropSource::evaluate`] turns any source into a value given an
//! [`EvaluationContext`].

mod collapse;
mod entity;
mod error;
mod evaluate;
mod source;

pub use collapse::PropSourceCollapser;
pub use entity::{EntityData, FieldItem, InMemoryEntity};
pub use error::{PropSourceError, Result};
pub use evaluate::{resolve, resolve_url, AdapterExecutor, EvaluationContext};
pub use source::{
    AdaptedPropSource, DefaultRelativeUrlPropSource, DynamicPropSource, PropSource,
    StaticExpression, StaticPropSource, SOURCE_TYPE_KEY,
};
