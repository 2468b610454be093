//! Prop shape matching for propbind.
//!
//! Given a component's prop shapes, finds the structured data able to feed
//! each prop and turns the matches into suggestions:
//! - [`FieldInstanceMatcher`] — scalar, object and array shapes against the
//!   typed data graph, following references to a configured depth
//! - [`AdapterMatcher`] — adapters whose output shape equals the prop shape
//! - [`SuggestionAggregator`] — per-prop suggestions ordered by the host's
//!   form display, labeled, with content-derived ids, flat or as a tree
//! - [`MatcherConfig`] — depths and field-type denials, from `matcher.toml`
//!
//! No match is not an error: every matching call returns a possibly empty
//! list.

mod adapter;
mod aggregate;
mod cache;
mod config;
mod display;
mod error;
mod hierarchy;
mod labeler;
mod matcher;

pub use adapter::{AdapterDescriptor, AdapterMatcher, AdapterRegistry, InMemoryAdapterRegistry};
pub use aggregate::{
    HierarchicalSuggestions, PropDeclaration, SuggestedAdapter, SuggestedInstance, Suggestion,
    SuggestionAggregator,
};
pub use cache::MatchCache;
pub use config::{FieldTypeExceptionConfig, MatcherConfig};
pub use display::{FormDisplayOrder, InMemoryFormDisplayOrder};
pub use error::{MatcherError, Result};
pub use hierarchy::{
    build_hierarchy, hierarchy_path, HierarchicalSuggestion, SuggestionSource, ITEMS_SEGMENT,
};
pub use labeler::{DefinitionLabeler, Labeler, LABEL_DELIMITER};
pub use matcher::{FieldInstanceMatcher, MatchScope};
