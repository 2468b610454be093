//! Versioned component settings for propbind.
//!
//! - [`VersionedEntitySnapshot`] — one active and any number of archived
//!   property bags, with explicit load/create/delete transitions
//! - [`ComponentDefinition`] — a component whose settings are versioned by
//!   a hash of their content
//! - [`ComponentDefinitionStore`] — persistence, in memory or as JSON files

mod component;
mod error;
mod snapshot;
mod store;

pub use component::{version_key, ComponentDefinition, ComponentStatus, FALLBACK_VERSION};
pub use error::{Result, StoreError, StoreResult, VersionError};
pub use snapshot::{ArchivedVersion, PropertyBag, SnapshotRecord, VersionedEntitySnapshot};
pub use store::{ComponentDefinitionStore, InMemoryComponentStore, JsonFileComponentStore};
