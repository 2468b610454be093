//! Versioned property bags.
//!
//! A snapshot holds exactly one active version and any number of archived
//! ones. Reads go to the loaded version, writes to the active one.

use crate::error::{Result, VersionError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Property name → value.
pub type PropertyBag = BTreeMap<String, Value>;

/// One archived version in a [`SnapshotRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedVersion {
    pub version: String,
    pub properties: PropertyBag,
}

/// Persisted form of a snapshot. Archived versions are oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub active_version: String,
    pub active: PropertyBag,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub archived: Vec<ArchivedVersion>,
}

/// An entity's version-scoped properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord", into = "SnapshotRecord")]
pub struct VersionedEntitySnapshot {
    active_key: String,
    active: PropertyBag,
    /// Oldest first.
    archive: Vec<(String, PropertyBag)>,
    loaded_key: String,
    syncing: bool,
}

impl VersionedEntitySnapshot {
    /// A snapshot with one empty active version.
    pub fn new(initial_key: impl Into<String>) -> Self {
        let key = initial_key.into();
        Self {
            loaded_key: key.clone(),
            active_key: key,
            active: PropertyBag::new(),
            archive: Vec::new(),
            syncing: false,
        }
    }

    pub fn active_version_key(&self) -> &str {
        &self.active_key
    }

    pub fn loaded_version_key(&self) -> &str {
        &self.loaded_key
    }

    pub fn is_active_version_loaded(&self) -> bool {
        self.loaded_key == self.active_key
    }

    /// Makes `key` the active version and loads it.
    ///
    /// The previous active version is archived. A key that is already
    /// archived gets its archived properties back; any other key starts
    /// empty. Creating the active key again changes nothing.
    pub fn create_version(&mut self, key: &str) {
        if key == self.active_key {
            debug!(version = key, "Version already active");
            return;
        }
        let restored = self
            .archive_position(key)
            .map(|i| self.archive.remove(i).1)
            .unwrap_or_default();
        let previous_key = std::mem::replace(&mut self.active_key, key.to_string());
        let previous = std::mem::replace(&mut self.active, restored);
        self.archive.push((previous_key, previous));
        self.loaded_key = key.to_string();
        debug!(version = key, archived = self.archive.len(), "Created version");
    }

    pub fn load_version(&mut self, key: &str) -> Result<()> {
        if !self.has_version(key) {
            return Err(VersionError::UnknownVersion(key.to_string()));
        }
        self.loaded_key = key.to_string();
        Ok(())
    }

    /// Loads the active version again.
    pub fn reset_to_active_version(&mut self) {
        self.loaded_key.clone_from(&self.active_key);
    }

    pub fn has_version(&self, key: &str) -> bool {
        key == self.active_key || self.archive_position(key).is_some()
    }

    /// Reads a property of the loaded version.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.loaded().get(property)
    }

    /// All properties of the loaded version.
    pub fn loaded(&self) -> &PropertyBag {
        if self.is_active_version_loaded() {
            return &self.active;
        }
        self.archive
            .iter()
            .find(|(k, _)| *k == self.loaded_key)
            .map_or(&self.active, |(_, bag)| bag)
    }

    pub fn active(&self) -> &PropertyBag {
        &self.active
    }

    /// Writes a property of the active version.
    ///
    /// Fails while an archived version is loaded, unless syncing.
    pub fn set(&mut self, property: &str, value: Value) -> Result<()> {
        if !self.is_active_version_loaded() && !self.syncing {
            return Err(VersionError::NotActiveVersion {
                loaded: self.loaded_key.clone(),
                active: self.active_key.clone(),
            });
        }
        self.active.insert(property.to_string(), value);
        Ok(())
    }

    /// Removes a property from the active version, with the same rules as
    /// [`set`](Self::set).
    pub fn unset(&mut self, property: &str) -> Result<Option<Value>> {
        if !self.is_active_version_loaded() && !self.syncing {
            return Err(VersionError::NotActiveVersion {
                loaded: self.loaded_key.clone(),
                active: self.active_key.clone(),
            });
        }
        Ok(self.active.remove(property))
    }

    /// Sync mode lets configuration imports write while any version is
    /// loaded.
    pub fn set_syncing(&mut self, syncing: bool) {
        self.syncing = syncing;
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    pub fn delete_version(&mut self, key: &str) -> Result<()> {
        if key == self.active_key {
            return Err(VersionError::CannotDeleteActive(key.to_string()));
        }
        let position = self
            .archive_position(key)
            .ok_or_else(|| VersionError::UnknownVersion(key.to_string()))?;
        self.archive.remove(position);
        if self.loaded_key == key {
            self.reset_to_active_version();
        }
        Ok(())
    }

    /// Like [`delete_version`](Self::delete_version), but a missing key is
    /// not an error.
    pub fn delete_version_if_exists(&mut self, key: &str) -> Result<()> {
        match self.delete_version(key) {
            Err(VersionError::UnknownVersion(_)) => Ok(()),
            other => other,
        }
    }

    /// The active key, then archived keys newest first.
    pub fn get_versions(&self) -> Vec<&str> {
        std::iter::once(self.active_key.as_str())
            .chain(self.archive.iter().rev().map(|(k, _)| k.as_str()))
            .collect()
    }

    fn archive_position(&self, key: &str) -> Option<usize> {
        self.archive.iter().position(|(k, _)| k == key)
    }
}

impl From<VersionedEntitySnapshot> for SnapshotRecord {
    fn from(snapshot: VersionedEntitySnapshot) -> Self {
        Self {
            active_version: snapshot.active_key,
            active: snapshot.active,
            archived: snapshot
                .archive
                .into_iter()
                .map(|(version, properties)| ArchivedVersion {
                    version,
                    properties,
                })
                .collect(),
        }
    }
}

impl TryFrom<SnapshotRecord> for VersionedEntitySnapshot {
    type Error = VersionError;

    /// Loads the active version; sync mode is off.
    fn try_from(record: SnapshotRecord) -> Result<Self> {
        let mut seen = HashSet::from([record.active_version.as_str()]);
        for archived in &record.archived {
            if !seen.insert(archived.version.as_str()) {
                return Err(VersionError::InvalidRecord(format!(
                    "version '{}' appears twice",
                    archived.version
                )));
            }
        }
        Ok(Self {
            loaded_key: record.active_version.clone(),
            active_key: record.active_version,
            active: record.active,
            archive: record
                .archived
                .into_iter()
                .map(|a| (a.version, a.properties))
                .collect(),
            syncing: false,
        })
    }
}
