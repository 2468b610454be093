//! Component definitions with versioned settings.

use crate::error::Result;
use crate::snapshot::{PropertyBag, VersionedEntitySnapshot};
use propbind_types::ComponentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::info;

/// Version key of a definition that has never had its settings derived.
pub const FALLBACK_VERSION: &str = "fallback";

/// Hex characters kept from the settings hash.
const VERSION_KEY_LEN: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    #[default]
    Enabled,
    Disabled,
}

/// A component as stored by the host, with its settings under version
/// control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub id: ComponentId,
    pub label: String,
    #[serde(default)]
    pub status: ComponentStatus,
    snapshot: VersionedEntitySnapshot,
}

impl ComponentDefinition {
    pub fn new(id: impl Into<ComponentId>, label: &str) -> Self {
        Self {
            id: id.into(),
            label: label.to_string(),
            status: ComponentStatus::Enabled,
            snapshot: VersionedEntitySnapshot::new(FALLBACK_VERSION),
        }
    }

    /// Derives a version key from `settings` and makes that version active.
    ///
    /// Identical settings always map to the same key, so updating with
    /// unchanged settings creates nothing. Returns the key.
    pub fn update_settings(&mut self, settings: PropertyBag) -> Result<String> {
        let key = version_key(&settings);
        self.snapshot.reset_to_active_version();
        if key != self.snapshot.active_version_key() {
            info!(component = %self.id, version = %key, "New component version");
        }
        self.snapshot.create_version(&key);
        for (property, value) in settings {
            self.snapshot.set(&property, value)?;
        }
        Ok(key)
    }

    /// Settings of the loaded version.
    pub fn settings(&self) -> &PropertyBag {
        self.snapshot.loaded()
    }

    pub fn active_version(&self) -> &str {
        self.snapshot.active_version_key()
    }

    pub fn snapshot(&self) -> &VersionedEntitySnapshot {
        &self.snapshot
    }

    pub fn snapshot_mut(&mut self) -> &mut VersionedEntitySnapshot {
        &mut self.snapshot
    }

    pub fn is_enabled(&self) -> bool {
        self.status == ComponentStatus::Enabled
    }
}

/// Truncated SHA-256 of the settings' canonical JSON.
pub fn version_key(settings: &PropertyBag) -> String {
    let canonical = Value::Object(settings.clone().into_iter().collect()).to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    let mut key = hex::encode(digest);
    key.truncate(VERSION_KEY_LEN);
    key
}
