//! Persistence of component definitions.

use crate::component::ComponentDefinition;
use crate::error::{StoreError, StoreResult};
use propbind_types::ComponentId;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Loads and saves component definitions.
///
/// Each call is one transaction: a save replaces the whole definition, and
/// concurrent saves of one id are serialized by the store.
pub trait ComponentDefinitionStore {
    fn load(&self, id: &ComponentId) -> StoreResult<ComponentDefinition>;

    fn save(&self, definition: &ComponentDefinition) -> StoreResult<()>;

    /// Returns whether a definition was removed.
    fn delete(&self, id: &ComponentId) -> StoreResult<bool>;

    /// Stored ids, sorted.
    fn list(&self) -> StoreResult<Vec<ComponentId>>;
}

/// Keeps definitions in memory.
#[derive(Debug, Default)]
pub struct InMemoryComponentStore {
    definitions: Mutex<BTreeMap<ComponentId, ComponentDefinition>>,
}

impl InMemoryComponentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComponentDefinitionStore for InMemoryComponentStore {
    fn load(&self, id: &ComponentId) -> StoreResult<ComponentDefinition> {
        let definitions = self.definitions.lock().map_err(|_| StoreError::Poisoned)?;
        definitions
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn save(&self, definition: &ComponentDefinition) -> StoreResult<()> {
        let mut definitions = self.definitions.lock().map_err(|_| StoreError::Poisoned)?;
        definitions.insert(definition.id.clone(), definition.clone());
        Ok(())
    }

    fn delete(&self, id: &ComponentId) -> StoreResult<bool> {
        let mut definitions = self.definitions.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(definitions.remove(id).is_some())
    }

    fn list(&self) -> StoreResult<Vec<ComponentId>> {
        let definitions = self.definitions.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(definitions.keys().cloned().collect())
    }
}

/// One pretty-printed JSON file per definition, `<dir>/<id>.json`.
///
/// Saves write a temporary file and rename it over the old one.
#[derive(Debug)]
pub struct JsonFileComponentStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

const EXTENSION: &str = "json";

impl JsonFileComponentStore {
    /// Opens the store, creating `dir` if needed.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "Opened component definition store");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &ComponentId) -> StoreResult<PathBuf> {
        let name = id.as_str();
        let usable = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\'])
            && !name.contains("..");
        if !usable {
            return Err(StoreError::InvalidId(id.clone()));
        }
        Ok(self.dir.join(format!("{name}.{EXTENSION}")))
    }
}

impl ComponentDefinitionStore for JsonFileComponentStore {
    fn load(&self, id: &ComponentId) -> StoreResult<ComponentDefinition> {
        let path = self.path_for(id)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, definition: &ComponentDefinition) -> StoreResult<()> {
        let path = self.path_for(&definition.id)?;
        let content = serde_json::to_string_pretty(definition)?;
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        if let Err(e) = fs::write(&tmp, content).and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            warn!(component = %definition.id, error = %e, "Failed to save component definition");
            return Err(e.into());
        }
        debug!(
            component = %definition.id,
            version = definition.active_version(),
            "Saved component definition"
        );
        Ok(())
    }

    fn delete(&self, id: &ComponentId) -> StoreResult<bool> {
        let path = self.path_for(id)?;
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> StoreResult<Vec<ComponentId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(ComponentId::new(stem));
            }
        }
        ids.sort();
        Ok(ids)
    }
}
