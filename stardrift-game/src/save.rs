//! Persistence envelope and tolerant save loading
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;
use thiserror::Error;

use crate::catalog::CollectCatalog;
use crate::collect::{AutoCollectEngine, CollectConfig, CollectState};

/// Everything needed to rebuild an [`AutoCollectEngine`].
///
/// Missing top-level fields fall back to their defaults individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AutoCollectSave {
    #[serde(default)]
    pub state: CollectState,
    #[serde(default)]
    pub config: CollectConfig,
    #[serde(default)]
    pub last_save_time: u64,
    #[serde(default)]
    pub rng_seed: u64,
}

impl AutoCollectSave {
    /// Strictly parse a save.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fields have the wrong shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Encode the save as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// How a save was obtained by [`load_save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The stored data parsed cleanly.
    Restored,
    /// There was no stored data; defaults were used.
    Fresh,
    /// The stored data was unreadable and was replaced with defaults.
    Recovered { reason: String },
}

impl LoadStatus {
    #[must_use]
    pub const fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSave {
    pub save: AutoCollectSave,
    pub status: LoadStatus,
}

/// Parse a stored save, falling back to defaults when it is missing or corrupt.
///
/// Corruption is never silent: it is reported through [`LoadStatus::Recovered`]
/// and logged as a warning. A missing save time is replaced with `now_ms`.
#[must_use]
pub fn load_save(raw: Option<&str>, now_ms: u64) -> LoadedSave {
    let trimmed = raw.map(str::trim).filter(|s| !s.is_empty() && *s != "null");
    let (mut save, status) = match trimmed {
        None => (AutoCollectSave::default(), LoadStatus::Fresh),
        Some(json) => match AutoCollectSave::from_json(json) {
            Ok(save) => (save, LoadStatus::Restored),
            Err(err) => {
                log::warn!("auto-collect save is corrupt, starting fresh: {err}");
                (
                    AutoCollectSave::default(),
                    LoadStatus::Recovered {
                        reason: err.to_string(),
                    },
                )
            }
        },
    };
    if save.last_save_time == 0 {
        save.last_save_time = now_ms;
    }
    LoadedSave { save, status }
}

/// Trait for abstracting save slot storage.
/// Platform-specific implementations should provide this
pub trait CollectStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write raw save JSON to a slot
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be written.
    fn write_slot(&self, slot: &str, json: &str) -> Result<(), Self::Error>;

    /// Read raw save JSON from a slot
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    fn read_slot(&self, slot: &str) -> Result<Option<String>, Self::Error>;

    /// Delete a slot
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be deleted.
    fn delete_slot(&self, slot: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum PersistError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to encode save: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage backend failed: {0}")]
    Storage(#[source] E),
}

/// In-memory slot storage, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectStorage for MemoryStorage {
    type Error = Infallible;

    fn write_slot(&self, slot: &str, json: &str) -> Result<(), Self::Error> {
        self.slots
            .borrow_mut()
            .insert(slot.to_string(), json.to_string());
        Ok(())
    }

    fn read_slot(&self, slot: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.slots.borrow().get(slot).cloned())
    }

    fn delete_slot(&self, slot: &str) -> Result<(), Self::Error> {
        self.slots.borrow_mut().remove(slot);
        Ok(())
    }
}

impl<C: CollectCatalog> AutoCollectEngine<C> {
    /// Snapshot the engine into a storage slot.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the storage write fails.
    pub fn save_to<S: CollectStorage>(
        &mut self,
        storage: &S,
        slot: &str,
        now_ms: u64,
    ) -> Result<(), PersistError<S::Error>> {
        let json = self.snapshot(now_ms).to_json()?;
        storage
            .write_slot(slot, &json)
            .map_err(PersistError::Storage)
    }

    /// Rebuild an engine from a storage slot, tolerating missing or corrupt data.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage read itself fails.
    pub fn load_from<S: CollectStorage>(
        storage: &S,
        slot: &str,
        catalog: C,
        now_ms: u64,
    ) -> Result<(Self, LoadStatus), S::Error> {
        let raw = storage.read_slot(slot)?;
        let LoadedSave { save, status } = load_save(raw.as_deref(), now_ms);
        Ok((Self::restore(save, catalog), status))
    }
}
