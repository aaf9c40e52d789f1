//! Revealed-day persistence
//!
//! A tiny durable key-value store (one file per key under the user's config directory)
//! and the revealed-days set stored in it as a JSON array. Every failure is logged
//! and treated as "nothing revealed yet".

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use bevy::prelude::*;
use dirs::config_dir;

use super::constants::REVEALED_DAYS_KEY;
use super::error::CountdownError;

/// Directory name under the platform config dir
const APP_DIR_NAME: &str = "swan_tour";

/// Durable string storage keyed by name.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, CountdownError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), CountdownError>;
}

/// Stores each key as `<root>/<key>.json`.
pub struct FileStore {
    root: Option<PathBuf>,
}

impl FileStore {
    pub fn in_config_dir() -> Self {
        Self {
            root: config_dir().map(|dir| dir.join(APP_DIR_NAME)),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CountdownError> {
        self.root
            .as_ref()
            .map(|root| root.join(format!("{key}.json")))
            .ok_or_else(|| {
                CountdownError::StorageUnavailable("no config directory on this platform".into())
            })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CountdownError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| CountdownError::StorageUnavailable(format!("{}: {e}", path.display())))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CountdownError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CountdownError::StorageUnavailable(format!("{}: {e}", parent.display()))
            })?;
        }
        fs::write(&path, value)
            .map_err(|e| CountdownError::StorageUnavailable(format!("{}: {e}", path.display())))
    }
}

/// Set of day numbers whose reveal animation has already played.
#[derive(Resource)]
pub struct RevealedDays {
    store: Box<dyn KeyValueStore>,
}

impl RevealedDays {
    pub fn new(store: impl KeyValueStore) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    fn try_load(&self) -> Result<BTreeSet<u32>, CountdownError> {
        let Some(stored) = self.store.get(REVEALED_DAYS_KEY)? else {
            return Ok(BTreeSet::new());
        };
        let days: Vec<u32> = serde_json::from_str(&stored)
            .map_err(|e| CountdownError::StorageUnavailable(format!("malformed entry: {e}")))?;
        Ok(days.into_iter().collect())
    }

    pub fn load(&self) -> BTreeSet<u32> {
        self.try_load().unwrap_or_else(|e| {
            warn!("Reading revealed days failed, treating as none revealed: {e}");
            BTreeSet::new()
        })
    }

    pub fn is_revealed(&self, day: u32) -> bool { self.load().contains(&day) }

    /// Adds `day` to the persisted set. Days are never removed.
    pub fn mark_revealed(&mut self, day: u32) {
        let mut days = self.load();
        if !days.insert(day) {
            return;
        }

        let serialized = match serde_json::to_string(&days.into_iter().collect::<Vec<_>>()) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("Failed to serialize revealed days: {e}");
                return;
            },
        };

        match self.store.set(REVEALED_DAYS_KEY, &serialized) {
            Ok(()) => debug!("Day {day} marked revealed"),
            Err(e) => warn!("Failed to persist revealed day {day}: {e}"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    fn raw_entry(store: &MemoryStore) -> Option<String> {
        store
            .entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(REVEALED_DAYS_KEY).cloned())
    }

    #[test]
    fn nothing_is_revealed_initially() {
        let revealed = RevealedDays::new(MemoryStore::default());
        assert!(revealed.load().is_empty());
        assert!(!revealed.is_revealed(1));
    }

    #[test]
    fn marking_persists_a_json_array() {
        let store = MemoryStore::default();
        let mut revealed = RevealedDays::new(store.clone());
        revealed.mark_revealed(3);
        revealed.mark_revealed(1);
        revealed.mark_revealed(3);

        assert!(revealed.is_revealed(1));
        assert!(revealed.is_revealed(3));
        assert!(!revealed.is_revealed(2));
        assert_eq!(raw_entry(&store).as_deref(), Some("[1,3]"));
    }

    #[test]
    fn existing_entries_survive_new_reveals() {
        let store = MemoryStore::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(REVEALED_DAYS_KEY.to_string(), "[7]".to_string());
        }
        let mut revealed = RevealedDays::new(store.clone());
        revealed.mark_revealed(8);
        assert_eq!(raw_entry(&store).as_deref(), Some("[7,8]"));
    }

    #[test]
    fn malformed_entry_reads_as_empty() {
        let store = MemoryStore::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(REVEALED_DAYS_KEY.to_string(), "{not json".to_string());
        }
        let revealed = RevealedDays::new(store);
        assert!(revealed.load().is_empty());
    }

    #[test]
    fn unavailable_storage_degrades_silently() {
        let mut revealed = RevealedDays::new(MemoryStore {
            unavailable: true,
            ..MemoryStore::default()
        });
        revealed.mark_revealed(2);
        assert!(!revealed.is_revealed(2));
    }
}
