//! Best total distance persistence
//!
//! A single value survives between sessions: JSON file on native,
//! LocalStorage on wasm, in-memory for tests and headless runs.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::LaunchResult;

/// Persisted best-score document
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BestRecord {
    /// Best completed-game total distance (meters)
    pub best_total_distance: f32,
}

/// Where the best score lives between sessions
pub trait BestScoreStore {
    /// Stored best, 0 when nothing has been saved yet
    fn load(&self) -> LaunchResult<f32>;
    fn save(&mut self, best: f32) -> LaunchResult<()>;
}

/// In-memory store. Clones share the same slot, so a test can keep a handle
/// while the score manager owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: Rc<Cell<f32>>,
    saves: Rc<Cell<u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: f32) -> Self {
        let store = Self::default();
        store.best.set(best);
        store
    }

    pub fn best(&self) -> f32 {
        self.best.get()
    }

    /// Number of successful saves
    pub fn saves(&self) -> u32 {
        self.saves.get()
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> LaunchResult<f32> {
        Ok(self.best.get())
    }

    fn save(&mut self, best: f32) -> LaunchResult<()> {
        self.best.set(best);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub const FILE_NAME: &'static str = "penguin_launch_best.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BestScoreStore for JsonFileStore {
    fn load(&self) -> LaunchResult<f32> {
        if !self.path.exists() {
            log::info!("No best score at {}, starting fresh", self.path.display());
            return Ok(0.0);
        }
        let json = fs::read_to_string(&self.path)?;
        let record: BestRecord = serde_json::from_str(&json)?;
        log::info!("Loaded best score from {}", self.path.display());
        Ok(record.best_total_distance)
    }

    fn save(&mut self, best: f32) -> LaunchResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&BestRecord {
            best_total_distance: best,
        })?;
        fs::write(&self.path, json)?;
        log::info!("Best score saved ({:.1} m)", best);
        Ok(())
    }
}

/// Browser LocalStorage store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    const STORAGE_KEY: &'static str = "penguin_launch_best";

    fn storage() -> LaunchResult<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| crate::LaunchError::Persistence("LocalStorage unavailable".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl BestScoreStore for LocalStorageStore {
    fn load(&self) -> LaunchResult<f32> {
        let storage = Self::storage()?;
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => {
                let record: BestRecord = serde_json::from_str(&json)?;
                Ok(record.best_total_distance)
            }
            _ => {
                log::info!("No best score found, starting fresh");
                Ok(0.0)
            }
        }
    }

    fn save(&mut self, best: f32) -> LaunchResult<()> {
        let storage = Self::storage()?;
        let json = serde_json::to_string(&BestRecord {
            best_total_distance: best,
        })?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| crate::LaunchError::Persistence("LocalStorage write rejected".into()))?;
        log::info!("Best score saved ({:.1} m)", best);
        Ok(())
    }
}

/// The platform's persistent store: LocalStorage in the browser, a JSON file
/// in the working directory otherwise
pub fn platform_store() -> Box<dyn BestScoreStore> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(LocalStorageStore)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(JsonFileStore::new(JsonFileStore::FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("penguin_launch_test_{}_{}", std::process::id(), name))
            .join(JsonFileStore::FILE_NAME)
    }

    #[test]
    fn test_memory_store_shares_slot() {
        let store = MemoryStore::with_best(12.5);
        let mut owned: Box<dyn BestScoreStore> = Box::new(store.clone());
        assert_eq!(owned.load().unwrap(), 12.5);
        owned.save(40.0).unwrap();
        assert_eq!(store.best(), 40.0);
        assert_eq!(store.saves(), 1);
    }

    #[test]
    fn test_file_store_missing_file_is_zero() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.load().unwrap(), 0.0);
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = temp_path("round_trip");
        let mut store = JsonFileStore::new(&path);
        store.save(35.0).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load().unwrap(), 35.0);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_corrupt_is_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(crate::LaunchError::Persistence(_))
        ));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
