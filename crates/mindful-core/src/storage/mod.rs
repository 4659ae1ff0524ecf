//! Persistence layer.
//!
//! Two interchangeable backends implement [`Store`]: a durable SQLite
//! database and a volatile in-memory fallback used when the durable one
//! cannot be opened (and in tests). Both expose identical semantics;
//! `store_tests` runs one conformance suite against each.

pub mod database;
pub mod memory;
mod presets;

#[cfg(test)]
mod store_tests;

pub use database::SqliteStore;
pub use memory::MemoryStore;
pub use presets::{
    default_presets, new_preset_from, Layer, Layers, SoundPreset, TONE_HZ_MAX, TONE_HZ_MIN,
};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StorageError};
use crate::history::SessionRecord;
use crate::video::VideoItem;

/// Full contents of a store, as exported to (and imported from) a JSON
/// backup file. Field names match the export format, so older backups
/// with missing sections still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub presets: Vec<SoundPreset>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default, rename = "youtube")]
    pub videos: Vec<VideoItem>,
}

/// How an imported snapshot combines with existing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Upsert by id; incoming rows win on conflict, everything else stays.
    Merge,
    /// Drop all existing data first.
    Replace,
}

/// Storage backend contract.
///
/// Reads return rows in a fixed order: sessions newest first (ties broken
/// by id, descending), presets most recently updated first (ties by id,
/// ascending), saved videos most recently saved first. Writes are upserts
/// keyed by id; re-saving a row never duplicates it.
pub trait Store {
    fn backend_name(&self) -> &'static str;

    fn get_sessions(&self) -> Result<Vec<SessionRecord>, StorageError>;
    fn add_session(&mut self, record: &SessionRecord) -> Result<(), StorageError>;
    fn delete_session(&mut self, id: &str) -> Result<bool, StorageError>;
    fn clear_sessions(&mut self) -> Result<(), StorageError>;

    fn get_presets(&self) -> Result<Vec<SoundPreset>, StorageError>;
    fn save_preset(&mut self, preset: &SoundPreset) -> Result<(), StorageError>;
    fn upsert_presets(&mut self, presets: &[SoundPreset]) -> Result<(), StorageError> {
        for preset in presets {
            self.save_preset(preset)?;
        }
        Ok(())
    }
    fn delete_preset(&mut self, id: &str) -> Result<bool, StorageError>;

    fn all_settings(&self) -> Result<Map<String, Value>, StorageError>;
    fn get_setting(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set_setting(&mut self, key: &str, value: &Value) -> Result<(), StorageError>;

    fn saved_videos(&self) -> Result<Vec<VideoItem>, StorageError>;
    fn save_video(&mut self, video: &VideoItem) -> Result<(), StorageError>;
    fn remove_video(&mut self, id: &str) -> Result<bool, StorageError>;

    /// Opaque key-value rows for application state (e.g. a persisted
    /// session engine between CLI invocations).
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn kv_set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn kv_delete(&mut self, key: &str) -> Result<(), StorageError>;

    fn export_snapshot(&self) -> Result<Snapshot, StorageError>;
    fn import_snapshot(&mut self, snapshot: &Snapshot, mode: ImportMode)
        -> Result<(), StorageError>;
}

/// Returns `~/.config/mindful[-dev]/` based on MINDFUL_ENV.
///
/// Set MINDFUL_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MINDFUL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mindful-dev")
    } else {
        base_dir.join("mindful")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Open the best available backend: SQLite if the data directory and
/// database are usable, the in-memory store otherwise. The fallback keeps
/// the app fully functional for the process lifetime; nothing persists.
pub fn open_store() -> Box<dyn Store> {
    match SqliteStore::open() {
        Ok(store) => Box::new(store),
        Err(_) => Box::new(MemoryStore::new()),
    }
}
