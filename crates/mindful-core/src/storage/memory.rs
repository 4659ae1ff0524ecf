//! In-memory store.
//!
//! Fallback backend used when the SQLite database cannot be opened, and
//! the default in tests. Behaviour matches [`SqliteStore`] exactly,
//! including read ordering and seeding; only durability differs.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{Result, StorageError};
use crate::history::SessionRecord;
use crate::video::VideoItem;

use super::presets::{default_presets, SoundPreset};
use super::{ImportMode, Snapshot, Store};

pub struct MemoryStore {
    sessions: HashMap<String, SessionRecord>,
    presets: HashMap<String, SoundPreset>,
    settings: Map<String, Value>,
    videos: HashMap<String, VideoItem>,
    kv: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut store = Self {
            sessions: HashMap::new(),
            presets: HashMap::new(),
            settings: Map::new(),
            videos: HashMap::new(),
            kv: HashMap::new(),
        };
        store.seed_presets();
        store
    }

    fn seed_presets(&mut self) {
        if self.presets.is_empty() {
            for preset in default_presets() {
                self.presets.insert(preset.id.clone(), preset);
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn get_sessions(&self) -> Result<Vec<SessionRecord>, StorageError> {
        let mut sessions: Vec<_> = self.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(sessions)
    }

    fn add_session(&mut self, record: &SessionRecord) -> Result<(), StorageError> {
        self.sessions.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn delete_session(&mut self, id: &str) -> Result<bool, StorageError> {
        Ok(self.sessions.remove(id).is_some())
    }

    fn clear_sessions(&mut self) -> Result<(), StorageError> {
        self.sessions.clear();
        Ok(())
    }

    fn get_presets(&self) -> Result<Vec<SoundPreset>, StorageError> {
        let mut presets: Vec<_> = self.presets.values().cloned().collect();
        presets.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(presets)
    }

    fn save_preset(&mut self, preset: &SoundPreset) -> Result<(), StorageError> {
        // Layers clamp on write so imported backups can never park
        // out-of-range values in the store.
        let preset = preset.clone().normalized();
        self.presets.insert(preset.id.clone(), preset);
        Ok(())
    }

    fn delete_preset(&mut self, id: &str) -> Result<bool, StorageError> {
        Ok(self.presets.remove(id).is_some())
    }

    fn all_settings(&self) -> Result<Map<String, Value>, StorageError> {
        Ok(self.settings.clone())
    }

    fn get_setting(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.settings.get(key).cloned())
    }

    fn set_setting(&mut self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.settings.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn saved_videos(&self) -> Result<Vec<VideoItem>, StorageError> {
        let mut videos: Vec<_> = self.videos.values().cloned().collect();
        // None sorts last, matching SQLite's NULL placement under DESC.
        videos.sort_by(|a, b| {
            match (&a.saved_at, &b.saved_at) {
                (Some(x), Some(y)) => y.cmp(x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then_with(|| a.id.cmp(&b.id))
        });
        Ok(videos)
    }

    fn save_video(&mut self, video: &VideoItem) -> Result<(), StorageError> {
        self.videos.insert(video.id.clone(), video.clone());
        Ok(())
    }

    fn remove_video(&mut self, id: &str) -> Result<bool, StorageError> {
        Ok(self.videos.remove(id).is_some())
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv.get(key).cloned())
    }

    fn kv_set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.kv.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn kv_delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.kv.remove(key);
        Ok(())
    }

    fn export_snapshot(&self) -> Result<Snapshot, StorageError> {
        Ok(Snapshot {
            sessions: self.get_sessions()?,
            presets: self.get_presets()?,
            settings: self.all_settings()?,
            videos: self.saved_videos()?,
        })
    }

    fn import_snapshot(
        &mut self,
        snapshot: &Snapshot,
        mode: ImportMode,
    ) -> Result<(), StorageError> {
        if mode == ImportMode::Replace {
            self.sessions.clear();
            self.presets.clear();
            self.settings.clear();
            self.videos.clear();
        }
        for record in &snapshot.sessions {
            self.add_session(record)?;
        }
        for preset in &snapshot.presets {
            self.save_preset(preset)?;
        }
        for (key, value) in &snapshot.settings {
            self.set_setting(key, value)?;
        }
        for video in &snapshot.videos {
            self.save_video(video)?;
        }
        self.seed_presets();
        Ok(())
    }
}
