//! SQLite-backed store.
//!
//! One database file at `~/.config/mindful/mindful.db` holding session
//! history, sound presets, settings rows, saved videos and a small kv
//! table for application state. Timestamps are RFC 3339 text in UTC so
//! lexicographic ORDER BY matches chronological order.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, StorageError};
use crate::history::SessionRecord;
use crate::video::VideoItem;

use super::presets::{default_presets, SoundPreset};
use super::{data_dir, ImportMode, Snapshot, Store};

pub struct SqliteStore {
    conn: Connection,
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::QueryFailed(e.to_string()))
}

/// Unit enum variants serialize to a bare JSON string; store that tag.
fn encode_tag<T: Serialize>(value: &T) -> Result<String, StorageError> {
    match serde_json::to_value(value) {
        Ok(Value::String(s)) => Ok(s),
        Ok(other) => Err(StorageError::QueryFailed(format!(
            "expected string tag, got {other}"
        ))),
        Err(e) => Err(StorageError::QueryFailed(e.to_string())),
    }
}

fn decode_json<T: DeserializeOwned>(idx: usize, text: &str) -> rusqlite::Result<T> {
    serde_json::from_str(text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn decode_tag<T: DeserializeOwned>(idx: usize, text: &str) -> rusqlite::Result<T> {
    serde_json::from_value(Value::String(text.to_string()))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn decode_time(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn read_session(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get(0)?,
        practice_type: decode_tag(1, &row.get::<_, String>(1)?)?,
        started_at: decode_time(2, &row.get::<_, String>(2)?)?,
        ended_at: decode_time(3, &row.get::<_, String>(3)?)?,
        duration_sec: row.get(4)?,
        actual_duration_sec: row.get(5)?,
        audio_mode: decode_tag(6, &row.get::<_, String>(6)?)?,
        audio_ref: row.get(7)?,
        sound_preset_name: row.get(8)?,
        youtube_meta: row
            .get::<_, Option<String>>(9)?
            .map(|s| decode_json(9, &s))
            .transpose()?,
        guided: row.get(10)?,
        guide_id: row.get(11)?,
        guide_title: row.get(12)?,
        mood: row.get(13)?,
        notes: row.get(14)?,
        tags: decode_json(15, &row.get::<_, String>(15)?)?,
    })
}

fn read_preset(row: &Row<'_>) -> rusqlite::Result<SoundPreset> {
    Ok(SoundPreset {
        id: row.get(0)?,
        name: row.get(1)?,
        layers: decode_json(2, &row.get::<_, String>(2)?)?,
        created_at: decode_time(3, &row.get::<_, String>(3)?)?,
        updated_at: decode_time(4, &row.get::<_, String>(4)?)?,
        is_built_in: row.get(5)?,
    })
}

fn read_video(row: &Row<'_>) -> rusqlite::Result<VideoItem> {
    Ok(VideoItem {
        id: row.get(0)?,
        title: row.get(1)?,
        channel_title: row.get(2)?,
        duration_sec: row.get(3)?,
        thumbnail_url: row.get(4)?,
        tags: decode_json(5, &row.get::<_, String>(5)?)?,
        saved_at: row
            .get::<_, Option<String>>(6)?
            .map(|s| decode_time(6, &s))
            .transpose()?,
    })
}

impl SqliteStore {
    /// Open the database at `~/.config/mindful/mindful.db`, creating the
    /// file and schema if needed and seeding the built-in presets on a
    /// fresh database.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be
    /// opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("mindful.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let mut store = Self { conn };
        store.migrate()?;
        store.seed_presets()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let mut store = Self { conn };
        store.migrate()?;
        store.seed_presets()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id                  TEXT PRIMARY KEY,
                practice_type       TEXT NOT NULL,
                started_at          TEXT NOT NULL,
                ended_at            TEXT NOT NULL,
                duration_sec        INTEGER NOT NULL,
                actual_duration_sec INTEGER,
                audio_mode          TEXT NOT NULL,
                audio_ref           TEXT,
                sound_preset_name   TEXT,
                youtube_meta        TEXT,
                guided              INTEGER NOT NULL DEFAULT 0,
                guide_id            TEXT,
                guide_title         TEXT,
                mood                INTEGER NOT NULL DEFAULT 3,
                notes               TEXT,
                tags                TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE IF NOT EXISTS presets (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                layers      TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                is_built_in INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS saved_videos (
                id            TEXT PRIMARY KEY,
                title         TEXT NOT NULL,
                channel_title TEXT NOT NULL,
                duration_sec  INTEGER NOT NULL,
                thumbnail_url TEXT,
                tags          TEXT NOT NULL DEFAULT '[]',
                saved_at      TEXT
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at);",
        )?;
        Ok(())
    }

    /// Insert the built-in presets if the table is empty. Runs on every
    /// open but writes at most once per database.
    fn seed_presets(&mut self) -> Result<(), StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM presets", [], |row| row.get(0))?;
        if count == 0 {
            for preset in default_presets() {
                self.save_preset(&preset)?;
            }
        }
        Ok(())
    }
}

impl Store for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn get_sessions(&self) -> Result<Vec<SessionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, practice_type, started_at, ended_at, duration_sec,
                    actual_duration_sec, audio_mode, audio_ref, sound_preset_name,
                    youtube_meta, guided, guide_id, guide_title, mood, notes, tags
             FROM sessions
             ORDER BY started_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], read_session)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn add_session(&mut self, record: &SessionRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sessions
                (id, practice_type, started_at, ended_at, duration_sec,
                 actual_duration_sec, audio_mode, audio_ref, sound_preset_name,
                 youtube_meta, guided, guide_id, guide_title, mood, notes, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                record.id,
                encode_tag(&record.practice_type)?,
                record.started_at.to_rfc3339(),
                record.ended_at.to_rfc3339(),
                record.duration_sec,
                record.actual_duration_sec,
                encode_tag(&record.audio_mode)?,
                record.audio_ref,
                record.sound_preset_name,
                record
                    .youtube_meta
                    .as_ref()
                    .map(encode_json)
                    .transpose()?,
                record.guided,
                record.guide_id,
                record.guide_title,
                record.mood,
                record.notes,
                encode_json(&record.tags)?,
            ],
        )?;
        Ok(())
    }

    fn delete_session(&mut self, id: &str) -> Result<bool, StorageError> {
        let n = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    fn clear_sessions(&mut self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM sessions", [])?;
        Ok(())
    }

    fn get_presets(&self) -> Result<Vec<SoundPreset>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, layers, created_at, updated_at, is_built_in
             FROM presets
             ORDER BY updated_at DESC, id ASC",
        )?;
        let rows = stmt.query_map([], read_preset)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn save_preset(&mut self, preset: &SoundPreset) -> Result<(), StorageError> {
        // Layers clamp on write so imported backups can never park
        // out-of-range values in the store.
        let layers = preset.layers.normalized();
        self.conn.execute(
            "INSERT OR REPLACE INTO presets
                (id, name, layers, created_at, updated_at, is_built_in)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                preset.id,
                preset.name,
                encode_json(&layers)?,
                preset.created_at.to_rfc3339(),
                preset.updated_at.to_rfc3339(),
                preset.is_built_in,
            ],
        )?;
        Ok(())
    }

    fn delete_preset(&mut self, id: &str) -> Result<bool, StorageError> {
        let n = self
            .conn
            .execute("DELETE FROM presets WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    fn all_settings(&self) -> Result<Map<String, Value>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM settings")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut map = Map::new();
        for row in rows {
            let (key, text) = row?;
            // Unreadable rows are dropped; defaults apply upstream.
            if let Ok(value) = serde_json::from_str(&text) {
                map.insert(key, value);
            }
        }
        Ok(map)
    }

    fn get_setting(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
                StorageError::CorruptValue {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            }),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_setting(&mut self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, encode_json(value)?],
        )?;
        Ok(())
    }

    fn saved_videos(&self) -> Result<Vec<VideoItem>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, channel_title, duration_sec, thumbnail_url, tags, saved_at
             FROM saved_videos
             ORDER BY saved_at DESC, id ASC",
        )?;
        let rows = stmt.query_map([], read_video)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn save_video(&mut self, video: &VideoItem) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO saved_videos
                (id, title, channel_title, duration_sec, thumbnail_url, tags, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                video.id,
                video.title,
                video.channel_title,
                video.duration_sec,
                video.thumbnail_url,
                encode_json(&video.tags)?,
                video.saved_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    fn remove_video(&mut self, id: &str) -> Result<bool, StorageError> {
        let n = self
            .conn
            .execute("DELETE FROM saved_videos WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn kv_set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn kv_delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
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
            self.conn.execute_batch(
                "DELETE FROM sessions;
                 DELETE FROM presets;
                 DELETE FROM settings;
                 DELETE FROM saved_videos;",
            )?;
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
        // A replace from a preset-less backup must not leave the library
        // empty.
        self.seed_presets()?;
        Ok(())
    }
}
