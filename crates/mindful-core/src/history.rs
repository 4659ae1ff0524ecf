//! Reflection capture and session records.
//!
//! Ending a session opens a reflection step; `finalize` folds the engine's
//! final state and the reflection input into an immutable [`SessionRecord`]
//! written once (idempotent upsert by id) into the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result, StorageError};
use crate::session::{AudioMode, AudioSelection, PracticeType, SessionEngine, SessionPhase};
use crate::storage::Store;
use crate::video::VideoItem;

/// One completed (or manually ended) session. Append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub practice_type: PracticeType,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Planned duration, fixed at session start.
    pub duration_sec: u32,
    /// Elapsed time actually observed; never exceeds `duration_sec`.
    /// Absent only in imported records from older exports.
    #[serde(default)]
    pub actual_duration_sec: Option<u32>,
    pub audio_mode: AudioMode,
    /// Preset or video id, depending on the mode.
    #[serde(default)]
    pub audio_ref: Option<String>,
    #[serde(default)]
    pub sound_preset_name: Option<String>,
    #[serde(default)]
    pub youtube_meta: Option<VideoItem>,
    #[serde(default)]
    pub guided: bool,
    #[serde(default)]
    pub guide_id: Option<String>,
    #[serde(default)]
    pub guide_title: Option<String>,
    #[serde(default = "default_mood")]
    pub mood: u8,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_mood() -> u8 {
    3
}

impl SessionRecord {
    /// Minutes credited for this record.
    pub fn minutes(&self) -> u64 {
        let sec = u64::from(self.actual_duration_sec.unwrap_or(self.duration_sec));
        (sec + 30) / 60
    }
}

/// What the user enters on the reflection sheet.
#[derive(Debug, Clone, Default)]
pub struct ReflectionInput {
    /// 1-5; values outside the range are clamped.
    pub mood: u8,
    pub notes: String,
    /// Raw comma-separated tag input.
    pub tags: String,
}

/// Comma-split, trim, drop empties. Order is preserved.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the session record from an ended engine and the reflection input.
///
/// # Errors
/// Returns an error if the session has not ended or was never configured.
pub fn finalize(
    engine: &SessionEngine,
    input: &ReflectionInput,
    ended_at: DateTime<Utc>,
) -> Result<SessionRecord> {
    if engine.phase() != SessionPhase::Ended {
        return Err(CoreError::InvalidConfig("session has not ended".into()));
    }
    let config = engine
        .config()
        .ok_or_else(|| CoreError::InvalidConfig("session was never configured".into()))?;
    let started_at = engine
        .started_at()
        .ok_or_else(|| CoreError::InvalidConfig("session was never started".into()))?;

    let duration_sec = config.duration_sec;
    let actual = engine.current_sec().min(u64::from(duration_sec)) as u32;

    let (audio_ref, sound_preset_name, youtube_meta) = match &config.audio {
        AudioSelection::None => (None, None, None),
        AudioSelection::Soundscape { preset } => {
            (Some(preset.id.clone()), Some(preset.name.clone()), None)
        }
        AudioSelection::Youtube { video } => (Some(video.id.clone()), None, Some(video.clone())),
    };

    let guide = config.guide.as_ref();
    let notes = input.notes.trim();

    Ok(SessionRecord {
        id: Uuid::new_v4().to_string(),
        practice_type: config.practice,
        started_at,
        ended_at,
        duration_sec,
        actual_duration_sec: Some(actual),
        audio_mode: config.audio_mode(),
        audio_ref,
        sound_preset_name,
        youtube_meta,
        guided: guide.is_some(),
        guide_id: guide.map(|g| g.id.clone()),
        guide_title: guide.map(|g| g.title.clone()),
        mood: input.mood.clamp(1, 5),
        notes: if notes.is_empty() { None } else { Some(notes.to_string()) },
        tags: parse_tags(&input.tags),
    })
}

/// Persist a record, then re-read the full history so derived aggregates
/// see the write.
pub fn save_and_refresh(
    store: &mut dyn Store,
    record: &SessionRecord,
) -> Result<Vec<SessionRecord>, StorageError> {
    store.add_session(record)?;
    store.get_sessions()
}
