//! User settings.
//!
//! Stored as individual key/value rows so partial writes and older exports
//! stay readable. Defaults are applied once here, at the storage boundary;
//! a missing or unreadable row falls back to its default without touching
//! the other keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StorageError};
use crate::storage::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReduceMotion {
    /// Follow the OS preference.
    #[default]
    System,
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextScale {
    Small,
    #[default]
    Normal,
    Large,
}

/// Serde renames match the stored row keys (and the export format), so
/// serializing the struct yields exactly the persisted map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "ui.reduceMotion")]
    pub reduce_motion: ReduceMotion,
    #[serde(rename = "ui.highContrast")]
    pub high_contrast: bool,
    #[serde(rename = "ui.textScale")]
    pub text_scale: TextScale,
    /// Hide clutter and dim the interface while a session is running.
    #[serde(rename = "ui.calmSessionMode")]
    pub calm_session_mode: bool,
    #[serde(rename = "ttsEnabled")]
    pub tts_enabled: bool,
    #[serde(rename = "voiceURI")]
    pub voice_uri: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reduce_motion: ReduceMotion::System,
            high_contrast: false,
            text_scale: TextScale::Normal,
            calm_session_mode: true,
            tts_enabled: true,
            voice_uri: None,
        }
    }
}

impl Settings {
    /// Build settings from raw stored rows, key by key. Unknown keys are
    /// ignored and unreadable values fall back to the default.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        fn field<T: serde::de::DeserializeOwned>(
            map: &Map<String, Value>,
            key: &str,
            default: T,
        ) -> T {
            map.get(key)
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or(default)
        }

        let defaults = Settings::default();
        Self {
            reduce_motion: field(map, "ui.reduceMotion", defaults.reduce_motion),
            high_contrast: field(map, "ui.highContrast", defaults.high_contrast),
            text_scale: field(map, "ui.textScale", defaults.text_scale),
            calm_session_mode: field(map, "ui.calmSessionMode", defaults.calm_session_mode),
            tts_enabled: field(map, "ttsEnabled", defaults.tts_enabled),
            voice_uri: field(map, "voiceURI", defaults.voice_uri),
        }
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn load(store: &dyn Store) -> Result<Self, StorageError> {
        Ok(Self::from_map(&store.all_settings()?))
    }

    pub fn persist(&self, store: &mut dyn Store) -> Result<(), StorageError> {
        for (key, value) in self.to_map() {
            store.set_setting(&key, &value)?;
        }
        Ok(())
    }
}
