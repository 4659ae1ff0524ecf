//! Session configuration.
//!
//! A config is assembled and validated by the caller before `begin`; the
//! engine itself assumes it is well-formed (a guided config carries its
//! guide, a soundscape config carries its preset).

use serde::{Deserialize, Serialize};

use crate::guide::Guide;
use crate::storage::SoundPreset;
use crate::video::VideoItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeType {
    Breath,
    BodyScan,
    Focus,
    Sleep,
    Custom,
    Guided,
}

impl PracticeType {
    pub fn label(&self) -> &'static str {
        match self {
            PracticeType::Breath => "Breath",
            PracticeType::BodyScan => "Body scan",
            PracticeType::Focus => "Focus",
            PracticeType::Sleep => "Sleep",
            PracticeType::Custom => "Custom",
            PracticeType::Guided => "Guided",
        }
    }
}

/// The three mutually exclusive audio modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    None,
    Soundscape,
    Youtube,
}

/// A mode together with the data it needs to (re)start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AudioSelection {
    None,
    Soundscape { preset: SoundPreset },
    Youtube { video: VideoItem },
}

impl AudioSelection {
    pub fn mode(&self) -> AudioMode {
        match self {
            AudioSelection::None => AudioMode::None,
            AudioSelection::Soundscape { .. } => AudioMode::Soundscape,
            AudioSelection::Youtube { .. } => AudioMode::Youtube,
        }
    }
}

/// Everything `begin` needs: what to practice, for how long, with which
/// audio, and how cues should be voiced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub practice: PracticeType,
    /// Planned duration in seconds, fixed at session start.
    pub duration_sec: u32,
    pub audio: AudioSelection,
    /// Present iff the session is guided; duration comes from the guide.
    pub guide: Option<Guide>,
    pub tts_enabled: bool,
    pub voice_uri: Option<String>,
}

impl SessionConfig {
    /// A plain timed practice.
    pub fn timed(practice: PracticeType, duration_sec: u32) -> Self {
        Self {
            practice,
            duration_sec,
            audio: AudioSelection::None,
            guide: None,
            tts_enabled: false,
            voice_uri: None,
        }
    }

    /// A guided session; the guide fixes the duration.
    pub fn guided(guide: Guide) -> Self {
        Self {
            practice: PracticeType::Guided,
            duration_sec: guide.duration_sec,
            audio: AudioSelection::None,
            guide: Some(guide),
            tts_enabled: true,
            voice_uri: None,
        }
    }

    pub fn with_audio(mut self, audio: AudioSelection) -> Self {
        self.audio = audio;
        self
    }

    pub fn audio_mode(&self) -> AudioMode {
        self.audio.mode()
    }
}
