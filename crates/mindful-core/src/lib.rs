//! # Mindful Core Library
//!
//! Core business logic for Mindful, a meditation session runner. All
//! operations are available through this library; the CLI binary is a
//! thin layer over it, so a GUI shell can reuse the same core.
//!
//! ## Architecture
//!
//! - **Session Engine**: A wall-clock state machine that requires the
//!   caller to periodically invoke `tick()`; elapsed time is always
//!   recomputed from timestamps, never accumulated
//! - **Effects**: The engine emits side-effect intents (speech, audio
//!   start/stop, cue display) instead of performing them
//! - **Audio**: A coordinator that enforces one audio mode at a time
//!   over pluggable soundscape and speech backends
//! - **Storage**: SQLite-backed store with an in-memory fallback, both
//!   behind one [`Store`] trait
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core session state machine
//! - [`SessionRunner`]: Engine wired to an [`AudioCoordinator`]
//! - [`Store`]: Persistence contract ([`SqliteStore`] / [`MemoryStore`])
//! - [`Guide`]: Built-in guided meditation scripts with timed cues

pub mod audio;
pub mod error;
pub mod events;
pub mod guide;
pub mod history;
pub mod session;
pub mod settings;
pub mod speech;
pub mod stats;
pub mod storage;
pub mod video;

pub use audio::{AudioCoordinator, NullSoundscape, SoundscapeControl};
pub use error::{CoreError, Result, StorageError};
pub use events::Effect;
pub use guide::{all_guides, get_guide, Cue, Guide};
pub use history::{finalize, parse_tags, ReflectionInput, SessionRecord};
pub use session::{
    AudioMode, AudioSelection, PracticeType, SessionConfig, SessionEngine, SessionPhase,
    SessionRunner, SessionSnapshot,
};
pub use settings::{ReduceMotion, Settings, TextScale};
pub use speech::{NullSpeech, SpeakOptions, SpeechSynth, Voice};
pub use stats::{summarize, StatsSummary};
pub use storage::{
    data_dir, default_presets, open_store, ImportMode, MemoryStore, Snapshot, SoundPreset,
    SqliteStore, Store,
};
pub use video::{
    duration_bucket, rank_videos, CurationPolicy, MockVideoProvider, VideoItem, VideoProvider,
};
