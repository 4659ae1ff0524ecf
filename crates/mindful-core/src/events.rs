//! Side-effect intents emitted by the session engine.
//!
//! Engine commands return a list of [`Effect`]s instead of touching audio
//! or speech directly; the host (or [`crate::session::SessionRunner`])
//! executes them in order. This keeps the state machine deterministic and
//! testable with an explicit clock.

use serde::{Deserialize, Serialize};

use crate::guide::Cue;
use crate::speech::SpeakOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Show a cue. The display auto-dismisses after
    /// [`crate::session::CUE_DISMISS_MS`] unless a newer cue supersedes it.
    FireCue { index: usize, cue: Cue },
    /// The active cue's display window elapsed.
    DismissCue,
    /// Voice a cue through the speech collaborator.
    Speak { text: String, options: SpeakOptions },
    /// Drop any in-flight utterance.
    CancelSpeech,
    /// (Re)start audio output for the configured mode.
    StartAudio,
    /// Stop all audio output for the current mode.
    StopAudio,
    /// The session reached its end; reflection may be collected.
    SessionEnded { manual: bool },
}
