//! Speech synthesis control surface.
//!
//! The core never synthesizes audio itself; it drives a [`SpeechSynth`]
//! collaborator injected at construction. Platforms without synthesis plug
//! in [`NullSpeech`], which silently no-ops.

use serde::{Deserialize, Serialize};

/// Fixed speaking parameters used for guided cues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakOptions {
    pub voice_uri: Option<String>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for SpeakOptions {
    fn default() -> Self {
        Self {
            voice_uri: None,
            rate: 0.95,
            pitch: 1.0,
            volume: 0.8,
        }
    }
}

impl SpeakOptions {
    pub fn with_voice(voice_uri: Option<String>) -> Self {
        Self { voice_uri, ..Self::default() }
    }
}

/// An available synthesis voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    pub voice_uri: String,
    pub name: String,
    pub lang: String,
}

/// Control contract for a speech synthesizer.
///
/// Implementations fall back to the system default voice when the requested
/// `voice_uri` is unavailable, and must make `cancel` drop any in-flight
/// utterance so nothing is spoken after it returns.
pub trait SpeechSynth {
    fn speak(&mut self, text: &str, options: &SpeakOptions);
    fn cancel(&mut self);
    fn list_voices(&self) -> Vec<Voice>;
}

/// No-op synthesizer for platforms without speech capability.
#[derive(Debug, Default)]
pub struct NullSpeech;

impl SpeechSynth for NullSpeech {
    fn speak(&mut self, _text: &str, _options: &SpeakOptions) {}
    fn cancel(&mut self) {}
    fn list_voices(&self) -> Vec<Voice> {
        Vec::new()
    }
}

/// Records every call; backs assertions about speech ordering in tests.
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    pub spoken: Vec<String>,
    pub cancels: usize,
}

impl SpeechSynth for RecordingSpeech {
    fn speak(&mut self, text: &str, _options: &SpeakOptions) {
        self.spoken.push(text.to_string());
    }

    fn cancel(&mut self) {
        self.cancels += 1;
    }

    fn list_voices(&self) -> Vec<Voice> {
        vec![Voice {
            voice_uri: "test-voice".into(),
            name: "Test Voice".into(),
            lang: "en-US".into(),
        }]
    }
}

// Lets tests keep a handle to a recording synthesizer after handing the
// coordinator its boxed copy.
#[cfg(test)]
impl<T: SpeechSynth> SpeechSynth for std::rc::Rc<std::cell::RefCell<T>> {
    fn speak(&mut self, text: &str, options: &SpeakOptions) {
        self.borrow_mut().speak(text, options);
    }

    fn cancel(&mut self) {
        self.borrow_mut().cancel();
    }

    fn list_voices(&self) -> Vec<Voice> {
        self.borrow().list_voices()
    }
}
