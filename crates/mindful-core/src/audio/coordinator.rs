//! Audio mode coordination.
//!
//! Exactly one of the three modes (silent / soundscape / external video)
//! may produce sound at a time. The coordinator owns the collaborator
//! handles and enforces stop-before-start on every switch; stopping always
//! cancels pending speech as well, whatever the mode.

use crate::session::AudioSelection;
use crate::session::AudioMode;
use crate::speech::{SpeakOptions, SpeechSynth, Voice};
use crate::video::VideoItem;

use super::soundscape::SoundscapeControl;

pub struct AudioCoordinator {
    soundscape: Box<dyn SoundscapeControl>,
    speech: Box<dyn SpeechSynth>,
    selection: AudioSelection,
}

impl AudioCoordinator {
    pub fn new(soundscape: Box<dyn SoundscapeControl>, speech: Box<dyn SpeechSynth>) -> Self {
        Self {
            soundscape,
            speech,
            selection: AudioSelection::None,
        }
    }

    pub fn mode(&self) -> AudioMode {
        self.selection.mode()
    }

    /// The external video currently referenced, if the mode is `youtube`.
    pub fn video(&self) -> Option<&VideoItem> {
        match &self.selection {
            AudioSelection::Youtube { video } => Some(video),
            _ => None,
        }
    }

    /// Switch modes. The previous mode's output is always stopped before
    /// the next selection takes effect; actual output starts when the
    /// session does (or immediately via [`Self::start`]).
    pub fn select(&mut self, selection: AudioSelection) {
        self.stop();
        self.selection = selection;
    }

    /// (Re)start output for the current mode. For soundscape this resumes
    /// the engine (which may need a prior user gesture to unlock) and
    /// re-applies the selected preset's full layer configuration. Video
    /// playback belongs to the embedded player, so `youtube` only keeps
    /// the reference.
    pub fn start(&mut self) {
        if let AudioSelection::Soundscape { preset } = &self.selection {
            self.soundscape.resume();
            self.soundscape.apply_preset(preset);
        }
    }

    /// Stop all output and cancel any pending speech.
    pub fn stop(&mut self) {
        self.soundscape.stop();
        self.speech.cancel();
    }

    pub fn speak(&mut self, text: &str, options: &SpeakOptions) {
        self.speech.speak(text, options);
    }

    pub fn cancel_speech(&mut self) {
        self.speech.cancel();
    }

    pub fn list_voices(&self) -> Vec<Voice> {
        self.speech.list_voices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::soundscape::RecordingSoundscape;
    use crate::speech::RecordingSpeech;
    use crate::storage::default_presets;
    use crate::video::VideoItem;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn coordinator() -> (
        AudioCoordinator,
        Rc<RefCell<RecordingSoundscape>>,
        Rc<RefCell<RecordingSpeech>>,
    ) {
        let soundscape = Rc::new(RefCell::new(RecordingSoundscape::default()));
        let speech = Rc::new(RefCell::new(RecordingSpeech::default()));
        let coordinator =
            AudioCoordinator::new(Box::new(soundscape.clone()), Box::new(speech.clone()));
        (coordinator, soundscape, speech)
    }

    fn video() -> VideoItem {
        VideoItem {
            id: "vid".into(),
            title: "Calm".into(),
            channel_title: "Channel".into(),
            duration_sec: 600,
            thumbnail_url: None,
            tags: vec![],
            saved_at: None,
        }
    }

    #[test]
    fn soundscape_start_resumes_then_applies_preset() {
        let (mut coordinator, soundscape, _) = coordinator();
        let preset = default_presets().remove(0);
        let id = preset.id.clone();
        coordinator.select(AudioSelection::Soundscape { preset });
        coordinator.start();
        let calls = soundscape.borrow().calls.clone();
        assert_eq!(
            calls,
            vec!["stop".to_string(), "resume".to_string(), format!("apply:{id}")]
        );
    }

    #[test]
    fn switching_to_video_stops_soundscape_first() {
        let (mut coordinator, soundscape, _) = coordinator();
        let preset = default_presets().remove(0);
        coordinator.select(AudioSelection::Soundscape { preset });
        soundscape.borrow_mut().calls.clear();

        coordinator.select(AudioSelection::Youtube { video: video() });
        assert_eq!(soundscape.borrow().calls, vec!["stop"]);
        assert_eq!(coordinator.mode(), AudioMode::Youtube);
        assert_eq!(coordinator.video().unwrap().id, "vid");
    }

    #[test]
    fn stop_always_cancels_speech() {
        let (mut coordinator, _, speech) = coordinator();
        coordinator.select(AudioSelection::None);
        coordinator.stop();
        assert!(speech.borrow().cancels >= 2);
    }

    #[test]
    fn silent_mode_never_touches_the_engine_output() {
        let (mut coordinator, soundscape, _) = coordinator();
        coordinator.select(AudioSelection::None);
        coordinator.start();
        assert_eq!(soundscape.borrow().calls, vec!["stop"]);
    }
}
