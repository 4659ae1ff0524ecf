//! Soundscape engine control surface.
//!
//! The synthesis graph itself lives in the host; the core only drives this
//! contract. `resume` exists because real audio output may stay locked
//! until a user interaction, so the coordinator calls it on every
//! (re)start before applying a preset.

use crate::storage::SoundPreset;

pub trait SoundscapeControl {
    fn stop(&mut self);
    /// Unlock/resume the underlying output. Idempotent.
    fn resume(&mut self);
    /// Apply a preset's full layer configuration.
    fn apply_preset(&mut self, preset: &SoundPreset);
}

/// No-op engine for hosts without audio output.
#[derive(Debug, Default)]
pub struct NullSoundscape;

impl SoundscapeControl for NullSoundscape {
    fn stop(&mut self) {}
    fn resume(&mut self) {}
    fn apply_preset(&mut self, _preset: &SoundPreset) {}
}

/// Records every call in order; backs assertions about audio lifecycle
/// ordering in tests.
#[derive(Debug, Default)]
pub struct RecordingSoundscape {
    pub calls: Vec<String>,
}

impl SoundscapeControl for RecordingSoundscape {
    fn stop(&mut self) {
        self.calls.push("stop".into());
    }

    fn resume(&mut self) {
        self.calls.push("resume".into());
    }

    fn apply_preset(&mut self, preset: &SoundPreset) {
        self.calls.push(format!("apply:{}", preset.id));
    }
}

// Lets tests keep a handle to a recording engine after handing the
// coordinator its boxed copy.
#[cfg(test)]
impl<T: SoundscapeControl> SoundscapeControl for std::rc::Rc<std::cell::RefCell<T>> {
    fn stop(&mut self) {
        self.borrow_mut().stop();
    }

    fn resume(&mut self) {
        self.borrow_mut().resume();
    }

    fn apply_preset(&mut self, preset: &SoundPreset) {
        self.borrow_mut().apply_preset(preset);
    }
}
