//! Session runner: the engine wired to its collaborators.
//!
//! The runner owns a [`SessionEngine`] and an [`AudioCoordinator`] and
//! executes the engine's side-effect intents as they are produced. Hosts
//! that need finer control (or a different executor) can drive the engine
//! directly; the CLI and tests go through here.

use chrono::{DateTime, Utc};

use crate::audio::AudioCoordinator;
use crate::events::Effect;

use super::config::SessionConfig;
use super::engine::{SessionEngine, SessionSnapshot};

pub struct SessionRunner {
    engine: SessionEngine,
    coordinator: AudioCoordinator,
}

impl SessionRunner {
    pub fn new(coordinator: AudioCoordinator) -> Self {
        Self {
            engine: SessionEngine::new(),
            coordinator,
        }
    }

    /// Restore a persisted engine (the CLI keeps it in the kv store
    /// between invocations).
    pub fn with_engine(engine: SessionEngine, coordinator: AudioCoordinator) -> Self {
        Self { engine, coordinator }
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn coordinator(&self) -> &AudioCoordinator {
        &self.coordinator
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.engine.snapshot()
    }

    pub fn begin(&mut self, config: SessionConfig, now: DateTime<Utc>) -> Vec<Effect> {
        self.coordinator.select(config.audio.clone());
        let effects = self.engine.begin(config, now);
        self.execute(&effects);
        effects
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let effects = self.engine.tick(now);
        self.execute(&effects);
        effects
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let effects = self.engine.pause(now);
        self.execute(&effects);
        effects
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let effects = self.engine.resume(now);
        self.execute(&effects);
        effects
    }

    pub fn end(&mut self, manual: bool, now: DateTime<Utc>) -> Vec<Effect> {
        let effects = self.engine.end(manual, now);
        self.execute(&effects);
        effects
    }

    /// Back to idle after the reflection is saved or skipped.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.coordinator.stop();
    }

    fn execute(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Speak { text, options } => self.coordinator.speak(text, options),
                Effect::CancelSpeech => self.coordinator.cancel_speech(),
                Effect::StartAudio => self.coordinator.start(),
                Effect::StopAudio => self.coordinator.stop(),
                // Display concerns belong to the host.
                Effect::FireCue { .. } | Effect::DismissCue | Effect::SessionEnded { .. } => {}
            }
        }
    }
}
