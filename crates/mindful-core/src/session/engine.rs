//! Session engine implementation.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads or timers - the caller invokes `tick(now)` periodically (250ms
//! is plenty) and executes the returned [`Effect`]s. Elapsed time is always
//! recomputed from absolute timestamps, so missed ticks and clock jumps
//! self-correct instead of accumulating drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Ended -> Idle
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::SessionConfig;
use crate::events::Effect;
use crate::guide::Cue;
use crate::speech::SpeakOptions;

/// How long a fired cue stays on screen before auto-dismissing.
pub const CUE_DISMISS_MS: i64 = 6500;

/// Recommended host tick interval.
pub const TICK_INTERVAL_MS: u64 = 250;

/// Seconds per inhale/exhale cycle, independent of session length.
const BREATH_CYCLE_SEC: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
    Ended,
}

/// The currently displayed cue and its dismissal deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCue {
    pub index: usize,
    pub cue: Cue,
    /// Epoch ms after which the display auto-dismisses.
    pub dismiss_at_ms: i64,
}

/// Observable state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub remaining_sec: u64,
    pub current_sec: u64,
    /// 0.0 .. 1.0 position in the breathing cycle.
    pub breathing_phase: f64,
    pub active_cue: Option<Cue>,
}

/// Core session state machine.
///
/// Commands return side-effect intents rather than performing I/O; the
/// fired-cue set and the clock input make every transition reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEngine {
    phase: SessionPhase,
    config: Option<SessionConfig>,
    started_at: Option<DateTime<Utc>>,
    /// Planned duration in seconds, fixed at `begin`.
    duration_sec: u64,
    /// Epoch ms of the (possibly adjusted) run start. Recomputed on every
    /// resume as `now - current_sec * 1000` so paused time never counts.
    run_start_ms: i64,
    current_sec: u64,
    remaining_sec: u64,
    breathing_phase: f64,
    /// Indices of cues already fired this session.
    fired: BTreeSet<usize>,
    active_cue: Option<ActiveCue>,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEngine {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            config: None,
            started_at: None,
            duration_sec: 0,
            run_start_ms: 0,
            current_sec: 0,
            remaining_sec: 0,
            breathing_phase: 0.0,
            fired: BTreeSet::new(),
            active_cue: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn current_sec(&self) -> u64 {
        self.current_sec
    }

    pub fn remaining_sec(&self) -> u64 {
        self.remaining_sec
    }

    pub fn duration_sec(&self) -> u64 {
        self.duration_sec
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            remaining_sec: self.remaining_sec,
            current_sec: self.current_sec,
            breathing_phase: self.breathing_phase,
            active_cue: self.active_cue.as_ref().map(|a| a.cue.clone()),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session. Valid only from `Idle`; the config is assumed to
    /// have been validated at the boundary.
    pub fn begin(&mut self, config: SessionConfig, now: DateTime<Utc>) -> Vec<Effect> {
        if self.phase != SessionPhase::Idle {
            return Vec::new();
        }
        let now_ms = now.timestamp_millis();
        self.duration_sec = u64::from(config.duration_sec);
        self.config = Some(config);
        self.started_at = Some(now);
        self.run_start_ms = now_ms;
        self.current_sec = 0;
        self.remaining_sec = self.duration_sec;
        self.breathing_phase = 0.0;
        self.fired.clear();
        self.active_cue = None;
        self.phase = SessionPhase::Running;

        let mut effects = vec![Effect::StartAudio];
        // An opening cue fires before the first tick can race it.
        if let Some((index, cue)) = self.first_opening_cue() {
            effects.extend(self.fire_cue(index, cue, now_ms));
        }
        effects
    }

    /// Recompute elapsed/remaining time and fire due cues. Call
    /// periodically while `Running`; a no-op in every other phase.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        if self.phase != SessionPhase::Running {
            return Vec::new();
        }
        let now_ms = now.timestamp_millis();
        self.flush_elapsed(now_ms);

        let mut effects = Vec::new();

        if let Some(active) = &self.active_cue {
            if now_ms >= active.dismiss_at_ms {
                self.active_cue = None;
                effects.push(Effect::DismissCue);
            }
        }

        // All eligible unfired cues fire in ascending at_sec order, even
        // when several fall inside one tick.
        for (index, cue) in self.due_cues() {
            effects.extend(self.fire_cue(index, cue, now_ms));
        }

        if self.remaining_sec == 0 {
            effects.extend(self.finish(false));
        }
        effects
    }

    /// Valid only from `Running`. Keeps `current_sec`.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        if self.phase != SessionPhase::Running {
            return Vec::new();
        }
        self.flush_elapsed(now.timestamp_millis());
        self.phase = SessionPhase::Paused;
        self.active_cue = None;
        vec![Effect::StopAudio, Effect::CancelSpeech]
    }

    /// Valid only from `Paused` with time remaining; resuming a naturally
    /// finished session is a no-op.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        if self.phase != SessionPhase::Paused || self.remaining_sec == 0 {
            return Vec::new();
        }
        self.run_start_ms = now.timestamp_millis() - (self.current_sec as i64) * 1000;
        self.phase = SessionPhase::Running;
        vec![Effect::StartAudio]
    }

    /// End the session from `Running` or `Paused`.
    pub fn end(&mut self, manual: bool, now: DateTime<Utc>) -> Vec<Effect> {
        match self.phase {
            SessionPhase::Running => {
                self.flush_elapsed(now.timestamp_millis());
                self.finish(manual)
            }
            SessionPhase::Paused => self.finish(manual),
            _ => Vec::new(),
        }
    }

    /// Return to `Idle` once the reflection is saved or skipped.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now_ms: i64) {
        let elapsed_ms = (now_ms - self.run_start_ms).max(0) as u64;
        let elapsed = elapsed_ms / 1000;
        self.current_sec = elapsed;
        self.remaining_sec = self.duration_sec.saturating_sub(elapsed);
        self.breathing_phase = (elapsed % BREATH_CYCLE_SEC) as f64 / BREATH_CYCLE_SEC as f64;
    }

    fn first_opening_cue(&self) -> Option<(usize, Cue)> {
        let guide = self.config.as_ref()?.guide.as_ref()?;
        guide
            .cues
            .iter()
            .enumerate()
            .find(|(_, c)| c.at_sec == 0)
            .map(|(i, c)| (i, c.clone()))
    }

    fn due_cues(&self) -> Vec<(usize, Cue)> {
        let Some(guide) = self.config.as_ref().and_then(|c| c.guide.as_ref()) else {
            return Vec::new();
        };
        guide
            .cues
            .iter()
            .enumerate()
            .filter(|(i, c)| u64::from(c.at_sec) <= self.current_sec && !self.fired.contains(i))
            .map(|(i, c)| (i, c.clone()))
            .collect()
    }

    /// Mark the cue fired before emitting anything, guaranteeing
    /// at-most-once dispatch even if a tick races `begin`.
    fn fire_cue(&mut self, index: usize, cue: Cue, now_ms: i64) -> Vec<Effect> {
        self.fired.insert(index);
        self.active_cue = Some(ActiveCue {
            index,
            cue: cue.clone(),
            dismiss_at_ms: now_ms + CUE_DISMISS_MS,
        });
        let mut effects = vec![Effect::FireCue { index, cue: cue.clone() }];
        let config = self.config.as_ref();
        let tts = config.map(|c| c.tts_enabled).unwrap_or(false);
        if tts && cue.speak {
            effects.push(Effect::Speak {
                text: cue.text,
                options: SpeakOptions::with_voice(
                    config.and_then(|c| c.voice_uri.clone()),
                ),
            });
        }
        effects
    }

    fn finish(&mut self, manual: bool) -> Vec<Effect> {
        self.phase = SessionPhase::Ended;
        if manual {
            self.remaining_sec = 0;
        }
        self.active_cue = None;
        vec![
            Effect::StopAudio,
            Effect::CancelSpeech,
            Effect::SessionEnded { manual },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::Guide;
    use crate::session::config::PracticeType;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn timed(duration_sec: u32) -> SessionConfig {
        SessionConfig::timed(PracticeType::Breath, duration_sec)
    }

    fn guided(cues: Vec<(u32, &str, bool)>, duration_sec: u32) -> SessionConfig {
        let guide = Guide {
            id: "g".into(),
            title: "Test Guide".into(),
            duration_sec,
            cues: cues
                .into_iter()
                .map(|(at_sec, text, speak)| Cue { at_sec, text: text.into(), speak })
                .collect(),
        };
        let mut config = SessionConfig::guided(guide);
        config.tts_enabled = false;
        config
    }

    fn fired_texts(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::FireCue { cue, .. } => Some(cue.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn begin_starts_running_with_audio() {
        let mut engine = SessionEngine::new();
        let effects = engine.begin(timed(600), at(0));
        assert_eq!(engine.phase(), SessionPhase::Running);
        assert_eq!(engine.remaining_sec(), 600);
        assert_eq!(effects, vec![Effect::StartAudio]);
    }

    #[test]
    fn begin_is_rejected_unless_idle() {
        let mut engine = SessionEngine::new();
        engine.begin(timed(600), at(0));
        assert!(engine.begin(timed(300), at(1)).is_empty());
        assert_eq!(engine.duration_sec(), 600);
    }

    #[test]
    fn pause_excludes_time_from_elapsed() {
        let mut engine = SessionEngine::new();
        engine.begin(timed(600), at(0));
        engine.tick(at(10));
        assert_eq!(engine.current_sec(), 10);

        engine.pause(at(10));
        assert_eq!(engine.phase(), SessionPhase::Paused);

        // A minute on pause does not advance the clock.
        engine.resume(at(70));
        engine.tick(at(80));
        assert_eq!(engine.current_sec(), 20);
        assert_eq!(engine.remaining_sec(), 580);
    }

    #[test]
    fn pause_stops_audio_and_speech() {
        let mut engine = SessionEngine::new();
        engine.begin(timed(600), at(0));
        let effects = engine.pause(at(5));
        assert_eq!(effects, vec![Effect::StopAudio, Effect::CancelSpeech]);
        // Ticking while paused does nothing.
        assert!(engine.tick(at(100)).is_empty());
    }

    #[test]
    fn opening_cue_fires_at_begin_exactly_once() {
        let mut engine = SessionEngine::new();
        let effects = engine.begin(guided(vec![(0, "a", false), (30, "b", false)], 300), at(0));
        assert_eq!(fired_texts(&effects), vec!["a"]);
        // The first tick at elapsed 0 does not refire it.
        let effects = engine.tick(at(0));
        assert!(fired_texts(&effects).is_empty());
    }

    #[test]
    fn coincident_cues_fire_once_each_in_order() {
        let mut engine = SessionEngine::new();
        let config = guided(
            vec![(0, "a", false), (30, "b", false), (30, "c", false)],
            300,
        );
        let effects = engine.begin(config, at(0));
        assert_eq!(fired_texts(&effects), vec!["a"]);

        let effects = engine.tick(at(30));
        assert_eq!(fired_texts(&effects), vec!["b", "c"]);

        // Never again on subsequent ticks.
        assert!(fired_texts(&engine.tick(at(31))).is_empty());
        assert!(fired_texts(&engine.tick(at(200))).is_empty());
    }

    #[test]
    fn missed_ticks_fire_skipped_cues_in_order() {
        let mut engine = SessionEngine::new();
        engine.begin(
            guided(vec![(10, "a", false), (20, "b", false), (30, "c", false)], 300),
            at(0),
        );
        // One coarse tick covers all three.
        let effects = engine.tick(at(35));
        assert_eq!(fired_texts(&effects), vec!["a", "b", "c"]);
    }

    #[test]
    fn spoken_cues_emit_speak_when_tts_enabled() {
        let mut engine = SessionEngine::new();
        let mut config = guided(vec![(0, "breathe", true)], 300);
        config.tts_enabled = true;
        config.voice_uri = Some("voice-1".into());
        let effects = engine.begin(config, at(0));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Speak { text, options }
                if text == "breathe" && options.voice_uri.as_deref() == Some("voice-1")
        )));
    }

    #[test]
    fn unspoken_cues_never_emit_speak() {
        let mut engine = SessionEngine::new();
        let mut config = guided(vec![(0, "silent cue", false)], 300);
        config.tts_enabled = true;
        let effects = engine.begin(config, at(0));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Speak { .. })));
    }

    #[test]
    fn active_cue_dismisses_after_timeout() {
        let mut engine = SessionEngine::new();
        engine.begin(guided(vec![(0, "a", false)], 300), at(0));
        assert!(engine.snapshot().active_cue.is_some());

        let effects = engine.tick(at(6));
        assert!(!effects.contains(&Effect::DismissCue));

        let effects = engine.tick(at(7));
        assert!(effects.contains(&Effect::DismissCue));
        assert!(engine.snapshot().active_cue.is_none());
    }

    #[test]
    fn newer_cue_supersedes_pending_dismissal() {
        let mut engine = SessionEngine::new();
        engine.begin(guided(vec![(0, "a", false), (5, "b", false)], 300), at(0));
        let effects = engine.tick(at(5));
        assert_eq!(fired_texts(&effects), vec!["b"]);
        // "b" got a fresh display window; still visible at t=10.
        assert!(!engine.tick(at(10)).contains(&Effect::DismissCue));
        assert_eq!(engine.snapshot().active_cue.unwrap().text, "b");
    }

    #[test]
    fn auto_end_when_remaining_reaches_zero() {
        let mut engine = SessionEngine::new();
        engine.begin(timed(60), at(0));
        let effects = engine.tick(at(60));
        assert_eq!(engine.phase(), SessionPhase::Ended);
        assert_eq!(engine.remaining_sec(), 0);
        assert!(effects.contains(&Effect::StopAudio));
        assert!(effects.contains(&Effect::CancelSpeech));
        assert!(effects.contains(&Effect::SessionEnded { manual: false }));
    }

    #[test]
    fn clock_jump_forward_self_corrects() {
        let mut engine = SessionEngine::new();
        engine.begin(timed(60), at(0));
        // Host suspended; a single very late tick lands past the deadline.
        let effects = engine.tick(at(3600));
        assert_eq!(engine.phase(), SessionPhase::Ended);
        assert!(effects.contains(&Effect::SessionEnded { manual: false }));
    }

    #[test]
    fn manual_end_forces_remaining_to_zero() {
        let mut engine = SessionEngine::new();
        engine.begin(timed(600), at(0));
        engine.tick(at(90));
        let effects = engine.end(true, at(90));
        assert_eq!(engine.phase(), SessionPhase::Ended);
        assert_eq!(engine.remaining_sec(), 0);
        assert_eq!(engine.current_sec(), 90);
        assert!(effects.contains(&Effect::SessionEnded { manual: true }));
    }

    #[test]
    fn end_works_from_paused() {
        let mut engine = SessionEngine::new();
        engine.begin(timed(600), at(0));
        engine.tick(at(30));
        engine.pause(at(30));
        let effects = engine.end(true, at(100));
        assert_eq!(engine.phase(), SessionPhase::Ended);
        assert_eq!(engine.current_sec(), 30);
        assert!(effects.contains(&Effect::SessionEnded { manual: true }));
    }

    #[test]
    fn resume_after_natural_completion_is_rejected() {
        let mut engine = SessionEngine::new();
        engine.begin(timed(60), at(0));
        engine.pause(at(10));
        engine.resume(at(20));
        engine.tick(at(80));
        assert_eq!(engine.phase(), SessionPhase::Ended);
        assert!(engine.resume(at(90)).is_empty());
        assert_eq!(engine.phase(), SessionPhase::Ended);
    }

    #[test]
    fn breathing_phase_follows_eight_second_cycle() {
        let mut engine = SessionEngine::new();
        engine.begin(timed(600), at(0));
        engine.tick(at(4));
        assert!((engine.snapshot().breathing_phase - 0.5).abs() < f64::EPSILON);
        engine.tick(at(8));
        assert_eq!(engine.snapshot().breathing_phase, 0.0);
        engine.tick(at(10));
        assert!((engine.snapshot().breathing_phase - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut engine = SessionEngine::new();
        engine.begin(timed(60), at(0));
        engine.end(true, at(10));
        engine.reset();
        assert_eq!(engine.phase(), SessionPhase::Idle);
        assert!(engine.config().is_none());
    }

    proptest! {
        /// Only intervals spent Running advance the clock, for any
        /// pause/resume sequence.
        #[test]
        fn paused_time_never_counts(intervals in prop::collection::vec((1u64..120, 1u64..120), 1..8)) {
            let duration: u64 = 3600;
            let mut engine = SessionEngine::new();
            engine.begin(timed(duration as u32), at(0));

            // Total run time stays well below the duration, so the
            // session never auto-ends mid-sequence.
            let mut clock = 0i64;
            let mut running = 0u64;
            for (run_secs, pause_secs) in intervals {
                clock += run_secs as i64;
                running += run_secs;
                engine.tick(at(clock));
                engine.pause(at(clock));
                clock += pause_secs as i64;
                engine.resume(at(clock));
            }
            engine.tick(at(clock));
            prop_assert_eq!(engine.current_sec(), running);
            prop_assert_eq!(engine.remaining_sec(), duration - running);
        }
    }
}
