mod config;
mod engine;
mod runner;

pub use config::{AudioMode, AudioSelection, PracticeType, SessionConfig};
pub use engine::{
    ActiveCue, SessionEngine, SessionPhase, SessionSnapshot, CUE_DISMISS_MS, TICK_INTERVAL_MS,
};
pub use runner::SessionRunner;
