use chrono::Utc;
use clap::Subcommand;
use mindful_core::storage::{open_store, Store};
use mindful_core::{
    finalize, get_guide, AudioCoordinator, AudioSelection, NullSoundscape, NullSpeech,
    PracticeType, ReflectionInput, SessionConfig, SessionEngine, SessionPhase, SessionRunner,
    Settings,
};

use super::print_json;

const ENGINE_KEY: &str = "session_engine";

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session
    Start {
        /// Practice type: breath, body_scan, focus, sleep, custom
        #[arg(long, default_value = "breath")]
        practice: String,
        /// Duration in minutes (ignored when --guide is given)
        #[arg(long, default_value = "10")]
        minutes: u32,
        /// Guide id for a guided session
        #[arg(long)]
        guide: Option<String>,
        /// Sound preset id for soundscape audio
        #[arg(long)]
        preset: Option<String>,
        /// Saved or curated video id for ambient video audio
        #[arg(long)]
        video: Option<String>,
        /// Disable spoken cues for this session
        #[arg(long)]
        no_tts: bool,
    },
    /// Print current session state as JSON (advances the clock first)
    Status,
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// End the session and record a reflection
    End {
        /// Mood rating 1-5
        #[arg(long, default_value = "3")]
        mood: u8,
        #[arg(long, default_value = "")]
        notes: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Discard any session state without recording it
    Reset,
}

fn load_engine(store: &dyn Store) -> SessionEngine {
    if let Ok(Some(json)) = store.kv_get(ENGINE_KEY) {
        if let Ok(engine) = serde_json::from_str::<SessionEngine>(&json) {
            return engine;
        }
    }
    SessionEngine::new()
}

fn save_engine(
    store: &mut dyn Store,
    engine: &SessionEngine,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    store.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

fn parse_practice(s: &str) -> Result<PracticeType, Box<dyn std::error::Error>> {
    Ok(match s {
        "breath" => PracticeType::Breath,
        "body_scan" => PracticeType::BodyScan,
        "focus" => PracticeType::Focus,
        "sleep" => PracticeType::Sleep,
        "custom" => PracticeType::Custom,
        other => return Err(format!("unknown practice type: {other}").into()),
    })
}

/// The CLI has no audio output of its own; effects land in null backends
/// and the state transitions are what matter.
fn runner(engine: SessionEngine) -> SessionRunner {
    let coordinator = AudioCoordinator::new(Box::new(NullSoundscape), Box::new(NullSpeech));
    SessionRunner::with_engine(engine, coordinator)
}

fn resolve_audio(
    store: &dyn Store,
    preset: Option<String>,
    video: Option<String>,
) -> Result<AudioSelection, Box<dyn std::error::Error>> {
    match (preset, video) {
        (Some(_), Some(_)) => Err("choose either --preset or --video, not both".into()),
        (Some(id), None) => {
            let preset = store
                .get_presets()?
                .into_iter()
                .find(|p| p.id == id)
                .ok_or_else(|| format!("no preset with id '{id}'"))?;
            Ok(AudioSelection::Soundscape { preset })
        }
        (None, Some(id)) => {
            use mindful_core::{MockVideoProvider, VideoProvider};
            let saved = store.saved_videos()?.into_iter().find(|v| v.id == id);
            let video = match saved {
                Some(v) => v,
                None => MockVideoProvider::default()
                    .curated()
                    .into_iter()
                    .find(|v| v.id == id)
                    .ok_or_else(|| format!("no saved or curated video with id '{id}'"))?,
            };
            Ok(AudioSelection::Youtube { video })
        }
        (None, None) => Ok(AudioSelection::None),
    }
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store();
    let engine = load_engine(store.as_ref());
    let now = Utc::now();

    match action {
        SessionAction::Start {
            practice,
            minutes,
            guide,
            preset,
            video,
            no_tts,
        } => {
            match engine.phase() {
                SessionPhase::Running | SessionPhase::Paused => {
                    return Err("a session is already active; end or reset it first".into());
                }
                SessionPhase::Idle | SessionPhase::Ended => {}
            }
            if guide.is_none() && minutes == 0 {
                return Err("duration must be at least one minute".into());
            }

            let settings = Settings::load(store.as_ref())?;
            let mut config = match guide {
                Some(id) => {
                    let guide =
                        get_guide(&id).ok_or_else(|| format!("no guide with id '{id}'"))?;
                    SessionConfig::guided(guide)
                }
                None => SessionConfig::timed(parse_practice(&practice)?, minutes.saturating_mul(60)),
            };
            config.audio = resolve_audio(store.as_ref(), preset, video)?;
            config.tts_enabled = config.tts_enabled && settings.tts_enabled && !no_tts;
            config.voice_uri = settings.voice_uri.clone();

            let mut runner = runner(SessionEngine::new());
            runner.begin(config, now);
            save_engine(store.as_mut(), runner.engine())?;
            print_json(&runner.snapshot())?;
        }
        SessionAction::Status => {
            let mut runner = runner(engine);
            runner.tick(now);
            save_engine(store.as_mut(), runner.engine())?;
            print_json(&runner.snapshot())?;
        }
        SessionAction::Pause => {
            let mut runner = runner(engine);
            if runner.engine().phase() != SessionPhase::Running {
                return Err("no running session to pause".into());
            }
            runner.pause(now);
            save_engine(store.as_mut(), runner.engine())?;
            print_json(&runner.snapshot())?;
        }
        SessionAction::Resume => {
            let mut runner = runner(engine);
            if runner.engine().phase() != SessionPhase::Paused {
                return Err("no paused session to resume".into());
            }
            runner.resume(now);
            save_engine(store.as_mut(), runner.engine())?;
            print_json(&runner.snapshot())?;
        }
        SessionAction::End { mood, notes, tags } => {
            let mut runner = runner(engine);
            match runner.engine().phase() {
                SessionPhase::Idle => return Err("no active session to end".into()),
                SessionPhase::Running | SessionPhase::Paused => {
                    runner.end(true, now);
                }
                SessionPhase::Ended => {}
            }
            let input = ReflectionInput { mood, notes, tags };
            let record = finalize(runner.engine(), &input, now)?;
            store.as_mut().add_session(&record)?;
            store.as_mut().kv_delete(ENGINE_KEY)?;
            print_json(&record)?;
        }
        SessionAction::Reset => {
            store.as_mut().kv_delete(ENGINE_KEY)?;
            println!("{{\"type\": \"session_reset\"}}");
        }
    }

    Ok(())
}
