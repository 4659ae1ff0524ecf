use clap::Subcommand;
use mindful_core::storage::open_store;
use mindful_core::{ReduceMotion, Settings, TextScale};

use super::print_json;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print effective settings (stored values over defaults)
    Show,
    /// Set one setting by key
    Set {
        /// One of: reduce-motion, high-contrast, text-scale,
        /// calm-session-mode, tts-enabled, voice-uri
        key: String,
        /// New value; "none" clears voice-uri
        value: String,
    },
}

fn parse_bool(value: &str) -> Result<bool, Box<dyn std::error::Error>> {
    match value {
        "true" | "on" => Ok(true),
        "false" | "off" => Ok(false),
        other => Err(format!("expected true/false, got '{other}'").into()),
    }
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store();
    let mut settings = Settings::load(store.as_ref())?;

    match action {
        SettingsAction::Show => print_json(&settings)?,
        SettingsAction::Set { key, value } => {
            match key.as_str() {
                "reduce-motion" => {
                    settings.reduce_motion = match value.as_str() {
                        "system" => ReduceMotion::System,
                        "on" => ReduceMotion::On,
                        "off" => ReduceMotion::Off,
                        other => {
                            return Err(format!("expected system/on/off, got '{other}'").into())
                        }
                    };
                }
                "high-contrast" => settings.high_contrast = parse_bool(&value)?,
                "text-scale" => {
                    settings.text_scale = match value.as_str() {
                        "small" => TextScale::Small,
                        "normal" => TextScale::Normal,
                        "large" => TextScale::Large,
                        other => {
                            return Err(
                                format!("expected small/normal/large, got '{other}'").into()
                            )
                        }
                    };
                }
                "calm-session-mode" => settings.calm_session_mode = parse_bool(&value)?,
                "tts-enabled" => settings.tts_enabled = parse_bool(&value)?,
                "voice-uri" => {
                    settings.voice_uri = if value == "none" { None } else { Some(value) };
                }
                other => return Err(format!("unknown setting: {other}").into()),
            }
            settings.persist(store.as_mut())?;
            print_json(&settings)?;
        }
    }

    Ok(())
}
