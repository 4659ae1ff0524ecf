//! Soundscape presets.
//!
//! A preset is a named mix of ambient layers (master/white/pink gain plus a
//! sine tone). Volumes live in `[0, 1]` and the tone frequency in
//! `[60, 320]` Hz; both are clamped at construction and again whenever a
//! preset crosses the storage boundary, so downstream code can assume
//! in-range values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TONE_HZ_MIN: f64 = 60.0;
pub const TONE_HZ_MAX: f64 = 320.0;

/// A single ambient layer: a gain, and for the tone layer a frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Layer {
    pub vol: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hz: Option<f64>,
}

impl Layer {
    pub fn gain(vol: f64) -> Self {
        Self { vol: clamp01(vol), hz: None }
    }

    pub fn tone(vol: f64, hz: f64) -> Self {
        Self {
            vol: clamp01(vol),
            hz: Some(clamp_range(hz, TONE_HZ_MIN, TONE_HZ_MAX)),
        }
    }
}

/// The four mixer layers of a soundscape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Layers {
    pub master: Layer,
    pub white: Layer,
    pub pink: Layer,
    pub tone: Layer,
}

impl Layers {
    /// Clamp every field into its legal range.
    pub fn normalized(mut self) -> Self {
        self.master.vol = clamp01(self.master.vol);
        self.white.vol = clamp01(self.white.vol);
        self.pink.vol = clamp01(self.pink.vol);
        self.tone.vol = clamp01(self.tone.vol);
        self.master.hz = None;
        self.white.hz = None;
        self.pink.hz = None;
        self.tone.hz = Some(clamp_range(
            self.tone.hz.unwrap_or(144.0),
            TONE_HZ_MIN,
            TONE_HZ_MAX,
        ));
        self
    }
}

/// A named soundscape configuration.
///
/// Built-in presets cannot be deleted; editing one in place is expected to
/// clear `is_built_in` (the UI treats an edit as forking a custom copy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundPreset {
    pub id: String,
    pub name: String,
    pub layers: Layers,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_built_in: bool,
}

impl SoundPreset {
    /// Re-clamp layers; applied at the storage boundary on read and write.
    pub fn normalized(mut self) -> Self {
        self.layers = self.layers.normalized();
        self
    }
}

/// The presets seeded into an empty store.
pub fn default_presets() -> Vec<SoundPreset> {
    let now = Utc::now();
    let built_in = |id: &str, name: &str, layers: Layers| SoundPreset {
        id: id.into(),
        name: name.into(),
        layers: layers.normalized(),
        created_at: now,
        updated_at: now,
        is_built_in: true,
    };
    vec![
        built_in(
            "preset_calm_focus",
            "Calm Focus",
            Layers {
                master: Layer::gain(0.58),
                white: Layer::gain(0.0),
                pink: Layer::gain(0.34),
                tone: Layer::tone(0.10, 144.0),
            },
        ),
        built_in(
            "preset_soft_sleep",
            "Soft Sleep",
            Layers {
                master: Layer::gain(0.52),
                white: Layer::gain(0.0),
                pink: Layer::gain(0.42),
                tone: Layer::tone(0.06, 110.0),
            },
        ),
        built_in(
            "preset_clear_mind",
            "Clear Mind",
            Layers {
                master: Layer::gain(0.56),
                white: Layer::gain(0.10),
                pink: Layer::gain(0.22),
                tone: Layer::tone(0.08, 160.0),
            },
        ),
    ]
}

/// Fork a preset into a new custom one with a fresh id.
pub fn new_preset_from(base: &SoundPreset, name: &str) -> SoundPreset {
    let now = Utc::now();
    SoundPreset {
        id: Uuid::new_v4().to_string(),
        name: name.into(),
        layers: base.layers,
        created_at: now,
        updated_at: now,
        is_built_in: false,
    }
}

fn clamp01(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

fn clamp_range(v: f64, lo: f64, hi: f64) -> f64 {
    if v.is_nan() {
        return lo;
    }
    v.clamp(lo, hi)
}
