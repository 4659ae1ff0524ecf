//! Guided-session catalog.
//!
//! Guides are static, read-only scripts: an ordered list of cues at fixed
//! elapsed-second offsets plus a total duration. The session engine fires
//! each cue at most once per run.

use serde::{Deserialize, Serialize};

/// A timed prompt within a guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cue {
    /// Elapsed seconds at which the cue fires.
    pub at_sec: u32,
    pub text: String,
    /// Whether the cue should also be spoken when TTS is enabled.
    #[serde(default)]
    pub speak: bool,
}

/// A fixed-duration script of cues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    pub id: String,
    pub title: String,
    pub duration_sec: u32,
    /// Cues in non-decreasing `at_sec` order.
    pub cues: Vec<Cue>,
}

/// The full static catalog.
pub fn all_guides() -> Vec<Guide> {
    fn cue(at_sec: u32, text: &str, speak: bool) -> Cue {
        Cue { at_sec, text: text.into(), speak }
    }

    vec![
        Guide {
            id: "guide_settling_breath".into(),
            title: "Settling Breath".into(),
            duration_sec: 5 * 60,
            cues: vec![
                cue(0, "Find a comfortable position and let your eyes soften.", true),
                cue(30, "Breathe in slowly through the nose.", true),
                cue(60, "Let the exhale be a little longer than the inhale.", true),
                cue(120, "If the mind wanders, gently return to the breath.", true),
                cue(180, "Notice the pause at the top and bottom of each breath.", false),
                cue(240, "Stay with the rhythm. Nothing to fix.", true),
                cue(280, "In a moment, let the practice come to a close.", true),
            ],
        },
        Guide {
            id: "guide_body_scan".into(),
            title: "Body Scan Basics".into(),
            duration_sec: 10 * 60,
            cues: vec![
                cue(0, "Settle in and take three slow breaths.", true),
                cue(45, "Bring attention to the top of your head.", true),
                cue(120, "Move down through the face, jaw, and neck.", true),
                cue(210, "Notice the shoulders. Let them drop.", true),
                cue(300, "Scan down the arms to the fingertips.", false),
                cue(390, "Rest attention on the belly rising and falling.", true),
                cue(480, "Move through the hips, legs, and feet.", true),
                cue(560, "Hold the whole body in awareness.", true),
            ],
        },
        Guide {
            id: "guide_wind_down".into(),
            title: "Wind-Down for Sleep".into(),
            duration_sec: 8 * 60,
            cues: vec![
                cue(0, "Lie down and let the day go.", true),
                cue(60, "Unclench the jaw. Soften the forehead.", true),
                cue(150, "With each exhale, sink a little deeper.", true),
                cue(270, "There is nowhere else to be.", false),
                cue(360, "Let thoughts drift past like clouds.", true),
                cue(440, "Rest here as long as you like.", true),
            ],
        },
    ]
}

/// Look up a guide by id.
pub fn get_guide(id: &str) -> Option<Guide> {
    all_guides().into_iter().find(|g| g.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_cues_are_ordered_and_in_range() {
        for guide in all_guides() {
            let mut last = 0;
            for c in &guide.cues {
                assert!(c.at_sec >= last, "{}: cues out of order", guide.id);
                assert!(c.at_sec < guide.duration_sec, "{}: cue past end", guide.id);
                last = c.at_sec;
            }
        }
    }

    #[test]
    fn lookup_by_id() {
        assert!(get_guide("guide_settling_breath").is_some());
        assert!(get_guide("missing").is_none());
    }
}
