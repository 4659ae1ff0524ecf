use clap::Subcommand;
use mindful_core::{all_guides, get_guide};
use serde::Serialize;

use super::print_json;

#[derive(Subcommand)]
pub enum GuidesAction {
    /// List the built-in guided meditations
    List,
    /// Print one guide with its full cue script
    Show { id: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GuideSummary {
    id: String,
    title: String,
    duration_sec: u32,
    cue_count: usize,
}

pub fn run(action: GuidesAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        GuidesAction::List => {
            let summaries: Vec<_> = all_guides()
                .into_iter()
                .map(|g| GuideSummary {
                    id: g.id,
                    title: g.title,
                    duration_sec: g.duration_sec,
                    cue_count: g.cues.len(),
                })
                .collect();
            print_json(&summaries)?;
        }
        GuidesAction::Show { id } => {
            let guide = get_guide(&id).ok_or_else(|| format!("no guide with id '{id}'"))?;
            print_json(&guide)?;
        }
    }

    Ok(())
}
