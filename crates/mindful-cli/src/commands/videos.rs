use chrono::Utc;
use clap::Subcommand;
use mindful_core::storage::open_store;
use mindful_core::{MockVideoProvider, VideoProvider};

use super::print_json;

#[derive(Subcommand)]
pub enum VideosAction {
    /// Curated ambient videos that pass the curation policy
    Curated,
    /// Search the provider for ambient videos
    Search {
        query: String,
        #[arg(long, default_value = "8")]
        max: usize,
    },
    /// List saved videos, newest first
    Saved,
    /// Save a curated or search-result video for quick access
    Save { id: String },
    /// Remove a video from the saved list
    Remove { id: String },
}

pub fn run(action: VideosAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store();
    let provider = MockVideoProvider::default();

    match action {
        VideosAction::Curated => {
            print_json(&provider.curated())?;
        }
        VideosAction::Search { query, max } => {
            print_json(&provider.search(&query, max))?;
        }
        VideosAction::Saved => {
            print_json(&store.saved_videos()?)?;
        }
        VideosAction::Save { id } => {
            // An empty query returns the provider's full corpus.
            let mut video = provider
                .search("", usize::MAX)
                .into_iter()
                .find(|v| v.id == id)
                .ok_or_else(|| format!("no curated video with id '{id}'"))?;
            video.saved_at = Some(Utc::now());
            store.as_mut().save_video(&video)?;
            print_json(&video)?;
        }
        VideosAction::Remove { id } => {
            let removed = store.as_mut().remove_video(&id)?;
            if !removed {
                return Err(format!("no saved video with id '{id}'").into());
            }
            println!("{{\"removed\": \"{id}\"}}");
        }
    }

    Ok(())
}
