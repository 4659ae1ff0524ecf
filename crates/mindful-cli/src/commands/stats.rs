use chrono::Utc;
use clap::Subcommand;
use mindful_core::stats::{local_day, summarize, weekly_minutes};
use mindful_core::storage::open_store;

use super::print_json;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals, today's minutes, streak and the weekly chart data
    Show,
    /// Just the last seven days, oldest first
    Weekly,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store();
    let sessions = store.get_sessions()?;
    let today = local_day(Utc::now());

    match action {
        StatsAction::Show => print_json(&summarize(&sessions, today))?,
        StatsAction::Weekly => print_json(&weekly_minutes(&sessions, today))?,
    }

    Ok(())
}
