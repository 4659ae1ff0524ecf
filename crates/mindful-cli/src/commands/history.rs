use clap::Subcommand;
use mindful_core::storage::open_store;

use super::print_json;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, newest first
    List {
        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete one record by id
    Delete { id: String },
    /// Delete the entire session history
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store();

    match action {
        HistoryAction::List { limit } => {
            let mut sessions = store.get_sessions()?;
            if let Some(limit) = limit {
                sessions.truncate(limit);
            }
            print_json(&sessions)?;
        }
        HistoryAction::Delete { id } => {
            let deleted = store.as_mut().delete_session(&id)?;
            if !deleted {
                return Err(format!("no session with id '{id}'").into());
            }
            println!("{{\"deleted\": \"{id}\"}}");
        }
        HistoryAction::Clear => {
            store.as_mut().clear_sessions()?;
            println!("{{\"type\": \"history_cleared\"}}");
        }
    }

    Ok(())
}
