use std::fs;
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use mindful_core::storage::{open_store, ImportMode, Snapshot};

use super::print_json;

#[derive(Subcommand)]
pub enum DataAction {
    /// Write a full backup as JSON
    Export {
        /// Destination file; prints to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load a backup file into the store
    Import {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = Mode::Merge)]
        mode: Mode,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Upsert by id; existing rows not in the backup are kept
    Merge,
    /// Drop existing data first
    Replace,
}

impl From<Mode> for ImportMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Merge => ImportMode::Merge,
            Mode::Replace => ImportMode::Replace,
        }
    }
}

pub fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store();

    match action {
        DataAction::Export { output } => {
            let snapshot = store.export_snapshot()?;
            match output {
                Some(path) => {
                    fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;
                    println!("{{\"exported\": \"{}\"}}", path.display());
                }
                None => print_json(&snapshot)?,
            }
        }
        DataAction::Import { path, mode } => {
            let text = fs::read_to_string(&path)?;
            let snapshot: Snapshot = serde_json::from_str(&text)?;
            store.as_mut().import_snapshot(&snapshot, mode.into())?;
            println!(
                "{{\"imported\": {}, \"presets\": {}, \"videos\": {}}}",
                snapshot.sessions.len(),
                snapshot.presets.len(),
                snapshot.videos.len()
            );
        }
    }

    Ok(())
}
