use clap::Subcommand;
use mindful_core::storage::{new_preset_from, open_store};

use super::print_json;

#[derive(Subcommand)]
pub enum PresetsAction {
    /// List soundscape presets, most recently updated first
    List,
    /// Save a copy of an existing preset under a new name
    Create {
        /// Preset id to copy layer settings from
        #[arg(long)]
        from: String,
        #[arg(long)]
        name: String,
    },
    /// Delete a custom preset
    Delete { id: String },
}

pub fn run(action: PresetsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store();

    match action {
        PresetsAction::List => {
            print_json(&store.get_presets()?)?;
        }
        PresetsAction::Create { from, name } => {
            let base = store
                .get_presets()?
                .into_iter()
                .find(|p| p.id == from)
                .ok_or_else(|| format!("no preset with id '{from}'"))?;
            let preset = new_preset_from(&base, &name);
            store.as_mut().save_preset(&preset)?;
            print_json(&preset)?;
        }
        PresetsAction::Delete { id } => {
            let preset = store
                .get_presets()?
                .into_iter()
                .find(|p| p.id == id)
                .ok_or_else(|| format!("no preset with id '{id}'"))?;
            if preset.is_built_in {
                return Err("built-in presets cannot be deleted".into());
            }
            store.as_mut().delete_preset(&id)?;
            println!("{{\"deleted\": \"{id}\"}}");
        }
    }

    Ok(())
}
