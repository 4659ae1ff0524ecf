use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mindful-cli", version, about = "Mindful CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Session control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Session history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Practice statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Soundscape preset management
    Presets {
        #[command(subcommand)]
        action: commands::presets::PresetsAction,
    },
    /// Guided meditation catalog
    Guides {
        #[command(subcommand)]
        action: commands::guides::GuidesAction,
    },
    /// Ambient video discovery and saved list
    Videos {
        #[command(subcommand)]
        action: commands::videos::VideosAction,
    },
    /// User settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Export and import backups
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Presets { action } => commands::presets::run(action),
        Commands::Guides { action } => commands::guides::run(action),
        Commands::Videos { action } => commands::videos::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Data { action } => commands::data::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
