//! CLI argument definitions using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{
    audio::AudioArgs,
    cache::CacheCommands,
    config::ConfigCommands,
    deck::DeckCommands,
    define::DefineArgs,
    export::ExportArgs,
};

#[derive(Parser)]
#[command(name = "ankibee")]
#[command(author, version, about = "Build spelling flashcard decks with definitions and pronunciations")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Settings file (default: settings.toml in the data directory)
    #[arg(long, global = true, env = "ANKIBEE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up and print a word's definition
    Define(DefineArgs),

    /// Fetch a word's pronunciation
    Audio(AudioArgs),

    /// Inspect or extend the saved deck
    #[command(subcommand)]
    Deck(DeckCommands),

    /// Package the saved deck as an .apkg file
    Export(ExportArgs),

    /// Manage the audio cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}
