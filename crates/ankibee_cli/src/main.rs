use anyhow::Result;
use clap::Parser;

use ankibee_cli::args::{Cli, Commands};
use ankibee_cli::commands;
use ankibee_cli::context::App;
use ankibee_core::logging::{init_tracing, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = cli.global;

    let app = App::load(global.config.clone())?;
    let level = if global.verbose {
        LogLevel::Debug
    } else {
        app.settings().logging.level
    };
    init_tracing(level);

    match cli.command {
        Commands::Define(args) => commands::define::run(args, &app).await,
        Commands::Audio(args) => commands::audio::run(args, &app).await,
        Commands::Deck(cmd) => commands::deck::run(cmd, &app).await,
        Commands::Export(args) => commands::export::run(args, &app).await,
        Commands::Cache(cmd) => commands::cache::run(cmd, &app).await,
        Commands::Config(cmd) => commands::config::run(cmd, &app),
    }
}
