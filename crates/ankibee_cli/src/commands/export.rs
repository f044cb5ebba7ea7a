//! `ankibee export` - package the saved deck

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use ankibee_core::export::{FixedPath, SavePathPrompt};

use crate::context::App;
use crate::prompt::DialoguerPrompt;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Deck name (default: the saved deck's name)
    #[arg(long)]
    pub deck_name: Option<String>,

    /// Output file; prompts when omitted
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub async fn run(args: ExportArgs, app: &App) -> Result<()> {
    let deck = app.deck_store().load_deck().await?;

    let deck_name = args
        .deck_name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| Some(deck.name.clone()).filter(|n| !n.trim().is_empty()))
        .unwrap_or_else(|| app.settings().export.default_deck_name.clone());

    let prompt: Box<dyn SavePathPrompt> = match args.output {
        Some(path) => Box::new(FixedPath::new(path)),
        None => Box::new(DialoguerPrompt),
    };

    let result = app
        .exporter()
        .export_deck(&deck_name, &deck.cards, prompt.as_ref())
        .await?;

    println!("Exported '{}' to {}", deck_name, result.file_path.display());
    Ok(())
}
