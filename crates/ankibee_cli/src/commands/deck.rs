//! `ankibee deck` - inspect or extend the saved deck

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::warn;

use ankibee_core::models::{Card, Region};

use crate::context::App;

#[derive(Subcommand, Debug)]
pub enum DeckCommands {
    /// List the cards in the saved deck
    Show,

    /// Look up a word and append it to the saved deck
    Add {
        /// Word to add
        word: String,

        /// Accent: us or gb
        #[arg(long, short = 'r', default_value = "us")]
        region: Region,

        /// Picture to show with the answer (jpg, png, gif, webp or bmp)
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

pub async fn run(cmd: DeckCommands, app: &App) -> Result<()> {
    match cmd {
        DeckCommands::Show => show(app).await,
        DeckCommands::Add { word, region, image } => add(app, &word, region, image.as_deref()).await,
    }
}

async fn show(app: &App) -> Result<()> {
    let deck = app.deck_store().load_deck().await?;
    println!("{} ({} cards)", deck.name, deck.cards.len());

    for (i, card) in deck.cards.iter().enumerate() {
        let audio = match (card.has_audio(), card.has_image()) {
            (true, true) => "audio+image",
            (true, false) => "audio",
            (false, true) => "image",
            (false, false) => "no audio",
        };
        let summary = card.definition.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let added = chrono::DateTime::from_timestamp_millis(card.created_at)
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!("{:>3}. {:<20} [{}] {} {}", i + 1, card.word, audio, added, summary);
    }
    Ok(())
}

async fn add(app: &App, word: &str, region: Region, image: Option<&Path>) -> Result<()> {
    let definition = app.dictionary().fetch_definition(word).await?;

    let mut card = match app.audio().fetch_audio(word, region).await {
        Ok(bytes) => Card::new(word.trim(), definition).with_audio(region, bytes),
        Err(e) => {
            warn!("Adding '{}' without audio: {}", word, e);
            Card::new(word.trim(), definition)
        }
    };
    if let Some(path) = image {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading image {}", path.display()))?;
        card = card.with_image(bytes);
    }
    let has_audio = card.has_audio();

    let store = app.deck_store();
    let mut deck = store.load_deck().await?;
    deck.cards.push(card);
    store.save_deck(&deck).await?;

    println!(
        "Added '{}' to {} ({} cards){}",
        word.trim(),
        deck.name,
        deck.cards.len(),
        if has_audio { "" } else { " without audio" }
    );
    Ok(())
}
