//! `ankibee define` - print a word's definition

use anyhow::Result;
use clap::Args;

use crate::context::App;

#[derive(Args, Debug)]
pub struct DefineArgs {
    /// Word to look up
    pub word: String,

    /// Search the Malay dictionary (DBP) instead
    #[arg(long)]
    pub malay: bool,
}

pub async fn run(args: DefineArgs, app: &App) -> Result<()> {
    if args.malay {
        let result = app.malay_dictionary().search(&args.word).await?;
        if !result.has_results {
            println!("No Malay definitions found for '{}'", result.word);
            return Ok(());
        }
        for definition in &result.definitions {
            let phonetic = definition
                .phonetic
                .as_deref()
                .map(|p| format!(" [{}]", p))
                .unwrap_or_default();
            println!("{}{} ({})", definition.word, phonetic, definition.source);
        }
        println!("{}", result.to_card_text());
        return Ok(());
    }

    let definition = app.dictionary().fetch_definition(&args.word).await?;
    println!("{}", definition);
    Ok(())
}
