//! `ankibee audio` - fetch a pronunciation clip

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ankibee_core::audio::cache_key;
use ankibee_core::models::Region;

use crate::context::App;

#[derive(Args, Debug)]
pub struct AudioArgs {
    /// Word to pronounce
    pub word: String,

    /// Accent: us or gb
    #[arg(long, short = 'r', default_value = "us")]
    pub region: Region,

    /// Also copy the clip here
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

pub async fn run(args: AudioArgs, app: &App) -> Result<()> {
    let fetcher = app.audio();
    let bytes = fetcher.fetch_audio(&args.word, args.region).await?;

    match args.out {
        Some(out) => {
            tokio::fs::write(&out, &bytes)
                .await
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Saved {} bytes to {}", bytes.len(), out.display());
        }
        None => {
            let path = fetcher.cache().path_for(&cache_key(&args.word, args.region));
            println!("{} ({} bytes)", path.display(), bytes.len());
        }
    }
    Ok(())
}
