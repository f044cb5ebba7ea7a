//! `ankibee cache` - media cache maintenance

use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;

use crate::context::App;

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Delete cached clips and images older than the given age
    Purge {
        /// Maximum age to keep, in days
        #[arg(long, default_value_t = 30)]
        max_age_days: u64,
    },
}

pub async fn run(cmd: CacheCommands, app: &App) -> Result<()> {
    match cmd {
        CacheCommands::Purge { max_age_days } => {
            let max_age = Duration::from_secs(max_age_days.saturating_mul(24 * 60 * 60));
            let layout = app.layout();
            let report = layout
                .audio_cache()
                .purge_older_than(max_age)
                .await
                .merge(layout.image_cache().purge_older_than(max_age).await);
            println!(
                "Removed {} file(s), kept {}{}",
                report.removed,
                report.kept,
                if report.failed > 0 {
                    format!(", {} could not be removed", report.failed)
                } else {
                    String::new()
                }
            );
            Ok(())
        }
    }
}
