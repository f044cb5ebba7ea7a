//! `ankibee config` - show settings

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::context::App;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the settings file
    Show,

    /// Print the settings file path
    Path,
}

pub fn run(cmd: ConfigCommands, app: &App) -> Result<()> {
    let path = app.config().path();
    match cmd {
        ConfigCommands::Show => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            print!("{}", content);
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}
