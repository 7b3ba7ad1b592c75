//! Config commands.

use anyhow::Result;
use colored::Colorize;

use crate::cli::{ConfigAction, ConfigCommand};
use crate::config::Config;

pub async fn execute(cmd: ConfigCommand, config: &Config) -> Result<()> {
    match cmd.action {
        ConfigAction::Show => {
            println!("{}", "Effective Configuration".bold());
            println!("{}", "─".repeat(40));
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigAction::Init => {
            let path = Config::config_path();
            if path.exists() {
                println!(
                    "{} Config already exists at {}",
                    "→".cyan(),
                    path.display().to_string().cyan()
                );
                return Ok(());
            }
            let path = config.save()?;
            println!("{} Wrote {}", "✓".green(), path.display());
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }
    }
    Ok(())
}
