//! Configuration inspection

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use openmusic_core::OpenMusicConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration with secrets masked
    Show {
        /// Output format
        #[arg(long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ConfigFormat {
    Toml,
    Json,
}

pub fn run_config(args: ConfigArgs, config: &OpenMusicConfig) -> Result<()> {
    match args.command {
        ConfigCommand::Show { format } => println!("{}", render(config, format)?),
    }
    Ok(())
}

fn render(config: &OpenMusicConfig, format: ConfigFormat) -> Result<String> {
    let safe = config.redacted();
    match format {
        ConfigFormat::Toml => Ok(safe.to_toml()?),
        ConfigFormat::Json => {
            serde_json::to_string_pretty(&safe).context("Failed to render configuration")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_masked() {
        let mut config = OpenMusicConfig::default();
        config.tokens.access_token_key = Some("very-secret".into());
        config.database.url = "postgres://music:hunter2@db/openmusic".into();

        for format in [ConfigFormat::Toml, ConfigFormat::Json] {
            let out = render(&config, format).unwrap();
            assert!(!out.contains("very-secret"));
            assert!(!out.contains("hunter2"));
        }
    }
}
