//! openmusic CLI - runs the OpenMusic API and its export worker
//!
//! - `serve`: HTTP API (albums, songs, users, playlists, likes, covers, exports)
//! - `consume`: playlist export worker (queue to email)
//! - `migrate`: create database tables
//! - `config show`: print the effective configuration
//! - `completions`: shell completion scripts

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use openmusic_core::OpenMusicConfig;

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "openmusic",
    author,
    version,
    about = "OpenMusic backend - music catalog API and playlist export worker"
)]
struct Cli {
    /// TOML configuration file (environment variables still take precedence)
    #[arg(long, short = 'c', global = true, env = "OPENMUSIC_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Run the playlist export consumer
    Consume(commands::consume::ConsumeArgs),
    /// Create database tables and indexes
    Migrate(commands::migrate::MigrateArgs),
    /// Inspect configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

fn load_config(path: Option<&std::path::Path>) -> Result<OpenMusicConfig> {
    OpenMusicConfig::load(path).context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal outside development
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init_tracing(&TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => {
            let config = load_config(cli.config.as_deref())?;
            commands::run_serve(args, config).await?
        }
        Commands::Consume(args) => {
            let config = load_config(cli.config.as_deref())?;
            commands::run_consume(args, config).await?
        }
        Commands::Migrate(args) => {
            let config = load_config(cli.config.as_deref())?;
            commands::run_migrate(args, config).await?
        }
        Commands::Config(args) => {
            let config = load_config(cli.config.as_deref())?;
            commands::run_config(args, &config)?
        }
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["openmusic", "migrate", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Migrate(_)));
    }
}
