//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;
use openmusic_core::OpenMusicConfig;
use openmusic_server::db::{create_pool, migrations};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,
}

pub async fn run_migrate(args: MigrateArgs, config: OpenMusicConfig) -> Result<()> {
    let url = args.database_url.unwrap_or(config.database.url);

    let pool = create_pool(&url)
        .await
        .context("Failed to create database pool")?;
    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    println!("Migrations applied");
    Ok(())
}
