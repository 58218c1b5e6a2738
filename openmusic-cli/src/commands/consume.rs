//! Export consumer command

use anyhow::{Context, Result};
use clap::Parser;
use openmusic_consumer::{ExportConsumer, ExportListener, SmtpMailer};
use openmusic_core::OpenMusicConfig;
use openmusic_server::db::create_pool_with_options;
use openmusic_server::http::server::shutdown_signal;

/// Arguments for the consume command
#[derive(Parser, Debug)]
pub struct ConsumeArgs {
    /// Queue to consume (overrides PLAYLIST_CHANNEL_NAME)
    #[arg(long)]
    pub queue: Option<String>,
}

/// Run the export consumer until Ctrl+C or SIGTERM
pub async fn run_consume(args: ConsumeArgs, config: OpenMusicConfig) -> Result<()> {
    let queue = args.queue.unwrap_or(config.queue.channel);

    let pool = create_pool_with_options(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to create database pool")?;
    let mailer = SmtpMailer::from_config(&config.mail).context("Invalid mail configuration")?;
    let listener = ExportListener::new(pool, mailer);

    tracing::info!(queue = %queue, "Starting export consumer");
    ExportConsumer::new(config.queue.amqp_url, queue)
        .run(&listener, shutdown_signal())
        .await
        .context("Export consumer failed")?;

    Ok(())
}
