//! HTTP server command
//!
//! Connects every backing service, runs migrations, then serves until
//! Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use openmusic_core::OpenMusicConfig;
use openmusic_server::auth::TokenManager;
use openmusic_server::cache::{CacheStore, MemoryCache, RedisCache};
use openmusic_server::db::{create_pool_with_options, migrations};
use openmusic_server::queue::AmqpPublisher;
use openmusic_server::storage::CoverStorage;
use openmusic_server::{run_server, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: HOST:PORT from configuration)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Skip creating missing tables on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

/// `--bind`, or HOST:PORT from configuration. HOST may be a name like `localhost`.
async fn bind_addr(args: &ServeArgs, config: &OpenMusicConfig) -> Result<SocketAddr> {
    if let Some(addr) = args.bind {
        return Ok(addr);
    }
    let host = config.http.host.as_str();
    tokio::net::lookup_host((host, config.http.port))
        .await
        .with_context(|| format!("Failed to resolve HOST '{}'", host))?
        .next()
        .with_context(|| format!("HOST '{}' resolved to no addresses", host))
}

async fn connect_cache(config: &OpenMusicConfig) -> Result<Arc<dyn CacheStore>> {
    match &config.cache.redis_url {
        Some(url) => {
            let cache = RedisCache::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            Ok(Arc::new(cache))
        }
        None => {
            tracing::warn!("REDIS_SERVER not set, using in-process cache");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut config: OpenMusicConfig) -> Result<()> {
    if let Some(url) = &args.database_url {
        config.database.url = url.clone();
    }
    let bind_addr = bind_addr(&args, &config).await?;
    let (access_key, refresh_key) = config.tokens.keys()?;

    tracing::info!("Starting OpenMusic server on {}", bind_addr);

    // Create database pool
    let pool = create_pool_with_options(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to create database pool")?;
    if !args.skip_migrations {
        migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;
    }

    let state = AppState {
        pool,
        cache: connect_cache(&config).await?,
        publisher: Arc::new(AmqpPublisher::new(
            config.queue.amqp_url.clone(),
            config.queue.channel.clone(),
        )),
        tokens: TokenManager::new(
            access_key,
            refresh_key,
            Duration::from_secs(config.tokens.access_token_age_secs),
        ),
        storage: CoverStorage::new(&config.storage.upload_dir),
        public_base_url: config.http.public_base_url(),
        cache_expiry: Duration::from_secs(config.cache.expiry_secs),
    };

    let server_config = ServerConfig {
        bind_addr,
        cors_permissive: args.cors_permissive || config.http.cors_permissive,
    };

    // Run server (blocks until shutdown)
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(bind: Option<&str>) -> ServeArgs {
        ServeArgs {
            bind: bind.map(|b| b.parse().unwrap()),
            cors_permissive: false,
            database_url: None,
            skip_migrations: false,
        }
    }

    #[tokio::test]
    async fn bind_defaults_to_config() {
        let config = OpenMusicConfig::default();
        assert_eq!(
            bind_addr(&args(None), &config).await.unwrap(),
            "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
        );
    }

    #[tokio::test]
    async fn bind_flag_wins() {
        let config = OpenMusicConfig::default();
        assert_eq!(
            bind_addr(&args(Some("0.0.0.0:8080")), &config)
                .await
                .unwrap()
                .port(),
            8080
        );
    }
}
