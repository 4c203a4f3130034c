//! Headless feed host: newline-delimited JSON on stdin/stdout.
//!
//! Reads `FeedCommand` lines from stdin, builds each feed and writes one
//! `FeedResponse` line per command to stdout. All tracing output goes to
//! stderr so that stdout remains a clean JSON protocol channel.
//!
//! Usage: `feedweave-host [CONFIG]`. Without an argument the default config
//! path is used when it exists.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use feedweave::host::serve;
use feedweave::{
    CatalogQuoteSource, FeedConfig, FeedOrchestrator, FeedRequest, HandlePool, NearbyQuotesGenerator, SessionFactory,
};
use tokio::io::BufReader;

fn load_config() -> anyhow::Result<FeedConfig> {
    let path = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => {
            let default = FeedConfig::default_config_path();
            if !default.exists() {
                return Ok(FeedConfig::default());
            }
            default
        }
    };
    FeedConfig::from_file(&path).with_context(|| format!("loading config from {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.host.log_level)),
        )
        .init();

    config.validate().context("invalid configuration")?;
    tracing::info!("feedweave-host starting");

    let pool = Arc::new(HandlePool::with_config(SessionFactory, &config.pool));
    let mut orchestrator = FeedOrchestrator::with_config(Arc::clone(&pool), &config.orchestrator);

    if let Some(catalog_path) = &config.host.catalog_path {
        let source = CatalogQuoteSource::from_file(catalog_path)
            .with_context(|| format!("loading quote catalog from {}", catalog_path.display()))?;
        tracing::info!(quotes = source.len(), "quote catalog loaded");
        orchestrator.register(Arc::new(NearbyQuotesGenerator::new(source, &config.ranking)));
    }

    if orchestrator.generator_count() == 0 {
        tracing::warn!("no generators configured, every feed will be empty");
    }

    let defaults = FeedRequest::from_config(&config.orchestrator);
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    let answered = serve(&orchestrator, &defaults, stdin, stdout).await.map_err(|e| {
        tracing::error!(error = %e, "feedweave-host exited with error");
        anyhow::anyhow!("feedweave-host failed: {e}")
    })?;

    pool.close();
    tracing::info!(answered, "feedweave-host shut down cleanly");
    Ok(())
}
