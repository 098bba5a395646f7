//! CLI glue for tagwatch: argument parsing, collaborator wiring and the two entrypoints.
//!
//! All fetch, retry and dedup logic lives in `tagwatch-core`. This module only loads the
//! config, builds the concrete collaborators and hands them to the core.
//!
//! - `fetch-tags` runs one batch tag cycle and prints the result as JSON.
//! - `monitor` polls the global events feed until Ctrl-C.
use crate::load_config::{load_config, CliConfig};
use crate::publish::HttpQueuePublisher;
use crate::sources::{JsonFileTagCache, StaticTokenSource};
use anyhow::Result;
use clap::{Parser, Subcommand};
use futures::FutureExt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tagwatch_core::client::FeedClient;
use tagwatch_core::fetch_tags::TagFetcher;
use tagwatch_core::monitor::EventsMonitor;
use tagwatch_core::retry::{AttemptCounter, RetryPolicy};
use tagwatch_core::token::TokenRotation;

/// CLI for tagwatch: detect new upstream tags and releases.
#[derive(Parser)]
#[clap(
    name = "tagwatch",
    version,
    about = "Detect new tags and releases of upstream repositories and forward them to a queue"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the tags of every configured repository once and print them as JSON
    FetchTags {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Poll the global events feed and publish new releases until interrupted
    Monitor {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::FetchTags { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "fetch-tags", repos = config.repos.len(), "Starting tag fetch");
            fetch_tags(&config).await
        }
        Commands::Monitor { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "monitor", "Starting events monitor");
            monitor(&config).await
        }
    }
}

async fn fetch_tags(config: &CliConfig) -> Result<()> {
    let client = FeedClient::new(config.fetch.keep_alive());
    let cache = JsonFileTagCache::new(config.cache_path.clone());
    let counter = AttemptCounter::new();
    counter.track();

    let fetcher = TagFetcher {
        source: &client,
        cache: &cache,
        policy: RetryPolicy::from(&config.fetch),
        batch: config.batch.clone(),
        counter: &counter,
    };
    let result = fetcher.fetch_all(config.repos.clone()).await;
    counter.log_total();
    client.close();

    tracing::info!(command = "fetch-tags", groups = result.len(), "Tag fetch complete");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn monitor(config: &CliConfig) -> Result<()> {
    let tokens = TokenRotation::load(&StaticTokenSource::new(config.access_tokens.clone())).await?;
    let publisher = HttpQueuePublisher::new(config.queue_url()?)
        .map_err(|e| anyhow::anyhow!("Failed to build queue publisher: {e}"))?;
    config.monitor.trace_loaded();

    let client = Arc::new(FeedClient::new(config.fetch.keep_alive()));
    let monitor = EventsMonitor::new(
        client.clone(),
        Arc::new(publisher),
        tokens,
        config.monitor.clone(),
    );

    monitor.run(shutdown_signal()).await;

    client.close();
    tracing::info!(command = "monitor", "Events monitor shut down");
    Ok(())
}

/// Resolves on Ctrl-C. The handler is installed before this returns, so a Ctrl-C that
/// arrives while the first poll is still running is caught too.
pub fn shutdown_signal() -> impl Future<Output = ()> {
    let mut ctrl_c = Box::pin(tokio::signal::ctrl_c());
    let early = (&mut ctrl_c).now_or_never();
    async move {
        let result = match early {
            Some(result) => result,
            None => ctrl_c.await,
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C, stopping");
        }
    }
}
