//! Screenshot search server - HTTP API over the shotsearch-core library.
//!
//! Indexes the watched directory on startup, then serves search, image and
//! reindex endpoints until interrupted.

mod handlers;
mod server;

use anyhow::Result;
use clap::Parser;
use shotsearch_core::config::{IndexConfig, NetworkConfig};
use shotsearch_core::{OpenAiClient, ProviderSettings, ShotSearch};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "shotsearch-server")]
#[command(about = "HTTP API for searching screenshots with a vision model")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Directory of screenshots to index
    #[arg(long, env = "SCREENSHOTS_DIR", default_value = IndexConfig::DEFAULT_SCREENSHOTS_DIR)]
    screenshots_dir: PathBuf,

    /// SQLite catalog location
    #[arg(long, env = "SCREENSHOTS_DB", default_value = IndexConfig::DEFAULT_DATABASE_FILE)]
    database: PathBuf,

    /// API key for the vision/chat provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = NetworkConfig::DEFAULT_BASE_URL)]
    base_url: String,

    /// Model used for analysis and ranking
    #[arg(long, env = "OPENAI_MODEL", default_value = NetworkConfig::DEFAULT_MODEL)]
    model: String,

    /// Timeout in seconds for a single model call
    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    /// Concurrent analyzer calls while indexing
    #[arg(long, default_value_t = IndexConfig::DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Do not index on startup
    #[arg(long)]
    skip_startup_index: bool,

    /// Allowed CORS origin (repeatable, "*" for any)
    #[arg(long = "cors-origin", default_values = ["http://localhost:5173", "http://127.0.0.1:5173"])]
    cors_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging; RUST_LOG overrides the flag
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting Screenshot Search API");

    if args.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; analysis and search calls will fail until it is configured");
    }

    let timeout = Duration::from_secs(args.timeout_secs);
    let client = Arc::new(OpenAiClient::new(ProviderSettings {
        api_key: args.api_key,
        base_url: args.base_url,
        model: args.model,
        timeout,
    })?);

    info!("Screenshots directory: {}", args.screenshots_dir.display());
    info!("Catalog: {}", args.database.display());

    let api = ShotSearch::builder(&args.screenshots_dir)
        .database_path(&args.database)
        .with_provider(client)
        .concurrency(args.concurrency)
        .analysis_timeout(timeout)
        .query_timeout(timeout)
        .build()?;

    if !args.skip_startup_index {
        match api.reindex().await {
            Ok(report) => info!("Startup indexing done, {} screenshots in catalog", report.total),
            Err(e) => error!("Startup indexing failed: {}", e),
        }
    }

    let addr = server::start_server(api, &args.host, args.port, &args.cors_origins).await?;

    // Machine-readable port line for wrappers that pass --port 0
    println!("SHOTSEARCH_PORT={}", addr.port());

    info!("Server running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
