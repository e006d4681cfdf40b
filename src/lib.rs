pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use config::Config;

use cli::{Cli, Commands, VoteDirection};
use models::query::MovieQuery;
use state::SharedState;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => run_server(config, prometheus_handle).await,

        Commands::Search { query, page } => cmd_search(config, &query.join(" "), page).await,

        Commands::Lookup { imdb_id } => cmd_lookup(config, &imdb_id).await,

        Commands::Vote { imdb_id, direction } => cmd_vote(config, &imdb_id, direction).await,

        Commands::Init => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Votarr v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("Web API running at http://{addr}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}

async fn cmd_search(config: Config, term: &str, page: Option<u32>) -> anyhow::Result<()> {
    println!("Searching for: {term}");

    let state = SharedState::new(config).await?;
    let payload = state
        .enricher
        .resolve(&MovieQuery::by_title(term, page))
        .await?;

    let Some(entries) = payload.get("Search").and_then(Value::as_array) else {
        // Error envelopes and single-title payloads print as raw JSON.
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    };

    println!();
    println!("Search Results:");
    println!("{:-<60}", "");

    for entry in entries.iter().take(constants::limits::MAX_CLI_RESULTS) {
        let title = entry.get("Title").and_then(Value::as_str).unwrap_or("?");
        let year = entry.get("Year").and_then(Value::as_str).unwrap_or("?");
        let id = entry.get("imdbID").and_then(Value::as_str).unwrap_or("?");
        let count = entry.get("count").and_then(Value::as_i64).unwrap_or(0);

        println!("• {title} ({year})");
        println!("  ID: {id} | Votes: {count}");
        println!();
    }

    if entries.len() > constants::limits::MAX_CLI_RESULTS {
        println!(
            "... and {} more on this page",
            entries.len() - constants::limits::MAX_CLI_RESULTS
        );
    }

    Ok(())
}

async fn cmd_lookup(config: Config, imdb_id: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let payload = state.enricher.resolve(&MovieQuery::by_id(imdb_id)).await?;

    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

async fn cmd_vote(config: Config, imdb_id: &str, direction: VoteDirection) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let row = state.votes.cast(imdb_id, direction.delta()).await?;

    println!("✓ Vote recorded for {}: count now {}", row.imdb_id, row.count);

    Ok(())
}
