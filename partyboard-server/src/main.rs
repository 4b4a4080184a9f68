//! Party Board Server
//!
//! Keeps a live, filterable board of party listings in sync with the
//! listing backend and serves it to the presentation layer.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use partyboard_core::config::ConfigStore;
use partyboard_core::events::store_command_channel;
use partyboard_core::processors::{
    IngestionPipeline, ListingPoster, PostBackend, StoreWriter, Synchronizer,
};
use partyboard_core::store::ListingStore;
use partyboard_core::transport::WebSocketEventChannel;
use partyboard_sdk::client::{BoardClient, FeedClient};
use server::{build_router, run_server};
use shutdown::{shutdown_signal, spawn_config_reload_handler};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Party Board - live listing board for party finding
#[derive(Parser, Debug)]
#[command(name = "partyboard-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        env = "PARTYBOARD_CONFIG",
        default_value = "./partyboard.toml"
    )]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.json_logs);

    tracing::info!("Starting partyboard-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let listen_addr = loaded_config.server.listen;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    // Store and its single writer
    let store = ListingStore::new();
    let (command_tx, command_rx) = store_command_channel();
    let writer = StoreWriter::new(store.clone(), loaded_config.retention);
    let writer_handle = tokio::spawn(writer.run(shutdown_rx.clone(), command_rx));

    // Synchronizer: snapshot + push events
    let board_client = BoardClient::new(loaded_config.backend.base_url.clone());
    tracing::info!(
        base_url = %board_client.base_url(),
        events_url = %loaded_config.backend.events_url,
        "Synchronizing with listing backend"
    );
    let synchronizer = Synchronizer::new(
        board_client.clone(),
        WebSocketEventChannel::new(loaded_config.backend.events_url.clone()),
        command_tx.clone(),
        loaded_config.sync.clone(),
    );
    let sync_status = synchronizer.status();
    let sync_handle = tokio::spawn(synchronizer.run(shutdown_rx.clone()));

    // Ingestion pipeline (optional)
    let ingestion_settings = ConfigStore::new(
        loaded_config
            .ingestion
            .as_ref()
            .map(|i| i.settings)
            .unwrap_or_default(),
    );
    let (feed, ingestion_handle) = match loaded_config.ingestion {
        Some(ingestion) => {
            tracing::info!(feed_url = %ingestion.feed_url, "Ingestion enabled");
            let pipeline = IngestionPipeline::new(
                FeedClient::new(ingestion.feed_url),
                ingestion.seen_capacity,
                ingestion.settings.feed_capacity,
            );
            let reader = pipeline.reader();
            let handle =
                tokio::spawn(pipeline.run(shutdown_rx.clone(), ingestion_settings.clone()));
            (Some(reader), Some(handle))
        }
        None => {
            tracing::info!("Ingestion disabled");
            (None, None)
        }
    };

    // Create application state
    let backend: Box<dyn PostBackend> = Box::new(board_client);
    let poster = ListingPoster::new(backend, command_tx);
    let state = AppState::new(store.reader(), feed, poster, sync_status);

    // Spawn config reload handler (listens for SIGHUP)
    let reload_notify = spawn_config_reload_handler(config_loader, ingestion_settings);

    // Build the router
    let router = build_router(state);

    // Run the server; a shutdown signal also stops every processor
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let signal_tx = Arc::clone(&shutdown_tx);
    let result = run_server(router, listen_addr, async move {
        shutdown_signal().await;
        signal_tx.send_replace(true);
    })
    .await;

    // Make sure processors stop even if the server failed to start
    shutdown_tx.send_replace(true);
    reload_notify.notify_one();

    tracing::info!("Waiting for processors to stop...");
    let _ = sync_handle.await;
    if let Some(handle) = ingestion_handle {
        let _ = handle.await;
    }
    let _ = writer_handle.await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
