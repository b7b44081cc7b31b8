//! Housing Data Server Binary
//!
//! Loads the listings file and answers RAW_LIST / RAW_SEARCH.

use std::sync::Arc;
use clap::Parser;
use housing::config::{DEFAULT_DATA_ADDR, DEFAULT_DATA_FILE};
use housing::network::Server;
use housing::{Config, DataService, ListingStore};
use tracing_subscriber::{fmt, EnvFilter};

/// Housing Data Server
#[derive(Parser, Debug)]
#[command(name = "housing-data-server")]
#[command(about = "Backend tier: filters the listing set")]
#[command(version)]
struct Args {
    /// Listings JSON file
    #[arg(short, long, default_value = DEFAULT_DATA_FILE)]
    data_file: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = DEFAULT_DATA_ADDR)]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,housing=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Housing Data Server v{}", housing::VERSION);
    tracing::info!("Data file: {}", args.data_file);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_file(&args.data_file)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .build();

    // Listings are required; refuse to start without them
    let store = match ListingStore::load(&config.data_file) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to load listings: {}", e);
            std::process::exit(1);
        }
    };

    let service = Arc::new(DataService::new(store));
    let mut server = Server::new(config, service);

    let handle = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        handle.shutdown();
    }) {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Data server stopped");
}
