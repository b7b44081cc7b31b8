//! Housing App Server Binary
//!
//! Caching, ranking front for the data server.

use std::sync::Arc;
use clap::Parser;
use housing::backend::TcpBackend;
use housing::config::{DEFAULT_APP_ADDR, DEFAULT_DATA_ADDR};
use housing::network::Server;
use housing::{Config, Router};
use tracing_subscriber::{fmt, EnvFilter};

/// Housing App Server
#[derive(Parser, Debug)]
#[command(name = "housing-app-server")]
#[command(about = "Application tier: caches and ranks listing queries")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = DEFAULT_APP_ADDR)]
    listen: String,

    /// Data server address (host:port)
    #[arg(short, long, default_value = DEFAULT_DATA_ADDR)]
    backend: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Data server round trip timeout in milliseconds (0 = none)
    #[arg(short = 't', long, default_value = "5000")]
    backend_timeout_ms: u64,

    /// Idle client timeout in milliseconds (0 = none)
    #[arg(short = 'i', long, default_value = "300000")]
    idle_timeout_ms: u64,
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

    tracing::info!("Housing App Server v{}", housing::VERSION);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Data server: {}", args.backend);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .backend_addr(&args.backend)
        .max_connections(args.max_connections)
        .backend_timeout_ms(args.backend_timeout_ms)
        .read_timeout_ms(args.idle_timeout_ms)
        .build();

    let backend = Arc::new(TcpBackend::new(
        config.backend_addr.clone(),
        config.backend_timeout(),
    ));
    let router = Arc::new(Router::new(backend));
    let mut server = Server::new(config, Arc::clone(&router));

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

    let stats = router.cache().stats();
    tracing::info!(
        "App server stopped (cache: {} entries, {} hits, {} misses)",
        stats.entries,
        stats.hits,
        stats.misses
    );
}
