//! memkv Server Binary
//!
//! Starts the TCP server for memkv.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use memkv::network::Server;
use memkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// memkv Server
#[derive(Parser, Debug)]
#[command(name = "memkv-server")]
#[command(about = "In-memory key-value store with TTLs, transactions and snapshots")]
#[command(version)]
struct Args {
    /// Data directory (holds the snapshot file)
    #[arg(short, long, default_value = ".")]
    data_dir: String,

    /// Snapshot file name inside the data directory
    #[arg(short, long, default_value = "MemStore")]
    snapshot_file: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Skip the expiration sweep before each accept
    #[arg(long)]
    no_sweep_on_accept: bool,

    /// Skip the snapshot after each accepted connection
    #[arg(long)]
    no_snapshot_on_accept: bool,

    /// Also sweep expired keys every N seconds (0 = off)
    #[arg(long, default_value = "0")]
    sweep_interval_secs: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,memkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("memkv server v{}", memkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let sweep_interval = match args.sweep_interval_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .snapshot_file(&args.snapshot_file)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .sweep_on_accept(!args.no_sweep_on_accept)
        .snapshot_on_accept(!args.no_snapshot_on_accept)
        .sweep_interval(sweep_interval)
        .build();

    // Open engine (loads the snapshot if present)
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(keys = engine.store().len(), "Engine initialized successfully");

    // Start server
    let mut server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
