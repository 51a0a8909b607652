//! IoT House Server Binary
//!
//! Starts the TCP server for the simulated house.

use std::sync::Arc;
use clap::Parser;
use iothouse::network::Server;
use iothouse::{Config, House};
use tracing_subscriber::{fmt, EnvFilter};

/// IoT House Server
#[derive(Parser, Debug)]
#[command(name = "iothouse-server")]
#[command(about = "Simulated smart house speaking the IoT house protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:5050")]
    listen: String,

    /// Maximum concurrent connections (1 serves one client at a time)
    #[arg(short, long, default_value = "16")]
    max_connections: usize,

    /// Largest accepted frame in bytes
    #[arg(long, default_value = "1024")]
    max_frame_size: usize,

    /// Idle read timeout per connection in milliseconds (0 disables)
    #[arg(long, default_value = "30000")]
    read_timeout_ms: u64,

    /// Initial temperature reading
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    temperature: i32,

    /// Initial humidity reading
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    humidity: i32,

    /// Start with the proximity sensor triggered
    #[arg(long)]
    proximity: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,iothouse=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("IoT House Server v{}", iothouse::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .max_frame_size(args.max_frame_size)
        .read_timeout_ms(args.read_timeout_ms)
        .initial_temperature(args.temperature)
        .initial_humidity(args.humidity)
        .initial_proximity(args.proximity)
        .build();

    let house = Arc::new(House::from_config(&config));

    let server = match Server::bind(config, house) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received shutdown signal, stopping...");
        shutdown.shutdown();
    }) {
        tracing::warn!("Could not install signal handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
