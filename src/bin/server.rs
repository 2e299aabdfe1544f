//! Real-time collaborative session server.
//!
//! Coordinates small pairing/mobbing rooms over websockets: last-writer-wins
//! shared code state, cursor presence and observation mode.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server -- --port 8080
//! ```

use clap::Parser;

use codepair_rs::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(about = "Collaborative session server")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,

    /// Seconds between stale-room sweeps
    #[arg(long, default_value_t = 3600)]
    sweep_interval_secs: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the server
    if let Err(e) = codepair_rs::run_server(
        &args.host,
        args.port,
        std::time::Duration::from_secs(args.sweep_interval_secs),
    )
    .await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
