//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise falls back to
/// `{bin_name}={default_level},tower_http={default_level}`.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let crate_name = env!("CARGO_CRATE_NAME");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{crate_name}={default_level},{bin_name}={default_level},tower_http={default_level}"
        ))
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
