//! WebSocket collaboration server implementation.

pub mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{DEFAULT_SWEEP_INTERVAL, run_server};
