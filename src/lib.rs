//! Real-time collaborative code session server.
//!
//! This library implements a lightweight multiplayer editing backend:
//! small rooms (up to 4 participants) jointly editing shared code and
//! cursor state over WebSocket connections, with last-writer-wins
//! semantics on the shared document.

pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod logger;
pub mod ui;
pub mod usecase;

// Re-export entry point
pub use ui::run_server;
