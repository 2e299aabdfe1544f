//! Server runner: router assembly, background sweep, graceful shutdown.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::registry::InMemorySessionRegistry,
    ui::{handler, signal, state::AppState},
    usecase::SweepRoomsUseCase,
};

/// Default interval between stale-room sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Run the collaboration server until shutdown is requested.
///
/// Binds the listener, spawns the periodic sweep task and serves until
/// SIGINT/SIGTERM; in-flight connections are given the chance to finish.
pub async fn run_server(
    host: &str,
    port: u16,
    sweep_interval: Duration,
) -> Result<(), std::io::Error> {
    let registry = Arc::new(InMemorySessionRegistry::new());
    let state = Arc::new(AppState::new(registry.clone()));

    spawn_sweep_task(registry, sweep_interval);

    let app = Router::new()
        .route("/api/health", get(handler::health_check))
        .route(
            "/api/rooms",
            post(handler::create_room).get(handler::get_rooms),
        )
        .route("/api/rooms/{room_id}", get(handler::get_room_detail))
        .route("/ws", get(handler::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(signal::shutdown_signal())
        .await
}

/// Spawn the periodic stale-room sweep.
fn spawn_sweep_task(registry: Arc<InMemorySessionRegistry>, sweep_interval: Duration) {
    let sweep_usecase = SweepRoomsUseCase::new(registry);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        // The first tick fires immediately; a sweep at startup is pointless
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = sweep_usecase.execute().await;
            tracing::debug!("Periodic sweep finished ({} room(s) removed)", removed);
        }
    });
}
