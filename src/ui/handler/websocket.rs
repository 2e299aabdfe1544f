//! WebSocket connection handlers.
//!
//! A connection moves through three phases:
//!
//! 1. awaiting-join: the first text frame must be a `join` message carrying
//!    the user's identity and the join link;
//! 2. active: `code_update`, `cursor_update`, `observe` and `ping` frames
//!    are dispatched to their use cases;
//! 3. closed: whichever way the connection ends (close frame, read error,
//!    repeated protocol violations), the participant is removed exactly once.
//!
//! All outbound traffic goes through this connection's mpsc channel; a
//! dedicated forwarding task owns the socket sink. Room broadcasts and this
//! handler's own pong/error frames share the same channel, so per-connection
//! ordering is preserved.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    domain::{CursorPosition, UserId, Username},
    infrastructure::dto::websocket::{ClientMessage, ErrorMessage, PongMessage},
    ui::state::AppState,
    usecase::{
        JoinRoomUseCase, LeaveRoomUseCase, ObserveUseCase, UpdateCodeUseCase, UpdateCursorUseCase,
    },
};

/// Malformed frames tolerated on an active connection before it is closed.
const MAX_PROTOCOL_STRIKES: u32 = 5;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();

    // The channel is created before admission so the registry can push the
    // init snapshot and room broadcasts through it from the first moment.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Forwarding task: sole owner of the socket sink.
    let mut forward_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Phase 1: the first text frame must be a join message.
    let user_id = loop {
        let frame = tokio::select! {
            frame = stream.next() => frame,
            _ = &mut forward_task => {
                // Socket sink died before admission
                return;
            }
        };
        let Some(Ok(msg)) = frame else {
            forward_task.abort();
            return;
        };
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => {
                forward_task.abort();
                return;
            }
            // Protocol ping/pong frames are handled by axum
            _ => continue,
        };

        match try_join(&state, &text, &tx).await {
            Ok(user_id) => break user_id,
            Err(reason) => {
                send_json(&tx, &ErrorMessage::new(reason));
                // Give the forwarding task a chance to flush the error frame
                drop(tx);
                let _ = forward_task.await;
                return;
            }
        }
    };

    tracing::info!("User '{}' joined over websocket", user_id);

    // Phase 2: dispatch frames until the connection ends.
    let registry = state.registry.clone();
    let recv_user_id = user_id.clone();
    let recv_tx = tx.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut strikes: u32 = 0;
        while let Some(msg) = stream.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket read error for '{}': {}", recv_user_id, e);
                    break;
                }
            };

            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => {
                    tracing::debug!("User '{}' requested close", recv_user_id);
                    break;
                }
                _ => continue,
            };

            let parsed = match serde_json::from_str::<ClientMessage>(&text) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("Malformed frame from '{}': {}", recv_user_id, e);
                    send_json(&recv_tx, &ErrorMessage::new("Malformed message"));
                    strikes += 1;
                    if strikes >= MAX_PROTOCOL_STRIKES {
                        tracing::warn!("Closing '{}' after repeated protocol errors", recv_user_id);
                        break;
                    }
                    continue;
                }
            };

            match parsed {
                ClientMessage::Join { .. } => {
                    send_json(&recv_tx, &ErrorMessage::new("Already joined"));
                }
                ClientMessage::CodeUpdate { code, file_path } => {
                    let usecase = UpdateCodeUseCase::new(registry.clone());
                    if let Err(e) = usecase.execute(&recv_user_id, code, file_path).await {
                        send_json(&recv_tx, &ErrorMessage::new(e.to_string()));
                    }
                }
                ClientMessage::CursorUpdate { line, column } => {
                    let usecase = UpdateCursorUseCase::new(registry.clone());
                    let position = CursorPosition::new(line, column);
                    if let Err(e) = usecase.execute(&recv_user_id, position).await {
                        send_json(&recv_tx, &ErrorMessage::new(e.to_string()));
                    }
                }
                ClientMessage::Observe { target_id } => {
                    let target = match target_id.map(UserId::new).transpose() {
                        Ok(target) => target,
                        Err(_) => {
                            send_json(&recv_tx, &ErrorMessage::new("Invalid observation target"));
                            continue;
                        }
                    };
                    let usecase = ObserveUseCase::new(registry.clone());
                    if let Err(e) = usecase.execute(&recv_user_id, target).await {
                        send_json(&recv_tx, &ErrorMessage::new(e.to_string()));
                    }
                }
                ClientMessage::Ping => {
                    send_json(&recv_tx, &PongMessage::new());
                }
            }
        }
    });

    // If either task completes, abort the other
    tokio::select! {
        _ = &mut recv_task => forward_task.abort(),
        _ = &mut forward_task => recv_task.abort(),
    };

    // Phase 3: remove the participant. Exactly-once in the registry, so a
    // racing implicit-disconnect drain is harmless.
    let leave_usecase = LeaveRoomUseCase::new(state.registry.clone());
    if leave_usecase.execute(&user_id).await {
        tracing::info!("User '{}' disconnected and removed from room", user_id);
    }
}

/// Parse and run the admission message. Returns the admitted user id, or a
/// human-readable rejection reason for an error frame.
async fn try_join(
    state: &Arc<AppState>,
    text: &str,
    tx: &mpsc::UnboundedSender<String>,
) -> Result<UserId, String> {
    let ClientMessage::Join {
        user_id,
        username,
        join_link,
    } = serde_json::from_str::<ClientMessage>(text)
        .map_err(|_| "First message must be a join message".to_string())?
    else {
        return Err("First message must be a join message".to_string());
    };

    let user_id = UserId::new(user_id).map_err(|e| e.to_string())?;
    let username = Username::new(username).map_err(|e| e.to_string())?;

    let usecase = JoinRoomUseCase::new(state.registry.clone());
    usecase
        .execute(&join_link, user_id.clone(), username, tx.clone())
        .await
        .map_err(|e| e.to_string())?;

    Ok(user_id)
}

/// Push a serialized frame into this connection's outbound channel.
///
/// A failed push means the forwarding task is gone; the connection is about
/// to be torn down anyway, so the failure is only logged.
fn send_json<T: Serialize>(tx: &mpsc::UnboundedSender<String>, message: &T) {
    match serde_json::to_string(message) {
        Ok(json) => {
            if tx.send(json).is_err() {
                tracing::debug!("Outbound channel closed; dropping frame");
            }
        }
        Err(e) => tracing::warn!("Failed to serialize outbound frame: {}", e),
    }
}
