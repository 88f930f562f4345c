//! WebSocket handler for hot reload.
//!
//! Forwards reload events to connected pages. The page reloads on any
//! message, so the payload is informational.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use preview_reload::protocol::SUBPROTOCOL;
use tokio::sync::broadcast;

use super::manager::{ReloadEvent, ReloadHandle};
use crate::state::AppState;

/// Handle WebSocket upgrade for hot reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(hot_reload) = &state.hot_reload else {
        return StatusCode::NOT_FOUND.into_response();
    };

    // Subscribe before the handshake completes so no event slips between
    // the client's open and the first receive.
    let receiver = hot_reload.handle.subscribe();
    let handle = hot_reload.handle.clone();

    ws.protocols([SUBPROTOCOL])
        .on_upgrade(move |socket| handle_socket(socket, receiver, handle))
}

/// Handle an established WebSocket connection.
async fn handle_socket(
    mut socket: WebSocket,
    mut receiver: broadcast::Receiver<ReloadEvent>,
    handle: ReloadHandle,
) {
    let _client = handle.client_connected();
    tracing::debug!("Hot reload client connected");

    loop {
        tokio::select! {
            result = receiver.recv() => {
                match result {
                    Ok(event) => {
                        let Ok(msg) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if socket.send(Message::Text(msg.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Hot reload client lagged");
                    }
                }
            }
            // The page only ever closes; anything else is ignored.
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!("Hot reload client disconnected");
}
