//! WebSocket Connection Handler
//!
//! Per-connection lifecycle: authenticate, join the room's channel groups,
//! pump inbound frames through the message flow, deregister on close.
//!
//! Unauthenticated upgrades are closed immediately. A disconnect never cancels
//! in-flight translation waits; their results are simply delivered to nobody.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::ClientMessage;
use super::session::SessionState;
use crate::application::realtime::{groups, ServerEvent};
use crate::infrastructure::metrics;
use crate::shared::auth::TokenVerifier;
use crate::startup::AppState;

/// Connection query parameters; the token rides the query string because
/// browsers cannot set WebSocket headers.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// WebSocket upgrade handler for `/ws/chat/{room_id}`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<i64>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, query.token))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, room_id: i64, token: Option<String>) {
    // Connecting: reject before any registration happens.
    let user = match token.as_deref().map(|t| state.verifier.verify(t)) {
        Some(Ok(user)) => user,
        _ => {
            tracing::warn!(room_id, "Rejected unauthenticated WebSocket connection");
            let mut socket = socket;
            let _ = socket.close().await;
            return;
        }
    };

    let session_id = Uuid::new_v4().to_string();
    let session = SessionState::new(session_id.clone(), user, room_id);

    tracing::debug!(
        session_id = %session_id,
        user_id = session.user.id,
        room_id,
        "New WebSocket connection"
    );

    // Split socket for concurrent read/write
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Create channel for outgoing events
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    // Spawn task to forward events from channel to WebSocket
    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Connected: register under the room-wide and the per-member group.
    state.gateway.register_session(&session_id, tx);
    state
        .gateway
        .join_group(&groups::room(room_id), &session_id);
    state.gateway.join_group(
        &groups::user_room(session.user.id, room_id),
        &session_id,
    );

    metrics::WEBSOCKET_CONNECTIONS_ACTIVE.inc();
    tracing::info!(
        user_id = session.user.id,
        username = %session.user.username,
        room_id,
        "User connected"
    );

    // Active: each inbound text frame is one chat message.
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(frame) => {
                    if let Err(e) = state
                        .flow
                        .handle_inbound(&session.user, room_id, &frame.message)
                        .await
                    {
                        tracing::error!(
                            session_id = %session_id,
                            error = %e,
                            "Error handling message"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %session_id,
                        error = %e,
                        body = %text.as_str(),
                        "Malformed client frame"
                    );
                }
            },
            Ok(Message::Close(_)) => {
                tracing::debug!(session_id = %session_id, "Connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    // Disconnecting: both groups; already-gone registrations are no-ops.
    state
        .gateway
        .leave_group(&groups::room(room_id), &session_id);
    state.gateway.leave_group(
        &groups::user_room(session.user.id, room_id),
        &session_id,
    );
    state.gateway.unregister_session(&session_id);

    metrics::WEBSOCKET_CONNECTIONS_ACTIVE.dec();
    sender_task.abort();

    tracing::info!(
        user_id = session.user.id,
        room_id,
        "User disconnected"
    );
}
