//! WebSocket Message Types
//!
//! Client-to-server wire frames. Server-to-client frames are the
//! [`ServerEvent`](crate::application::realtime::ServerEvent) enum, shared
//! with the broadcast seam.

use serde::Deserialize;

/// Inbound chat frame: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub message: String,
}
