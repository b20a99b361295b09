//! Realtime Broadcast Seam
//!
//! Client-bound event frames and the push interface the flows dispatch
//! through. The WebSocket gateway implements [`Broadcaster`]; tests substitute
//! a recording fake.
//!
//! Delivery is push-based and at-most-once: a subscriber that is not
//! registered under the target group key simply misses the event.

use serde::{Deserialize, Serialize};

/// Channel group keys.
///
/// The room-wide group carries original-text chat traffic; translations are
/// personalized, so each member also has a per-room group of their own.
pub mod groups {
    /// Room-wide broadcast group.
    #[inline]
    pub fn room(room_id: i64) -> String {
        format!("chat_{}", room_id)
    }

    /// Per-member, per-room group for personalized deliveries.
    #[inline]
    pub fn user_room(user_id: i64, room_id: i64) -> String {
        format!("user_{}_room_{}", user_id, room_id)
    }
}

/// Events pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A new message, always carrying the original text.
    #[serde(rename = "chat_message")]
    ChatMessage {
        message: String,
        user_id: i64,
        username: String,
    },

    /// A translated rendition of an earlier message, personalized to the
    /// receiving member's language preference.
    #[serde(rename = "translation_update")]
    TranslationUpdate { message_id: i64, message: String },
}

/// Push interface over the connected-subscriber registry.
pub trait Broadcaster: Send + Sync {
    /// Deliver an event to every subscriber of a group. Unknown groups and
    /// closed subscribers are silently skipped.
    fn send_to_group(&self, group: &str, event: ServerEvent);
}
