//! Chat Message Flow
//!
//! The intake path for a live message: persist it, announce it, broadcast the
//! original text to the room, then fan out per-member translation work.
//!
//! Ordering policy: the sender always reads their own text verbatim, so the
//! room-wide broadcast goes out before any translation is even requested, and
//! the sender is excluded from fan-out unconditionally. Per-member translated
//! deliveries arrive later and independently; cross-member ordering across
//! languages is explicitly not guaranteed.

use std::sync::Arc;

use tracing::{info, warn};

use super::realtime::{groups, Broadcaster, ServerEvent};
use super::translation_flow::CorrelationTracker;
use crate::domain::events::NewMessagePosted;
use crate::domain::{MessageRepository, NewMessage, RoomRepository};
use crate::infrastructure::broker::{EventPublisher, EventPublisherExt, Queue};
use crate::infrastructure::cache::{wants_translation, PreferenceStore};
use crate::shared::auth::AuthenticatedUser;
use crate::shared::error::AppError;

/// Orchestrates intake of one inbound chat message.
pub struct MessageFlow {
    messages: Arc<dyn MessageRepository>,
    rooms: Arc<dyn RoomRepository>,
    publisher: Arc<dyn EventPublisher>,
    preferences: Arc<dyn PreferenceStore>,
    tracker: Arc<CorrelationTracker>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl MessageFlow {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        rooms: Arc<dyn RoomRepository>,
        publisher: Arc<dyn EventPublisher>,
        preferences: Arc<dyn PreferenceStore>,
        tracker: Arc<CorrelationTracker>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            messages,
            rooms,
            publisher,
            preferences,
            tracker,
            broadcaster,
        }
    }

    /// Handle one inbound text frame from a connected member.
    ///
    /// Empty content is rejected without error. Persistence failures propagate;
    /// everything after persistence is best-effort and must not fail the
    /// sender's path.
    pub async fn handle_inbound(
        &self,
        sender: &AuthenticatedUser,
        room_id: i64,
        content: &str,
    ) -> Result<(), AppError> {
        let content = content.trim();
        if content.is_empty() {
            warn!(user_id = sender.id, room_id, "Empty message rejected");
            return Ok(());
        }

        let message = self
            .messages
            .insert(NewMessage {
                room_id,
                sender_id: sender.id,
                content: content.to_string(),
            })
            .await?;

        info!(
            message_id = message.id,
            user_id = sender.id,
            room_id,
            "Message saved"
        );

        self.publisher
            .publish_event(
                Queue::NewMessage,
                &NewMessagePosted {
                    message_id: message.id,
                    room_id,
                    sender_id: sender.id,
                    content: message.content.clone(),
                },
            )
            .await;

        // Room-wide broadcast first: every member, sender included, sees the
        // original text immediately.
        self.broadcaster.send_to_group(
            &groups::room(room_id),
            ServerEvent::ChatMessage {
                message: message.content.clone(),
                user_id: sender.id,
                username: sender.username.clone(),
            },
        );

        self.fan_out_translations(sender.id, room_id, message.id, &message.content)
            .await;

        Ok(())
    }

    /// Spawn one detached translation wait per member who asked for one.
    ///
    /// Detached so a slow provider never blocks the intake loop; each task
    /// delivers to its member's own group whenever it finishes, translated or
    /// fallen back.
    async fn fan_out_translations(
        &self,
        sender_id: i64,
        room_id: i64,
        message_id: i64,
        content: &str,
    ) {
        let room = match self.rooms.find_by_id(room_id).await {
            Ok(Some(room)) => room,
            Ok(None) => {
                warn!(room_id, "Room vanished before fan-out");
                return;
            }
            Err(e) => {
                warn!(room_id, error = %e, "Membership lookup failed; skipping fan-out");
                return;
            }
        };

        for member_id in room.recipients_excluding(sender_id) {
            let lang = self.preferences.get(member_id, room_id).await;
            if !wants_translation(&lang) {
                continue;
            }

            let tracker = Arc::clone(&self.tracker);
            let broadcaster = Arc::clone(&self.broadcaster);
            let content = content.to_string();

            tokio::spawn(async move {
                let text = tracker
                    .translate(room_id, member_id, message_id, &content, &lang)
                    .await;
                broadcaster.send_to_group(
                    &groups::user_room(member_id, room_id),
                    ServerEvent::TranslationUpdate {
                        message_id,
                        message: text,
                    },
                );
            });
        }
    }
}
