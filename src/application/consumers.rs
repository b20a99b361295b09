//! Chat-Server Queue Consumers
//!
//! Handlers for the queues the chat server itself consumes, plus the
//! registration table built at startup. Dispatch is tagged-variant: each
//! queue maps to exactly one handler, and the translation request queue is
//! deliberately absent here — its one consumer role belongs to the worker
//! process, and a second consumer would steal its deliveries.

use std::sync::Arc;

use async_trait::async_trait;
use lapin::Connection;
use tracing::{error, info};

use super::realtime::{groups, Broadcaster, ServerEvent};
use super::translation_flow::CorrelationTracker;
use crate::domain::events::{LanguageChanged, TranslationCompleted};
use crate::domain::MessageRepository;
use crate::infrastructure::broker::{run_queue_consumer, Queue, QueueHandler};
use crate::infrastructure::cache::wants_translation;
use crate::shared::error::AppError;

/// Forwards worker responses to their member's realtime group.
///
/// This is the delivery path for translations nobody is actively waiting on,
/// backlog re-translations above all. For live messages it can race the
/// in-process waiter and deliver a duplicate update; consumers treat that as
/// a redundant notification.
pub struct TranslationCompletedHandler {
    broadcaster: Arc<dyn Broadcaster>,
}

impl TranslationCompletedHandler {
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { broadcaster }
    }
}

#[async_trait]
impl QueueHandler for TranslationCompletedHandler {
    async fn handle(&self, body: &[u8]) -> Result<(), AppError> {
        let event: TranslationCompleted = serde_json::from_slice(body)?;

        info!(
            correlation_id = %event.correlation_id,
            room_id = event.room_id,
            user_id = event.user_id,
            "Translation completed event received"
        );

        self.broadcaster.send_to_group(
            &groups::user_room(event.user_id, event.room_id),
            ServerEvent::TranslationUpdate {
                message_id: event.message_id,
                message: event.translated_text,
            },
        );

        Ok(())
    }
}

/// Re-translates a room's backlog after a member changes their preference.
///
/// Publishes one translation request per stored message; the completed events
/// flow back through [`TranslationCompletedHandler`]. The member's own
/// messages are skipped — nobody gets a translated echo of themselves.
pub struct LanguageChangeHandler {
    messages: Arc<dyn MessageRepository>,
    tracker: Arc<CorrelationTracker>,
}

impl LanguageChangeHandler {
    pub fn new(messages: Arc<dyn MessageRepository>, tracker: Arc<CorrelationTracker>) -> Self {
        Self { messages, tracker }
    }
}

#[async_trait]
impl QueueHandler for LanguageChangeHandler {
    async fn handle(&self, body: &[u8]) -> Result<(), AppError> {
        let event: LanguageChanged = serde_json::from_slice(body)?;

        if !wants_translation(&event.language_code) {
            // Back to untranslated delivery; nothing to re-render.
            return Ok(());
        }

        let backlog = self.messages.list_by_room(event.room_id).await?;
        let count = backlog.len();

        for message in backlog {
            if message.sender_id == event.user_id {
                continue;
            }
            self.tracker
                .request(
                    event.room_id,
                    event.user_id,
                    message.id,
                    &message.content,
                    &event.language_code,
                )
                .await;
        }

        info!(
            user_id = event.user_id,
            room_id = event.room_id,
            language = %event.language_code,
            backlog = count,
            "Backlog re-translation requested"
        );

        Ok(())
    }
}

/// Log-and-ack handler for queues with no special behavior on this side.
///
/// Still validates the body as JSON so malformed traffic is surfaced and
/// dropped instead of silently acknowledged.
pub struct AuditHandler {
    queue: Queue,
}

impl AuditHandler {
    pub fn new(queue: Queue) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl QueueHandler for AuditHandler {
    async fn handle(&self, body: &[u8]) -> Result<(), AppError> {
        let payload: serde_json::Value = serde_json::from_slice(body)?;
        info!(queue = %self.queue, payload = %payload, "Event received");
        Ok(())
    }
}

/// Build the queue → handler table for the chat server process.
pub fn build_registry(
    broadcaster: Arc<dyn Broadcaster>,
    messages: Arc<dyn MessageRepository>,
    tracker: Arc<CorrelationTracker>,
) -> Vec<(Queue, Arc<dyn QueueHandler>)> {
    let mut registry: Vec<(Queue, Arc<dyn QueueHandler>)> = vec![
        (
            Queue::TranslationCompleted,
            Arc::new(TranslationCompletedHandler::new(broadcaster)),
        ),
        (
            Queue::LanguageChange,
            Arc::new(LanguageChangeHandler::new(messages, tracker)),
        ),
    ];

    for queue in [
        Queue::ChatRoomCreated,
        Queue::ChatRoomDeleted,
        Queue::ChatRoomRenamed,
        Queue::MemberRemoved,
        Queue::MemberLeft,
        Queue::UserInvited,
        Queue::NewMessage,
        Queue::MessageProcessed,
    ] {
        registry.push((queue, Arc::new(AuditHandler::new(queue))));
    }

    registry
}

/// Spawn one consumer loop per registry entry on a shared connection.
pub fn spawn_consumers(
    connection: Arc<Connection>,
    registry: Vec<(Queue, Arc<dyn QueueHandler>)>,
) {
    for (queue, handler) in registry {
        let connection = Arc::clone(&connection);
        tokio::spawn(async move {
            if let Err(e) = run_queue_consumer(&connection, queue, handler).await {
                error!(queue = %queue, error = %e, "Consumer loop terminated");
            }
        });
    }
}
