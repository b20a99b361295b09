//! Message Broker Module
//!
//! RabbitMQ connectivity, the queue registry, fire-and-forget publishing and
//! the consumer loop abstraction.
//!
//! All queues are durable and carry JSON bodies. Each queue has exactly one
//! logical consumer role; the registry of handlers is built at startup (see
//! `application::consumers`).

mod consumer;
mod publisher;

pub use consumer::{run_queue_consumer, QueueHandler};
pub use publisher::{AmqpPublisher, EventPublisher, EventPublisherExt};

use lapin::{Connection, ConnectionProperties};
use std::fmt;
use tracing::info;

use crate::config::BrokerSettings;
use crate::shared::error::AppError;

/// Every queue the system publishes to or consumes from.
///
/// Queue-name drift between services is a silent message black hole, so the
/// names live here once and everything dispatches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Queue {
    ChatRoomCreated,
    ChatRoomDeleted,
    ChatRoomRenamed,
    MemberRemoved,
    MemberLeft,
    UserInvited,
    NewMessage,
    MessageProcessed,
    TranslationRequest,
    TranslationCompleted,
    LanguageChange,
}

impl Queue {
    pub const ALL: [Queue; 11] = [
        Queue::ChatRoomCreated,
        Queue::ChatRoomDeleted,
        Queue::ChatRoomRenamed,
        Queue::MemberRemoved,
        Queue::MemberLeft,
        Queue::UserInvited,
        Queue::NewMessage,
        Queue::MessageProcessed,
        Queue::TranslationRequest,
        Queue::TranslationCompleted,
        Queue::LanguageChange,
    ];

    /// Broker-side queue name.
    pub const fn name(self) -> &'static str {
        match self {
            Queue::ChatRoomCreated => "chat_room_created",
            Queue::ChatRoomDeleted => "chat_room_deleted",
            Queue::ChatRoomRenamed => "chat_room_renamed",
            Queue::MemberRemoved => "member_removed",
            Queue::MemberLeft => "member_left",
            Queue::UserInvited => "user_invited",
            Queue::NewMessage => "new_message",
            Queue::MessageProcessed => "message_processed",
            Queue::TranslationRequest => "translation_request_queue",
            Queue::TranslationCompleted => "translation_completed_queue",
            Queue::LanguageChange => "language_change_notifications",
        }
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Open a broker connection for a consumer role.
///
/// Publishers do not use this; they open and close their own short-lived
/// connections per send.
pub async fn connect(settings: &BrokerSettings) -> Result<Connection, AppError> {
    let connection = Connection::connect(&settings.url, ConnectionProperties::default()).await?;
    info!("Broker connection established");
    Ok(connection)
}
