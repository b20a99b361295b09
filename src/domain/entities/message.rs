//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A chat message persisted for a room.
///
/// Message content is stored exactly as the sender wrote it; translated
/// renditions are transient and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to persist a new message; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub room_id: i64,
    pub sender_id: i64,
    pub content: String,
}

/// Repository trait for message data access.
///
/// Implemented in the infrastructure layer (PostgreSQL).
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message and return it with its assigned id.
    async fn insert(&self, message: NewMessage) -> Result<Message, AppError>;

    /// All messages of a room, oldest first. Used for backlog re-translation
    /// after a language preference change.
    async fn list_by_room(&self, room_id: i64) -> Result<Vec<Message>, AppError>;
}
