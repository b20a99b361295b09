//! Chat room entity and repository trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A chat room membership snapshot.
///
/// The dispatch core only reads membership to decide fan-out targets; all
/// mutation goes through the room CRUD surface, which lives outside this crate's
/// hot path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: i64,
    pub name: String,
    pub admin_id: i64,
    pub member_ids: Vec<i64>,
}

impl ChatRoom {
    /// Whether the given user belongs to this room.
    pub fn has_member(&self, user_id: i64) -> bool {
        self.member_ids.contains(&user_id)
    }

    /// Members other than `sender_id`, i.e. the translation fan-out targets.
    pub fn recipients_excluding(&self, sender_id: i64) -> impl Iterator<Item = i64> + '_ {
        self.member_ids
            .iter()
            .copied()
            .filter(move |id| *id != sender_id)
    }
}

/// Repository trait for room data access.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Load a room with its member id list.
    async fn find_by_id(&self, room_id: i64) -> Result<Option<ChatRoom>, AppError>;
}
