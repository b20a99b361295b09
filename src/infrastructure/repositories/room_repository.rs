//! Room Repository Implementation
//!
//! PostgreSQL implementation of the RoomRepository trait. Loads the room row
//! together with its member id list, since fan-out always needs both.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{ChatRoom, RoomRepository};
use crate::shared::error::AppError;

/// PostgreSQL room repository implementation.
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Creates a new PgRoomRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of the chat_rooms table.
#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: i64,
    name: String,
    admin_id: i64,
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn find_by_id(&self, room_id: i64) -> Result<Option<ChatRoom>, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT id, name, admin_id
            FROM chat_rooms
            WHERE id = $1
            "#,
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let member_ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT user_id FROM room_members
            WHERE room_id = $1
            ORDER BY user_id
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ChatRoom {
            id: row.id,
            name: row.name,
            admin_id: row.admin_id,
            member_ids,
        }))
    }
}
