//! WebSocket Session Management

use crate::shared::auth::AuthenticatedUser;

/// WebSocket session state
#[derive(Debug)]
pub struct SessionState {
    pub session_id: String,
    pub user: AuthenticatedUser,
    pub room_id: i64,
}

impl SessionState {
    pub fn new(session_id: String, user: AuthenticatedUser, room_id: i64) -> Self {
        Self {
            session_id,
            user,
            room_id,
        }
    }
}
