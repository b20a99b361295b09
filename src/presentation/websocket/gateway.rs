//! WebSocket Gateway
//!
//! Registry of live connections and their channel-group subscriptions. This
//! is the realtime broadcaster's substrate: pushes address a group key, never
//! a socket, and delivery to any one subscriber is at-most-once.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::realtime::{Broadcaster, ServerEvent};

/// A connected session's outbound channel.
struct ConnectedSession {
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// WebSocket gateway managing all connections.
pub struct Gateway {
    /// Active sessions by session_id
    sessions: DashMap<String, Arc<ConnectedSession>>,
    /// Group key to session IDs mapping
    groups: DashMap<String, Vec<String>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    /// Register a new connected session.
    pub fn register_session(
        &self,
        session_id: impl Into<String>,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        let session_id = session_id.into();
        self.sessions
            .insert(session_id.clone(), Arc::new(ConnectedSession { sender }));

        tracing::debug!(session_id = %session_id, "Session registered");
    }

    /// Remove a session entirely. Group membership is cleaned as a side
    /// effect; a session that never joined anything is fine.
    pub fn unregister_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
        for mut entry in self.groups.iter_mut() {
            entry.value_mut().retain(|s| s != session_id);
        }

        tracing::debug!(session_id = %session_id, "Session unregistered");
    }

    /// Subscribe a session to a group.
    pub fn join_group(&self, group: &str, session_id: &str) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .push(session_id.to_string());
    }

    /// Unsubscribe a session from a group. Missing registration is a no-op.
    pub fn leave_group(&self, group: &str, session_id: &str) {
        if let Some(mut sessions) = self.groups.get_mut(group) {
            sessions.retain(|s| s != session_id);
        }
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Broadcaster for Gateway {
    fn send_to_group(&self, group: &str, event: ServerEvent) {
        let Some(session_ids) = self.groups.get(group) else {
            return;
        };

        for session_id in session_ids.value() {
            if let Some(session) = self.sessions.get(session_id) {
                // A closed receiver means the connection is tearing down;
                // the event is simply missed.
                let _ = session.sender.send(event.clone());
            }
        }
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}
