//! Language Preference Service
//!
//! Wraps the preference store with the change-notification side effect: every
//! successful `set` publishes a `language_change_notifications` event so the
//! backlog re-translation listener can react.

use std::sync::Arc;

use tracing::info;

use crate::domain::events::LanguageChanged;
use crate::infrastructure::broker::{EventPublisher, EventPublisherExt, Queue};
use crate::infrastructure::cache::PreferenceStore;
use crate::shared::error::AppError;

/// Preference reads and writes, with write notifications.
pub struct LanguagePreferenceService {
    store: Arc<dyn PreferenceStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl LanguagePreferenceService {
    pub fn new(store: Arc<dyn PreferenceStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }

    /// Current preference; the sentinel when unset.
    pub async fn get(&self, user_id: i64, room_id: i64) -> String {
        self.store.get(user_id, room_id).await
    }

    /// Overwrite the preference and notify listeners.
    ///
    /// Last writer wins; the notification is fire-and-forget, so a broker
    /// outage loses the backlog re-translation but never the preference itself.
    pub async fn set(
        &self,
        user_id: i64,
        room_id: i64,
        language_code: &str,
    ) -> Result<(), AppError> {
        self.store.set(user_id, room_id, language_code).await?;

        info!(user_id, room_id, language = %language_code, "Language preference updated");

        self.publisher
            .publish_event(
                Queue::LanguageChange,
                &LanguageChanged {
                    user_id,
                    room_id,
                    language_code: language_code.to_string(),
                },
            )
            .await;

        Ok(())
    }
}
