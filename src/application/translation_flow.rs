//! Translation Correlation Tracker
//!
//! Links one translation request to its eventual response across the broker
//! hop. A request mints a fresh correlation id, is published fire-and-forget,
//! and a waiter polls the shared result slot until the worker fills it or the
//! wait budget runs out.
//!
//! Expiry is a normal outcome: the waiter falls back to the original text and
//! the member simply reads the message untranslated. The whole wait is one
//! cancellable future, so an abandoned waiter costs nothing; an unclaimed slot
//! dies by store expiry.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::TranslationSettings;
use crate::domain::events::TranslationRequested;
use crate::infrastructure::broker::{EventPublisher, EventPublisherExt, Queue};
use crate::infrastructure::cache::ResultStore;
use crate::infrastructure::metrics;

/// Tracks translation request/response correlation.
pub struct CorrelationTracker {
    publisher: Arc<dyn EventPublisher>,
    results: Arc<dyn ResultStore>,
    poll_interval: Duration,
    wait_budget: Duration,
}

impl CorrelationTracker {
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        results: Arc<dyn ResultStore>,
        settings: &TranslationSettings,
    ) -> Self {
        Self {
            publisher,
            results,
            poll_interval: settings.poll_interval(),
            wait_budget: settings.wait_budget(),
        }
    }

    /// Publish a translation request under a fresh correlation id.
    ///
    /// Returns the id so a waiter can follow up with [`await_result`]. The id
    /// is random and unique per call, so it is never associated with more than
    /// one outstanding request.
    ///
    /// [`await_result`]: CorrelationTracker::await_result
    pub async fn request(
        &self,
        room_id: i64,
        user_id: i64,
        message_id: i64,
        text: &str,
        lang: &str,
    ) -> String {
        let correlation_id = Uuid::new_v4().to_string();

        let event = TranslationRequested {
            correlation_id: correlation_id.clone(),
            room_id,
            user_id,
            message_id,
            text: text.to_string(),
            lang: lang.to_string(),
        };
        self.publisher
            .publish_event(Queue::TranslationRequest, &event)
            .await;

        debug!(
            correlation_id = %correlation_id,
            room_id,
            user_id,
            lang = %lang,
            "Translation requested"
        );

        correlation_id
    }

    /// Wait for the result slot of a correlation id.
    ///
    /// Polls the shared store at the configured interval inside one overall
    /// timeout. Resolution consumes the slot, so a second wait on the same id
    /// always expires. Returns `None` when the budget runs out.
    pub async fn await_result(&self, correlation_id: &str) -> Option<String> {
        let poll = async {
            let mut ticks = tokio::time::interval(self.poll_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                match self.results.take(correlation_id).await {
                    Ok(Some(text)) => return text,
                    Ok(None) => {}
                    Err(e) => {
                        // Store hiccups look like misses; the budget still bounds us.
                        warn!(correlation_id = %correlation_id, error = %e, "Result poll failed");
                    }
                }
            }
        };

        match tokio::time::timeout(self.wait_budget, poll).await {
            Ok(text) => {
                metrics::CORRELATION_WAITS.with_label_values(&["resolved"]).inc();
                Some(text)
            }
            Err(_) => {
                metrics::CORRELATION_WAITS.with_label_values(&["expired"]).inc();
                debug!(correlation_id = %correlation_id, "Translation wait expired");
                None
            }
        }
    }

    /// Request a translation and wait for it, falling back to the original
    /// text when no response arrives in time.
    pub async fn translate(
        &self,
        room_id: i64,
        user_id: i64,
        message_id: i64,
        text: &str,
        lang: &str,
    ) -> String {
        let correlation_id = self.request(room_id, user_id, message_id, text, lang).await;
        match self.await_result(&correlation_id).await {
            Some(translated) => translated,
            None => text.to_string(),
        }
    }
}
