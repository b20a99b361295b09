//! Translation Worker
//!
//! Consumer-side processing of `translation_request_queue`. One request in
//! flight at a time (the loop pins prefetch to 1); each request is translated,
//! its result slot written, and a completed event published before the ack.
//!
//! The provider seam is infallible, so a dead provider still produces a
//! completed event carrying the original text. Only infrastructure failures
//! (result store, decode) reject the delivery, and rejections never requeue.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::events::{TranslationCompleted, TranslationRequested};
use crate::infrastructure::broker::{EventPublisher, EventPublisherExt, Queue, QueueHandler};
use crate::infrastructure::cache::ResultStore;
use crate::infrastructure::translator::Translator;
use crate::shared::error::AppError;

/// Handler for translation requests.
pub struct TranslationWorker {
    translator: Arc<dyn Translator>,
    results: Arc<dyn ResultStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl TranslationWorker {
    pub fn new(
        translator: Arc<dyn Translator>,
        results: Arc<dyn ResultStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            translator,
            results,
            publisher,
        }
    }
}

#[async_trait]
impl QueueHandler for TranslationWorker {
    async fn handle(&self, body: &[u8]) -> Result<(), AppError> {
        let request: TranslationRequested = serde_json::from_slice(body)?;

        info!(
            correlation_id = %request.correlation_id,
            room_id = request.room_id,
            user_id = request.user_id,
            lang = %request.lang,
            "Translation request received"
        );

        let translated_text = self
            .translator
            .translate(&request.text, &request.lang)
            .await;

        // The waiting requester polls this slot; write it before the event so
        // a fast consumer never sees the event ahead of the slot.
        self.results
            .put(&request.correlation_id, &translated_text)
            .await?;

        self.publisher
            .publish_event(
                Queue::TranslationCompleted,
                &TranslationCompleted {
                    correlation_id: request.correlation_id.clone(),
                    room_id: request.room_id,
                    user_id: request.user_id,
                    message_id: request.message_id,
                    translated_text,
                },
            )
            .await;

        Ok(())
    }
}
