//! Translation worker handler tests.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use polychat::application::TranslationWorker;
use polychat::config::TranslatorSettings;
use polychat::domain::events::{TranslationCompleted, TranslationRequested};
use polychat::infrastructure::broker::{Queue, QueueHandler};
use polychat::infrastructure::cache::ResultStore;
use polychat::infrastructure::translator::AzureTranslator;

use crate::common::{MarkingTranslator, MemoryResultStore, RecordingPublisher};

fn request(correlation_id: &str) -> Vec<u8> {
    serde_json::to_vec(&TranslationRequested {
        correlation_id: correlation_id.into(),
        room_id: 5,
        user_id: 2,
        message_id: 9,
        text: "hello".into(),
        lang: "es".into(),
    })
    .unwrap()
}

#[tokio::test]
async fn a_request_is_translated_stored_and_announced() {
    let results = Arc::new(MemoryResultStore::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let worker = TranslationWorker::new(
        Arc::new(MarkingTranslator),
        results.clone(),
        publisher.clone(),
    );

    let outcome = worker.handle(&request("cid-9")).await;

    assert!(outcome.is_ok());

    // Result slot written for the polling requester.
    assert_eq!(results.take("cid-9").await.unwrap(), Some("es:hello".into()));

    // Completed event published for the realtime broadcaster.
    let completed = publisher.published_to(Queue::TranslationCompleted);
    assert_eq!(completed.len(), 1);
    let event: TranslationCompleted = serde_json::from_value(completed[0].clone()).unwrap();
    assert_eq!(
        event,
        TranslationCompleted {
            correlation_id: "cid-9".into(),
            room_id: 5,
            user_id: 2,
            message_id: 9,
            translated_text: "es:hello".into(),
        }
    );
}

#[tokio::test]
async fn an_unreachable_provider_still_completes_with_the_original_text() {
    let results = Arc::new(MemoryResultStore::default());
    let publisher = Arc::new(RecordingPublisher::default());
    // Real provider client pointed at a closed port: every call fails fast.
    let translator = Arc::new(AzureTranslator::new(&TranslatorSettings {
        endpoint: "http://127.0.0.1:1".into(),
        key: "k".into(),
        region: "r".into(),
        request_timeout_secs: 1,
    }));
    let worker = TranslationWorker::new(translator, results.clone(), publisher.clone());

    let outcome = worker.handle(&request("cid-down")).await;

    // Still acked: provider failure is degradation, not an error.
    assert!(outcome.is_ok());
    assert_eq!(results.take("cid-down").await.unwrap(), Some("hello".into()));

    let completed = publisher.published_to(Queue::TranslationCompleted);
    let event: TranslationCompleted = serde_json::from_value(completed[0].clone()).unwrap();
    assert_eq!(event.translated_text, "hello");
}

#[tokio::test]
async fn malformed_payloads_are_rejected() {
    let results = Arc::new(MemoryResultStore::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let worker = TranslationWorker::new(Arc::new(MarkingTranslator), results, publisher.clone());

    let outcome = worker.handle(b"not json at all").await;

    assert!(outcome.is_err());
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let results = Arc::new(MemoryResultStore::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let worker = TranslationWorker::new(Arc::new(MarkingTranslator), results, publisher.clone());

    let outcome = worker.handle(br#"{"text": "hello"}"#).await;

    assert!(outcome.is_err());
    assert!(publisher.published().is_empty());
}
