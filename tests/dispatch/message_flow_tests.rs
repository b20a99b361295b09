//! Message intake and fan-out scenario tests.
//!
//! Wired against the real gateway with channel-backed sessions, so the
//! assertions read exactly like the delivery guarantees: who got which event,
//! in which order.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use polychat::application::realtime::{groups, ServerEvent};
use polychat::application::{CorrelationTracker, MessageFlow};
use polychat::domain::events::{NewMessagePosted, TranslationRequested};
use polychat::domain::ChatRoom;
use polychat::infrastructure::broker::{EventPublisher, Queue};
use polychat::infrastructure::cache::{PreferenceStore, ResultStore};
use polychat::presentation::websocket::Gateway;

use crate::common::{
    fast_translation_settings, user, LoopbackWorkerPublisher, MemoryMessageRepository,
    MemoryPreferenceStore, MemoryResultStore, RecordingPublisher, StaticRoomRepository,
};

const ROOM: i64 = 5;
const ALICE: i64 = 1;
const BOB: i64 = 2;

struct Harness {
    flow: MessageFlow,
    gateway: Arc<Gateway>,
    messages: Arc<MemoryMessageRepository>,
    preferences: Arc<MemoryPreferenceStore>,
    results: Arc<MemoryResultStore>,
}

fn harness(publisher: Arc<dyn EventPublisher>, results: Arc<MemoryResultStore>) -> Harness {
    let gateway = Arc::new(Gateway::new());
    let messages = Arc::new(MemoryMessageRepository::default());
    let preferences = Arc::new(MemoryPreferenceStore::default());
    let rooms = Arc::new(StaticRoomRepository::new(vec![ChatRoom {
        id: ROOM,
        name: "general".into(),
        admin_id: ALICE,
        member_ids: vec![ALICE, BOB],
    }]));

    let tracker = Arc::new(CorrelationTracker::new(
        Arc::clone(&publisher),
        results.clone(),
        &fast_translation_settings(),
    ));

    let flow = MessageFlow::new(
        messages.clone(),
        rooms,
        publisher,
        preferences.clone(),
        tracker,
        gateway.clone(),
    );

    Harness {
        flow,
        gateway,
        messages,
        preferences,
        results,
    }
}

/// Register a session the way the connection handler does: one room-wide and
/// one per-member group.
fn connect(harness: &Harness, user_id: i64) -> mpsc::UnboundedReceiver<ServerEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    let session_id = format!("session-{}", user_id);
    harness.gateway.register_session(&session_id, tx);
    harness
        .gateway
        .join_group(&groups::room(ROOM), &session_id);
    harness
        .gateway
        .join_group(&groups::user_room(user_id, ROOM), &session_id);
    rx
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn both_members_get_the_original_and_only_bob_gets_a_translation() {
    let results = Arc::new(MemoryResultStore::default());
    let publisher = Arc::new(LoopbackWorkerPublisher::new(results.clone()));
    let harness = harness(publisher.clone(), results);

    let mut alice_rx = connect(&harness, ALICE);
    let mut bob_rx = connect(&harness, BOB);

    harness.preferences.set(BOB, ROOM, "es").await.unwrap();

    harness
        .flow
        .handle_inbound(&user(ALICE, "alice"), ROOM, "hello")
        .await
        .unwrap();

    // Let the detached per-member waits run to completion.
    tokio::time::sleep(Duration::from_secs(1)).await;

    let alice_events = drain(&mut alice_rx);
    assert_eq!(
        alice_events,
        vec![ServerEvent::ChatMessage {
            message: "hello".into(),
            user_id: ALICE,
            username: "alice".into(),
        }]
    );

    let bob_events = drain(&mut bob_rx);
    assert_eq!(
        bob_events,
        vec![
            ServerEvent::ChatMessage {
                message: "hello".into(),
                user_id: ALICE,
                username: "alice".into(),
            },
            ServerEvent::TranslationUpdate {
                message_id: 1,
                message: "es:hello".into(),
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn the_sender_never_receives_a_translated_echo() {
    let results = Arc::new(MemoryResultStore::default());
    let publisher = Arc::new(LoopbackWorkerPublisher::new(results.clone()));
    let harness = harness(publisher.clone(), results);

    let mut alice_rx = connect(&harness, ALICE);

    // Even with a preference of her own, Alice reads her own words verbatim.
    harness.preferences.set(ALICE, ROOM, "fr").await.unwrap();

    harness
        .flow
        .handle_inbound(&user(ALICE, "alice"), ROOM, "bonjour?")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;

    let alice_events = drain(&mut alice_rx);
    assert_eq!(
        alice_events,
        vec![ServerEvent::ChatMessage {
            message: "bonjour?".into(),
            user_id: ALICE,
            username: "alice".into(),
        }]
    );

    // And no request was even made on her behalf.
    let requests = publisher.published_to(Queue::TranslationRequest);
    assert!(requests.is_empty());
}

#[tokio::test(start_paused = true)]
async fn members_without_a_preference_trigger_no_translation_request() {
    let results = Arc::new(MemoryResultStore::default());
    let publisher = Arc::new(LoopbackWorkerPublisher::new(results.clone()));
    let harness = harness(publisher.clone(), results);

    let mut bob_rx = connect(&harness, BOB);

    harness
        .flow
        .handle_inbound(&user(ALICE, "alice"), ROOM, "hello")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(
        drain(&mut bob_rx),
        vec![ServerEvent::ChatMessage {
            message: "hello".into(),
            user_id: ALICE,
            username: "alice".into(),
        }]
    );
    assert!(publisher.published_to(Queue::TranslationRequest).is_empty());
}

#[tokio::test]
async fn empty_messages_are_rejected_without_side_effects() {
    let results = Arc::new(MemoryResultStore::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let harness = harness(publisher.clone(), results);

    let mut bob_rx = connect(&harness, BOB);

    harness
        .flow
        .handle_inbound(&user(ALICE, "alice"), ROOM, "   ")
        .await
        .unwrap();

    assert!(harness.messages.stored().is_empty());
    assert!(publisher.published().is_empty());
    assert!(drain(&mut bob_rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn a_dead_worker_degrades_to_the_original_text() {
    let results = Arc::new(MemoryResultStore::default());
    // Recording publisher: requests go nowhere, so the wait must expire.
    let publisher = Arc::new(RecordingPublisher::default());
    let harness = harness(publisher.clone(), results);

    let mut bob_rx = connect(&harness, BOB);
    harness.preferences.set(BOB, ROOM, "es").await.unwrap();

    harness
        .flow
        .handle_inbound(&user(ALICE, "alice"), ROOM, "hello")
        .await
        .unwrap();

    // Past the full wait budget.
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(
        drain(&mut bob_rx),
        vec![
            ServerEvent::ChatMessage {
                message: "hello".into(),
                user_id: ALICE,
                username: "alice".into(),
            },
            ServerEvent::TranslationUpdate {
                message_id: 1,
                message: "hello".into(),
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn a_new_message_event_is_published_per_persisted_message() {
    let results = Arc::new(MemoryResultStore::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let harness = harness(publisher.clone(), results);

    harness
        .flow
        .handle_inbound(&user(ALICE, "alice"), ROOM, "hello")
        .await
        .unwrap();

    let events = publisher.published_to(Queue::NewMessage);
    assert_eq!(events.len(), 1);
    let event: NewMessagePosted = serde_json::from_value(events[0].clone()).unwrap();
    assert_eq!(
        event,
        NewMessagePosted {
            message_id: 1,
            room_id: ROOM,
            sender_id: ALICE,
            content: "hello".into(),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn a_late_translation_may_arrive_after_a_newer_message() {
    let results = Arc::new(MemoryResultStore::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let harness = harness(publisher.clone(), results);

    let mut bob_rx = connect(&harness, BOB);
    harness.preferences.set(BOB, ROOM, "es").await.unwrap();

    harness
        .flow
        .handle_inbound(&user(ALICE, "alice"), ROOM, "first")
        .await
        .unwrap();
    harness
        .flow
        .handle_inbound(&user(ALICE, "alice"), ROOM, "second")
        .await
        .unwrap();

    // The worker responds to the first request only after the second message
    // already went out.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let first_request: TranslationRequested = serde_json::from_value(
        publisher
            .published_to(Queue::TranslationRequest)
            .iter()
            .find(|p| p["message_id"] == 1)
            .cloned()
            .unwrap(),
    )
    .unwrap();
    harness
        .results
        .put(&first_request.correlation_id, "es:first")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(6)).await;

    let bob_events = drain(&mut bob_rx);
    let chat_second = bob_events
        .iter()
        .position(|e| matches!(e, ServerEvent::ChatMessage { message, .. } if message == "second"))
        .unwrap();
    let translated_first = bob_events
        .iter()
        .position(|e| {
            matches!(e, ServerEvent::TranslationUpdate { message, .. } if message == "es:first")
        })
        .unwrap();

    // Accepted ordering property: the translated rendition of an older
    // message lands after a newer original-text broadcast.
    assert!(translated_first > chat_second);
}
