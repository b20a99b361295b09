//! HTTP surface tests.
//!
//! Exercise the router with `tower::ServiceExt::oneshot` against app state
//! wired to in-memory collaborators and a lazy (never-connected) database
//! pool.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use jsonwebtoken::{encode, EncodingKey, Header};
use pretty_assertions::assert_eq;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use polychat::application::realtime::Broadcaster;
use polychat::application::{CorrelationTracker, LanguagePreferenceService, MessageFlow};
use polychat::config::{
    BrokerSettings, DatabaseSettings, JwtSettings, RedisSettings, ServerSettings, Settings,
    TranslatorSettings,
};
use polychat::domain::events::LanguageChanged;
use polychat::infrastructure::broker::Queue;
use polychat::presentation::http::routes::create_router;
use polychat::presentation::websocket::Gateway;
use polychat::shared::auth::JwtVerifier;
use polychat::startup::AppState;

use crate::common::{
    fast_translation_settings, MemoryMessageRepository, MemoryPreferenceStore, MemoryResultStore,
    RecordingPublisher, StaticRoomRepository,
};

const SECRET: &str = "test-secret-test-secret-test-secret!";

#[derive(Serialize)]
struct Claims {
    sub: String,
    name: String,
    exp: usize,
}

fn token_for(user_id: i64, username: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        name: username.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "postgres://localhost/polychat_test".into(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout: 1,
        },
        redis: RedisSettings {
            url: "redis://localhost".into(),
        },
        broker: BrokerSettings {
            url: "amqp://localhost".into(),
        },
        translator: TranslatorSettings {
            endpoint: "http://127.0.0.1:1".into(),
            key: "k".into(),
            region: "r".into(),
            request_timeout_secs: 1,
        },
        translation: fast_translation_settings(),
        jwt: JwtSettings {
            secret: SECRET.into(),
        },
        environment: "test".into(),
    }
}

fn test_state(publisher: Arc<RecordingPublisher>) -> AppState {
    let gateway = Arc::new(Gateway::new());
    let broadcaster: Arc<dyn Broadcaster> = gateway.clone();
    let preference_store = Arc::new(MemoryPreferenceStore::default());
    let results = Arc::new(MemoryResultStore::default());
    let settings = test_settings();

    let tracker = Arc::new(CorrelationTracker::new(
        publisher.clone(),
        results,
        &settings.translation,
    ));

    let flow = Arc::new(MessageFlow::new(
        Arc::new(MemoryMessageRepository::default()),
        Arc::new(StaticRoomRepository::new(Vec::new())),
        publisher.clone(),
        preference_store.clone(),
        tracker,
        broadcaster,
    ));

    let preferences = Arc::new(LanguagePreferenceService::new(preference_store, publisher));

    AppState {
        db: PgPoolOptions::new()
            .connect_lazy(&settings.database.url)
            .unwrap(),
        gateway,
        flow,
        preferences,
        verifier: Arc::new(JwtVerifier::new(SECRET)),
        settings: Arc::new(settings),
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let router = create_router(test_state(Arc::new(RecordingPublisher::default())));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn set_language_requires_authentication() {
    let router = create_router(test_state(Arc::new(RecordingPublisher::default())));

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat/set-language")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"chat_room": 5, "language": "es"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn set_then_get_language_round_trips_and_notifies() {
    let publisher = Arc::new(RecordingPublisher::default());
    let router = create_router(test_state(publisher.clone()));
    let token = token_for(7, "bob");

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat/set-language")
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(r#"{"chat_room": 5, "language": "es"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/chat/get-language?chat_room=5")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["language"], "es");

    let notifications = publisher.published_to(Queue::LanguageChange);
    assert_eq!(notifications.len(), 1);
    let event: LanguageChanged = serde_json::from_value(notifications[0].clone()).unwrap();
    assert_eq!(event.user_id, 7);
    assert_eq!(event.room_id, 5);
    assert_eq!(event.language_code, "es");
}

#[tokio::test]
async fn get_language_defaults_when_unset() {
    let router = create_router(test_state(Arc::new(RecordingPublisher::default())));
    let token = token_for(9, "carol");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/chat/get-language?chat_room=1")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["language"], "default");
}
