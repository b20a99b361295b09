//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::consumers::{build_registry, spawn_consumers};
use crate::application::realtime::Broadcaster;
use crate::application::{CorrelationTracker, LanguagePreferenceService, MessageFlow};
use crate::config::Settings;
use crate::domain::{MessageRepository, RoomRepository};
use crate::infrastructure::broker::{self, AmqpPublisher, EventPublisher};
use crate::infrastructure::cache::{
    create_redis_client, PreferenceStore, RedisPreferenceStore, RedisResultStore, ResultStore,
};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{PgMessageRepository, PgRoomRepository};
use crate::presentation::http::routes;
use crate::presentation::websocket::Gateway;
use crate::shared::auth::JwtVerifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub gateway: Arc<Gateway>,
    pub flow: Arc<MessageFlow>,
    pub preferences: Arc<LanguagePreferenceService>,
    pub verifier: Arc<JwtVerifier>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        // Create Redis connection
        let redis = create_redis_client(&settings.redis).await?;

        // Shared collaborators behind their seams
        let publisher: Arc<dyn EventPublisher> =
            Arc::new(AmqpPublisher::new(settings.broker.url.clone()));
        let preference_store: Arc<dyn PreferenceStore> =
            Arc::new(RedisPreferenceStore::new(redis.clone()));
        let result_store: Arc<dyn ResultStore> = Arc::new(RedisResultStore::new(
            redis.clone(),
            settings.translation.result_ttl_secs,
        ));
        let message_repo: Arc<dyn MessageRepository> =
            Arc::new(PgMessageRepository::new(db.clone()));
        let room_repo: Arc<dyn RoomRepository> = Arc::new(PgRoomRepository::new(db.clone()));

        let tracker = Arc::new(CorrelationTracker::new(
            Arc::clone(&publisher),
            Arc::clone(&result_store),
            &settings.translation,
        ));

        // Create WebSocket gateway
        let gateway = Arc::new(Gateway::new());
        let broadcaster: Arc<dyn Broadcaster> = gateway.clone();

        let flow = Arc::new(MessageFlow::new(
            Arc::clone(&message_repo),
            room_repo,
            Arc::clone(&publisher),
            Arc::clone(&preference_store),
            Arc::clone(&tracker),
            Arc::clone(&broadcaster),
        ));

        let preferences = Arc::new(LanguagePreferenceService::new(
            preference_store,
            Arc::clone(&publisher),
        ));

        // Broker consumers run as independent loops; a broker outage delays
        // them but must not block the server from accepting connections.
        let broker_settings = settings.broker.clone();
        tokio::spawn(async move {
            match broker::connect(&broker_settings).await {
                Ok(connection) => {
                    let registry = build_registry(broadcaster, message_repo, tracker);
                    spawn_consumers(Arc::new(connection), registry);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Broker unreachable; queue consumers not running");
                }
            }
        });

        // Create app state
        let state = AppState {
            db,
            gateway,
            flow,
            preferences,
            verifier: Arc::new(JwtVerifier::new(settings.jwt.secret.clone())),
            settings: Arc::new(settings.clone()),
        };

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        // Bind to address
        let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
