//! Prometheus Metrics Module
//!
//! Application-wide metrics collection.
//!
//! # Metrics Collected
//! - Domain events published/dropped per queue
//! - Translation outcomes (translated vs fallback)
//! - Correlation waits resolved vs expired
//! - Active WebSocket connection gauge

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Domain events successfully handed to the broker, per queue.
pub static EVENTS_PUBLISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("events_published_total", "Domain events published").namespace("polychat"),
        &["queue"],
    )
    .expect("Failed to create EVENTS_PUBLISHED metric")
});

/// Domain events dropped because the broker was unreachable, per queue.
pub static EVENTS_DROPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("events_dropped_total", "Domain events dropped on publish failure")
            .namespace("polychat"),
        &["queue"],
    )
    .expect("Failed to create EVENTS_DROPPED metric")
});

/// Provider translation outcomes: "translated" or "fallback".
pub static TRANSLATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("translations_total", "Translation provider outcomes").namespace("polychat"),
        &["outcome"],
    )
    .expect("Failed to create TRANSLATIONS metric")
});

/// Correlation wait outcomes: "resolved" or "expired".
pub static CORRELATION_WAITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("correlation_waits_total", "Translation correlation wait outcomes")
            .namespace("polychat"),
        &["outcome"],
    )
    .expect("Failed to create CORRELATION_WAITS metric")
});

/// Active WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "polychat_websocket_connections_active",
        "Number of active WebSocket connections",
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(EVENTS_PUBLISHED.clone()))
        .expect("Failed to register EVENTS_PUBLISHED");
    registry
        .register(Box::new(EVENTS_DROPPED.clone()))
        .expect("Failed to register EVENTS_DROPPED");
    registry
        .register(Box::new(TRANSLATIONS.clone()))
        .expect("Failed to register TRANSLATIONS");
    registry
        .register(Box::new(CORRELATION_WAITS.clone()))
        .expect("Failed to register CORRELATION_WAITS");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
