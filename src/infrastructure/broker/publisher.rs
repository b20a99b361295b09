//! Event Publisher
//!
//! Fire-and-forget publication of domain events onto durable queues.
//!
//! Delivery is best-effort by contract: a broker outage must never break the
//! primary write path (message persistence), so publish failures are logged
//! and swallowed. At-most-once, no retry, no dead-lettering here.

use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Connection, ConnectionProperties,
};
use serde::Serialize;
use tracing::{debug, warn};

use super::Queue;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Fire-and-forget event publishing seam.
///
/// Object-safe so flows can hold `Arc<dyn EventPublisher>`; the typed surface
/// lives on [`EventPublisherExt`].
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a JSON payload to a queue. Never fails from the caller's view.
    async fn publish(&self, queue: Queue, payload: serde_json::Value);
}

/// Typed convenience over [`EventPublisher`].
#[async_trait]
pub trait EventPublisherExt: EventPublisher {
    /// Serialize an event and publish it.
    async fn publish_event<E: Serialize + Sync>(&self, queue: Queue, event: &E) {
        match serde_json::to_value(event) {
            Ok(payload) => self.publish(queue, payload).await,
            Err(e) => warn!(queue = %queue, error = %e, "Event not serializable; dropping"),
        }
    }
}

#[async_trait]
impl<P: EventPublisher + ?Sized> EventPublisherExt for P {}

/// RabbitMQ-backed publisher.
///
/// Each publish opens a fresh connection, declares the destination queue
/// durable, sends one persistent message and closes the connection. The
/// connection churn is deliberate: publishers run inside short-lived
/// connection tasks with nothing to own a long-lived channel.
#[derive(Clone)]
pub struct AmqpPublisher {
    url: String,
}

impl AmqpPublisher {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn try_publish(&self, queue: Queue, payload: &serde_json::Value) -> Result<(), AppError> {
        let connection =
            Connection::connect(&self.url, ConnectionProperties::default()).await?;

        let outcome = Self::send_on(&connection, queue, payload).await;

        // Closed whether the send landed or not.
        if let Err(e) = connection.close(200, "publish done").await {
            debug!(error = %e, "Broker connection close failed after publish");
        }

        outcome
    }

    async fn send_on(
        connection: &Connection,
        queue: Queue,
        payload: &serde_json::Value,
    ) -> Result<(), AppError> {
        let channel = connection.create_channel().await?;

        channel
            .queue_declare(
                queue.name(),
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        let body = serde_json::to_vec(payload)?;

        channel
            .basic_publish(
                "",
                queue.name(),
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default()
                    .with_delivery_mode(2)
                    .with_content_type("application/json".into()),
            )
            .await?
            .await?;

        debug!(queue = %queue, "Event published");

        Ok(())
    }
}

#[async_trait]
impl EventPublisher for AmqpPublisher {
    async fn publish(&self, queue: Queue, payload: serde_json::Value) {
        match self.try_publish(queue, &payload).await {
            Ok(()) => metrics::EVENTS_PUBLISHED.with_label_values(&[queue.name()]).inc(),
            Err(e) => {
                metrics::EVENTS_DROPPED.with_label_values(&[queue.name()]).inc();
                warn!(queue = %queue, error = %e, "Event publish failed; dropping");
            }
        }
    }
}
