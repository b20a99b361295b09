//! Queue Consumer Loop
//!
//! One loop shape for every queue: declare durable, prefetch 1, decode,
//! handle, ack on success, nack without requeue on failure. A rejected message
//! is dropped, not retried; dead-lettering is broker configuration, not core
//! logic.

use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions, QueueDeclareOptions},
    types::FieldTable,
    Connection,
};
use tracing::{info, warn};

use super::Queue;
use crate::shared::error::AppError;

/// Handler for a single queue's messages.
///
/// Implementations decode the raw body themselves so a decode failure follows
/// the same nack-without-requeue path as a handling failure.
#[async_trait]
pub trait QueueHandler: Send + Sync {
    async fn handle(&self, body: &[u8]) -> Result<(), AppError>;
}

/// Consume a queue until the connection dies.
///
/// Runs as its own task; prefetch is pinned to 1 so a slow handler never
/// buffers a backlog it may crash on.
pub async fn run_queue_consumer(
    connection: &Connection,
    queue: Queue,
    handler: std::sync::Arc<dyn QueueHandler>,
) -> Result<(), AppError> {
    let channel = connection.create_channel().await?;
    channel.basic_qos(1, BasicQosOptions::default()).await?;

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

    let mut consumer = channel
        .basic_consume(
            queue.name(),
            &format!("polychat-{}", queue.name()),
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    info!(queue = %queue, "Consumer running");

    while let Some(delivery) = consumer.next().await {
        let delivery = delivery?;

        match handler.handle(&delivery.data).await {
            Ok(()) => {
                delivery.ack(BasicAckOptions::default()).await?;
            }
            Err(e) => {
                warn!(
                    queue = %queue,
                    error = %e,
                    body = %String::from_utf8_lossy(&delivery.data),
                    "Message rejected"
                );
                delivery
                    .nack(BasicNackOptions {
                        requeue: false,
                        ..BasicNackOptions::default()
                    })
                    .await?;
            }
        }
    }

    Ok(())
}
