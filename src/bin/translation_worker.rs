//! # Translation Worker
//!
//! Long-lived consumer of the translation request queue. Runs as its own
//! process so provider latency never competes with the chat server for
//! resources.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use polychat::application::TranslationWorker;
use polychat::config::Settings;
use polychat::infrastructure::broker::{self, AmqpPublisher, Queue, run_queue_consumer};
use polychat::infrastructure::cache::{create_redis_client, RedisResultStore};
use polychat::infrastructure::translator::AzureTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    polychat::telemetry::init_tracing();

    info!("Starting translation worker...");

    let settings = Settings::load()?;

    let redis = create_redis_client(&settings.redis).await?;
    let results = Arc::new(RedisResultStore::new(
        redis,
        settings.translation.result_ttl_secs,
    ));
    let translator = Arc::new(AzureTranslator::new(&settings.translator));
    let publisher = Arc::new(AmqpPublisher::new(settings.broker.url.clone()));

    let worker = Arc::new(TranslationWorker::new(translator, results, publisher));

    let connection = broker::connect(&settings.broker).await?;

    info!("Translation worker started. Waiting for messages...");
    run_queue_consumer(&connection, Queue::TranslationRequest, worker).await?;

    Ok(())
}
