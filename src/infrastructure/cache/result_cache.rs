//! Translation Result Store
//!
//! Expiring, consume-once result slots keyed by correlation id. The worker
//! writes each slot exactly once; the waiting requester reads it at most once
//! via `take`, which deletes on read so a stale result can never replay.
//! Unclaimed slots die by expiry.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

use super::keys;
use crate::shared::error::AppError;

/// Result slot access shared by the worker (put) and the tracker (take).
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Write a result slot. Overwrites are harmless: correlation ids are
    /// unique per request, so only duplicate deliveries land twice.
    async fn put(&self, correlation_id: &str, translated_text: &str) -> Result<(), AppError>;

    /// Read and delete a slot in one step. `None` when empty or already
    /// consumed.
    async fn take(&self, correlation_id: &str) -> Result<Option<String>, AppError>;
}

/// Redis implementation of [`ResultStore`].
#[derive(Clone)]
pub struct RedisResultStore {
    redis: ConnectionManager,
    ttl_secs: u64,
}

impl RedisResultStore {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }
}

#[async_trait]
impl ResultStore for RedisResultStore {
    async fn put(&self, correlation_id: &str, translated_text: &str) -> Result<(), AppError> {
        let key = keys::translation_response(correlation_id);
        let mut conn = self.redis.clone();

        let _: () = redis::cmd("SET")
            .arg(&key)
            .arg(translated_text)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await?;

        debug!(key = %key, ttl = self.ttl_secs, "Translation result stored");

        Ok(())
    }

    async fn take(&self, correlation_id: &str) -> Result<Option<String>, AppError> {
        let key = keys::translation_response(correlation_id);
        let mut conn = self.redis.clone();

        // GETDEL keeps read+delete atomic so two pollers cannot both consume.
        let value: Option<String> = redis::cmd("GETDEL")
            .arg(&key)
            .query_async(&mut conn)
            .await?;

        if value.is_some() {
            debug!(key = %key, "Translation result consumed");
        }

        Ok(value)
    }
}
