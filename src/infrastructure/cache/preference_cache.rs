//! Language Preference Store
//!
//! Redis-backed mapping of (user, room) to a language code. Absence means the
//! member reads messages untranslated, so lookups never fail: a miss and a
//! Redis error both yield the sentinel.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, warn};

use super::keys;
use crate::shared::error::AppError;

/// Sentinel language code meaning "deliver the original text".
pub const DEFAULT_LANGUAGE: &str = "default";

/// Keyed preference access.
///
/// `get` is infallible by contract; `set` is a plain last-writer-wins
/// overwrite with no TTL. Concurrent writers race benignly.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, user_id: i64, room_id: i64) -> String;

    async fn set(&self, user_id: i64, room_id: i64, language_code: &str) -> Result<(), AppError>;
}

/// Whether a preference value asks for translation at all.
pub fn wants_translation(language_code: &str) -> bool {
    !language_code.is_empty() && language_code != DEFAULT_LANGUAGE
}

/// Redis implementation of [`PreferenceStore`].
#[derive(Clone)]
pub struct RedisPreferenceStore {
    redis: ConnectionManager,
}

impl RedisPreferenceStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl PreferenceStore for RedisPreferenceStore {
    async fn get(&self, user_id: i64, room_id: i64) -> String {
        let key = keys::language_preference(user_id, room_id);
        let mut conn = self.redis.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(code)) => code,
            Ok(None) => DEFAULT_LANGUAGE.to_string(),
            Err(e) => {
                warn!(key = %key, error = %e, "Preference lookup failed; using default");
                DEFAULT_LANGUAGE.to_string()
            }
        }
    }

    async fn set(&self, user_id: i64, room_id: i64, language_code: &str) -> Result<(), AppError> {
        let key = keys::language_preference(user_id, room_id);
        let mut conn = self.redis.clone();

        conn.set::<_, _, ()>(&key, language_code).await?;
        debug!(key = %key, language = %language_code, "Preference set");

        Ok(())
    }
}
