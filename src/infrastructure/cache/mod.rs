//! Cache Module
//!
//! Redis connection management plus the two key-scoped stores the dispatch
//! core shares across processes:
//!
//! - the language preference store (no expiry)
//! - the translation result store (expiring, consume-once slots)
//!
//! Both are accessed by single-key reads and writes only; no cross-key
//! transactions exist, so the stores need no locking beyond Redis' per-command
//! atomicity.

mod preference_cache;
mod result_cache;

pub use preference_cache::{wants_translation, PreferenceStore, RedisPreferenceStore, DEFAULT_LANGUAGE};
pub use result_cache::{RedisResultStore, ResultStore};

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Creates a Redis connection manager with automatic reconnection.
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Cache key layout.
///
/// These shapes are shared with the translation worker process; change them in
/// lockstep or results stop correlating.
pub mod keys {
    /// Language preference for one member in one room, no expiry.
    #[inline]
    pub fn language_preference(user_id: i64, room_id: i64) -> String {
        format!("user_{}_room_{}_lang", user_id, room_id)
    }

    /// Translation result slot for a correlation id, bounded expiry.
    #[inline]
    pub fn translation_response(correlation_id: &str) -> String {
        format!("translation_response:{}", correlation_id)
    }
}
