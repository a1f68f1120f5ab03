//! Optional read-through page cache.
//!
//! The engine is cache-agnostic: ranking is correct with no cache configured,
//! and a cache failure degrades to a live computation. Failures are reported
//! through [`CacheError`] and logged by the orchestrator, never surfaced to
//! the caller.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{RankingMode, RankingRequest, RankingResult};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache codec error: {0}")]
    Codec(String),
}

/// Cache key: one entry per (user, mode, page, page size) plus the mode's
/// discriminator (time window or group tag) so distinct variants never
/// collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCacheKey {
    pub user_id: Uuid,
    pub mode: RankingMode,
    pub page: u32,
    pub page_size: u32,
    pub discriminator: Option<String>,
}

impl FeedCacheKey {
    pub fn from_request(request: &RankingRequest) -> Self {
        let discriminator = match request.mode {
            RankingMode::Trending => request.time_window.map(|w| w.as_str().to_string()),
            _ => request.group_tag.clone(),
        };
        Self {
            user_id: request.user_id,
            mode: request.mode,
            page: request.page,
            page_size: request.page_size,
            discriminator,
        }
    }

    pub fn redis_key(&self) -> String {
        format!(
            "feed:{}:{}:{}:{}:{}",
            self.mode.as_str(),
            self.user_id,
            self.page,
            self.page_size,
            self.discriminator.as_deref().unwrap_or("-")
        )
    }
}

/// Read-through page cache contract.
#[async_trait]
pub trait FeedCache: Send + Sync {
    async fn get_page(&self, key: &FeedCacheKey) -> Result<Option<RankingResult>, CacheError>;
    async fn put_page(&self, key: &FeedCacheKey, page: &RankingResult) -> Result<(), CacheError>;
}

/// Redis-backed cache with JSON values and a TTL.
pub struct RedisFeedCache {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisFeedCache {
    pub fn new(conn: ConnectionManager, ttl_seconds: u64) -> Self {
        Self { conn, ttl_seconds }
    }

    pub async fn connect(url: &str, ttl_seconds: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Backend(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(Self::new(conn, ttl_seconds))
    }

    pub async fn from_config(config: &crate::config::CacheConfig) -> Result<Self, CacheError> {
        Self::connect(&config.url, config.ttl_seconds).await
    }
}

#[async_trait]
impl FeedCache for RedisFeedCache {
    async fn get_page(&self, key: &FeedCacheKey) -> Result<Option<RankingResult>, CacheError> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = conn
            .get(key.redis_key())
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        match cached {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| CacheError::Codec(e.to_string())),
            None => Ok(None),
        }
    }

    async fn put_page(&self, key: &FeedCacheKey, page: &RankingResult) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(page).map_err(|e| CacheError::Codec(e.to_string()))?;
        let _: () = conn
            .set_ex(key.redis_key(), json, self.ttl_seconds)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}
