use crate::entities::{prelude::*, response_cache};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::Value;
use tracing::debug;

/// Repository for cached upstream responses.
///
/// Read-through with a per-entry TTL: `fetch` returns a fresh cached payload
/// when one exists, otherwise awaits the producer and stores its result.
/// Concurrent misses for the same key may each invoke their own producer;
/// last write wins.
pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = chrono::Utc::now().to_rfc3339();

        // Opportunistic cleanup of expired entries on the read path.
        let _ = ResponseCache::delete_many()
            .filter(response_cache::Column::ExpiresAt.lt(&now))
            .exec(&self.conn)
            .await;

        let entry = ResponseCache::find()
            .filter(response_cache::Column::CacheKey.eq(key))
            .filter(response_cache::Column::ExpiresAt.gt(&now))
            .one(&self.conn)
            .await?;

        if let Some(e) = entry {
            let payload: Value = serde_json::from_str(&e.payload_json)?;
            Ok(Some(payload))
        } else {
            Ok(None)
        }
    }

    pub async fn put(&self, key: &str, payload: &Value, ttl: chrono::Duration) -> Result<()> {
        let payload_json = serde_json::to_string(payload)?;
        let now = chrono::Utc::now();
        let created_at = now.to_rfc3339();
        let expires_at = (now + ttl).to_rfc3339();

        // The cache key carries a unique index; replace any previous entry.
        let _ = ResponseCache::delete_many()
            .filter(response_cache::Column::CacheKey.eq(key))
            .exec(&self.conn)
            .await;

        let active_model = response_cache::ActiveModel {
            cache_key: Set(key.to_string()),
            payload_json: Set(payload_json),
            created_at: Set(created_at),
            expires_at: Set(expires_at),
            ..Default::default()
        };

        ResponseCache::insert(active_model).exec(&self.conn).await?;

        Ok(())
    }

    /// Read-through fetch: serve a fresh entry, or run the producer and cache
    /// what it returns under `key` for `ttl`.
    pub async fn fetch<F, Fut>(&self, key: &str, ttl: chrono::Duration, producer: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(hit) = self.get(key).await? {
            debug!("cache hit for '{key}'");
            return Ok(hit);
        }

        debug!("cache miss for '{key}'");
        let payload = producer().await?;
        self.put(key, &payload, ttl).await?;
        Ok(payload)
    }

    pub async fn entry_count(&self) -> Result<u64> {
        Ok(ResponseCache::find().count(&self.conn).await?)
    }
}
