use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::vote::VoteRow;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }

    fn vote_repo(&self) -> repositories::vote::VoteRepository {
        repositories::vote::VoteRepository::new(self.conn.clone())
    }

    pub async fn cache_get(&self, key: &str) -> Result<Option<Value>> {
        self.cache_repo().get(key).await
    }

    /// Read-through fetch against the response cache. See
    /// [`repositories::cache::CacheRepository::fetch`].
    pub async fn cache_fetch<F, Fut>(
        &self,
        key: &str,
        ttl: chrono::Duration,
        producer: F,
    ) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        self.cache_repo().fetch(key, ttl, producer).await
    }

    pub async fn cache_entry_count(&self) -> Result<u64> {
        self.cache_repo().entry_count().await
    }

    pub async fn vote_count_for(&self, imdb_id: &str) -> Result<Option<i64>> {
        self.vote_repo().count_for(imdb_id).await
    }

    pub async fn apply_vote(&self, imdb_id: &str, delta: i64) -> Result<VoteRow> {
        self.vote_repo().apply(imdb_id, delta).await
    }

    pub async fn vote_row_count(&self) -> Result<u64> {
        self.vote_repo().total_rows().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store")
    }

    #[tokio::test]
    async fn test_cache_fetch_is_read_through() {
        let store = memory_store().await;
        let calls = AtomicUsize::new(0);

        let produce = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "Response": "True" }))
        };

        let ttl = chrono::Duration::minutes(59);
        let first = store.cache_fetch("s=thomas", ttl, produce).await.unwrap();
        let second = store
            .cache_fetch("s=thomas", ttl, || async { unreachable!() })
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.cache_entry_count().await.unwrap(), 1);
        assert!(store.cache_get("s=thomas").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let store = memory_store().await;

        // Zero TTL: the entry expires the moment it is written.
        store
            .cache_fetch("i=tt0086815", chrono::Duration::zero(), || async {
                Ok(json!({ "Title": "Thomas & Friends" }))
            })
            .await
            .unwrap();

        assert!(store.cache_get("i=tt0086815").await.unwrap().is_none());

        let refetched = store
            .cache_fetch("i=tt0086815", chrono::Duration::minutes(59), || async {
                Ok(json!({ "Title": "Thomas & Friends", "fresh": true }))
            })
            .await
            .unwrap();
        assert_eq!(refetched["fresh"], true);
    }

    #[tokio::test]
    async fn test_cache_replaces_entry_for_same_key() {
        let store = memory_store().await;
        let ttl = chrono::Duration::minutes(59);

        store
            .cache_fetch("page=1&s=thomas", chrono::Duration::zero(), || async {
                Ok(json!({ "stale": true }))
            })
            .await
            .unwrap();
        store
            .cache_fetch("page=1&s=thomas", ttl, || async { Ok(json!({ "stale": false })) })
            .await
            .unwrap();

        assert_eq!(store.cache_entry_count().await.unwrap(), 1);
        let cached = store.cache_get("page=1&s=thomas").await.unwrap().unwrap();
        assert_eq!(cached["stale"], false);
    }

    #[tokio::test]
    async fn test_vote_upsert_and_count() {
        let store = memory_store().await;

        assert!(store.vote_count_for("tt0454349").await.unwrap().is_none());

        store.apply_vote("tt0454349", 1).await.unwrap();
        let row = store.apply_vote("tt0454349", 1).await.unwrap();
        assert_eq!(row.count, 2);

        let row = store.apply_vote("tt0454349", -1).await.unwrap();
        assert_eq!(row.count, 1);

        assert_eq!(store.vote_count_for("tt0454349").await.unwrap(), Some(1));
        assert_eq!(store.vote_row_count().await.unwrap(), 1);
    }
}
