use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::clients::omdb::MovieProvider;
use crate::config::CacheConfig;
use crate::db::Store;
use crate::models::query::MovieQuery;

/// The response-caching and enrichment pipeline.
///
/// `resolve` turns an incoming query into a canonical cache key, serves the
/// upstream payload from cache or fetches it, and overlays each search result
/// row with its local vote count and a cached per-title detail lookup.
#[derive(Clone)]
pub struct SearchEnricher {
    store: Store,
    provider: Arc<dyn MovieProvider>,
    search_ttl: chrono::Duration,
    detail_ttl: chrono::Duration,
}

impl SearchEnricher {
    #[must_use]
    pub fn new(store: Store, provider: Arc<dyn MovieProvider>, cache: &CacheConfig) -> Self {
        Self {
            store,
            provider,
            search_ttl: chrono::Duration::minutes(cache.search_ttl_minutes),
            detail_ttl: chrono::Duration::minutes(cache.detail_ttl_minutes),
        }
    }

    pub async fn resolve(&self, query: &MovieQuery) -> Result<Value> {
        let key = query.canonical();

        let mut payload = self
            .store
            .cache_fetch(&key, self.search_ttl, || self.provider.fetch_query(&key))
            .await?;

        // Single-title lookups and upstream error envelopes carry no Search
        // list; they pass through untouched.
        if !payload.get("Search").is_some_and(Value::is_array) {
            return Ok(payload);
        }

        if let Some(entries) = payload.get_mut("Search").and_then(Value::as_array_mut) {
            for entry in entries.iter_mut() {
                self.enrich_entry(entry).await?;
            }
        }

        Ok(payload)
    }

    /// Attaches `count` (stored votes, 0 when none) and `details` (cached
    /// per-title lookup) to one result row. Rows without a usable external
    /// identifier still get a count; they just skip the detail fetch.
    async fn enrich_entry(&self, entry: &mut Value) -> Result<()> {
        let imdb_id = entry
            .get("imdbID")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);

        let count = match &imdb_id {
            Some(id) => self.store.vote_count_for(id).await?.unwrap_or(0),
            None => 0,
        };

        let Some(obj) = entry.as_object_mut() else {
            debug!("skipping non-object search entry");
            return Ok(());
        };

        obj.insert("count".to_string(), Value::from(count));

        if let Some(id) = imdb_id {
            let details = self
                .store
                .cache_fetch(&id, self.detail_ttl, || self.provider.fetch_title(&id))
                .await?;
            obj.insert("details".to_string(), details);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        search_calls: AtomicUsize,
        title_calls: AtomicUsize,
        payload: Value,
    }

    impl StubProvider {
        fn new(payload: Value) -> Self {
            Self {
                search_calls: AtomicUsize::new(0),
                title_calls: AtomicUsize::new(0),
                payload,
            }
        }
    }

    #[async_trait]
    impl MovieProvider for StubProvider {
        async fn fetch_query(&self, _query: &str) -> Result<Value> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }

        async fn fetch_title(&self, imdb_id: &str) -> Result<Value> {
            self.title_calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "imdbID": imdb_id, "Response": "True" }))
        }
    }

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store")
    }

    fn search_payload() -> Value {
        json!({
            "Search": [
                { "Title": "Thomas & Friends", "Year": "1984", "imdbID": "tt0086815",
                  "Type": "series", "Poster": "https://m.media-amazon.com/images/M/thomas1.jpg" },
                { "Title": "Thomas and the Magic Railroad", "Year": "2000", "imdbID": "tt0190138",
                  "Type": "movie", "Poster": "https://m.media-amazon.com/images/M/thomas2.jpg" }
            ],
            "totalResults": "2",
            "Response": "True"
        })
    }

    fn enricher_with(store: Store, provider: Arc<StubProvider>) -> SearchEnricher {
        SearchEnricher::new(store, provider, &CacheConfig::default())
    }

    #[tokio::test]
    async fn test_every_entry_gets_count_and_details() {
        let store = memory_store().await;
        let provider = Arc::new(StubProvider::new(search_payload()));
        let enricher = enricher_with(store, provider.clone());

        let result = enricher
            .resolve(&MovieQuery::by_title("thomas", None))
            .await
            .unwrap();

        let entries = result["Search"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert_eq!(entry["count"], 0);
            assert_eq!(entry["details"]["Response"], "True");
            assert_eq!(entry["details"]["imdbID"], entry["imdbID"]);
        }
        assert_eq!(provider.title_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_counts_come_from_vote_store() {
        let store = memory_store().await;
        store.apply_vote("tt0086815", 1).await.unwrap();
        store.apply_vote("tt0086815", 1).await.unwrap();
        store.apply_vote("tt0190138", -1).await.unwrap();

        let provider = Arc::new(StubProvider::new(search_payload()));
        let enricher = enricher_with(store, provider);

        let result = enricher
            .resolve(&MovieQuery::by_title("thomas", None))
            .await
            .unwrap();

        let entries = result["Search"].as_array().unwrap();
        assert_eq!(entries[0]["count"], 2);
        assert_eq!(entries[1]["count"], -1);
    }

    #[tokio::test]
    async fn test_second_resolve_serves_from_cache() {
        let store = memory_store().await;
        let provider = Arc::new(StubProvider::new(search_payload()));
        let enricher = enricher_with(store, provider.clone());

        let query = MovieQuery::by_title("thomas", Some(1));
        enricher.resolve(&query).await.unwrap();
        enricher.resolve(&query).await.unwrap();

        assert_eq!(provider.search_calls.load(Ordering::SeqCst), 1);
        // Detail payloads are cached per identifier as well.
        assert_eq!(provider.title_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_list_payload_passes_through_without_refetch() {
        let store = memory_store().await;
        let single = json!({
            "Title": "Guardians of the Galaxy Vol. 2",
            "Year": "2017",
            "imdbID": "tt3896198",
            "Response": "True"
        });
        let provider = Arc::new(StubProvider::new(single.clone()));
        let enricher = enricher_with(store, provider.clone());

        let result = enricher
            .resolve(&MovieQuery::by_id("tt3896198"))
            .await
            .unwrap();

        assert_eq!(result, single);
        assert_eq!(provider.search_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.title_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_envelope_passes_through_unchanged() {
        let store = memory_store().await;
        let envelope = json!({ "Response": "False", "Error": "Too many results." });
        let provider = Arc::new(StubProvider::new(envelope.clone()));
        let enricher = enricher_with(store, provider);

        let result = enricher
            .resolve(&MovieQuery::by_title("t", None))
            .await
            .unwrap();

        assert_eq!(result, envelope);
    }

    #[tokio::test]
    async fn test_entry_without_id_still_gets_count() {
        let store = memory_store().await;
        let payload = json!({
            "Search": [
                { "Title": "Unidentified", "Year": "1999", "Type": "movie", "Poster": "N/A" }
            ],
            "Response": "True"
        });
        let provider = Arc::new(StubProvider::new(payload));
        let enricher = enricher_with(store, provider.clone());

        let result = enricher
            .resolve(&MovieQuery::by_title("unidentified", None))
            .await
            .unwrap();

        let entry = &result["Search"][0];
        assert_eq!(entry["count"], 0);
        assert!(entry.get("details").is_none());
        assert_eq!(provider.title_calls.load(Ordering::SeqCst), 0);
    }
}
