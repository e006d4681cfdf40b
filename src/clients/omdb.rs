use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::OmdbConfig;

/// Seam over the upstream movie database so the enricher can be exercised
/// against a stub in tests.
///
/// Both operations return the upstream JSON body as-is: the upstream signals
/// its own errors in-band (`"Response": "False"` plus an `Error` message), and
/// those envelopes are data to pass through, not failures. Only transport and
/// JSON-parse problems surface as `Err`.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    /// Fetches the payload for a canonical query string (`s=...&page=...`).
    async fn fetch_query(&self, query: &str) -> Result<Value>;

    /// Fetches the detail payload for a single title by external identifier.
    async fn fetch_title(&self, imdb_id: &str) -> Result<Value>;
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    #[must_use]
    pub fn new(config: &OmdbConfig) -> Self {
        Self::with_shared_client(Client::new(), config)
    }

    #[must_use]
    pub fn with_shared_client(client: Client, config: &OmdbConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn get_json(&self, query: &str) -> Result<Value> {
        let url = format!("{}/?{}&apikey={}", self.base_url, query, self.api_key);
        let response = self.client.get(&url).send().await?;

        // No status check: a missing or rejected key comes back non-2xx with a
        // well-formed error envelope, and that body is the contract.
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MovieProvider for OmdbClient {
    async fn fetch_query(&self, query: &str) -> Result<Value> {
        self.get_json(query).await
    }

    async fn fetch_title(&self, imdb_id: &str) -> Result<Value> {
        self.get_json(&format!("i={}", urlencoding::encode(imdb_id)))
            .await
    }
}
