use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::omdb::{MovieProvider, OmdbClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{SearchEnricher, VoteService};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across all upstream calls to enable connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Votarr/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub enricher: Arc<SearchEnricher>,

    pub votes: VoteService,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client =
            build_shared_http_client(config.omdb.request_timeout_seconds.into())?;
        let provider: Arc<dyn MovieProvider> =
            Arc::new(OmdbClient::with_shared_client(http_client, &config.omdb));

        Self::with_provider(config, provider).await
    }

    /// Wires the state around an externally supplied upstream provider.
    /// Tests use this to stub the upstream.
    pub async fn with_provider(
        config: Config,
        provider: Arc<dyn MovieProvider>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let enricher = Arc::new(SearchEnricher::new(store.clone(), provider, &config.cache));
        let votes = VoteService::new(store.clone());

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            enricher,
            votes,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
