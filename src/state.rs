use std::sync::Arc;

use crate::api::{
    build_http_client, BitcoinPriceClient, ExchangeRateClient, NewsClient, PriceSource, RateSource,
};
use crate::config::Config;
use crate::db::SnapshotStore;
use crate::scheduler::Scheduler;
use crate::services::ingestion_service::IngestionService;
use crate::utils::{RateLimiter, ResponseCache};

/// Everything the HTTP layer and the scheduler share, built once at startup
/// and handed to route handlers through `axum::extract::State`.
pub struct AppContext {
    pub store: Arc<SnapshotStore>,
    pub scheduler: Scheduler,
    pub rate_source: Arc<dyn RateSource>,
    pub price_source: Arc<dyn PriceSource>,
    pub news: NewsClient,
    pub limiter: RateLimiter,
    pub cache: ResponseCache,
}

impl AppContext {
    /// Wire up the production providers from `config`
    pub fn new(config: &Config, store: SnapshotStore) -> Result<Arc<Self>, reqwest::Error> {
        let http_client = build_http_client(config.http_timeout)?;

        let rate_source: Arc<dyn RateSource> = Arc::new(ExchangeRateClient::new(
            http_client.clone(),
            config.exchange_rate_api_url.clone(),
        ));
        let price_source: Arc<dyn PriceSource> = Arc::new(BitcoinPriceClient::new(
            http_client.clone(),
            config.bitcoin_price_api_url.clone(),
        ));
        let news = NewsClient::new(
            http_client,
            config.news_api_url.clone(),
            config.news_api_key.clone(),
        );

        Ok(Self::with_sources(config, store, rate_source, price_source, news))
    }

    pub fn with_sources(
        config: &Config,
        store: SnapshotStore,
        rate_source: Arc<dyn RateSource>,
        price_source: Arc<dyn PriceSource>,
        news: NewsClient,
    ) -> Arc<Self> {
        let store = Arc::new(store);
        let ingestion = IngestionService::new(
            Arc::clone(&store),
            Arc::clone(&rate_source),
            Arc::clone(&price_source),
        );

        Arc::new(Self {
            store,
            scheduler: Scheduler::new(Arc::new(ingestion), config.ingest_interval),
            rate_source,
            price_source,
            news,
            limiter: RateLimiter::new(),
            cache: ResponseCache::new(config.cache_ttl),
        })
    }
}
