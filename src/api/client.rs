use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{BitcoinPriceResponse, ExchangeRateResponse, NewsResponse};
use super::{PriceSource, RateSource};
use crate::models::{Article, ExchangeRates};
use crate::utils::errors::FetchError;

/// Build the shared HTTP client. Every upstream call inherits `timeout`.
pub fn build_http_client(timeout: Duration) -> Result<HttpClient, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("usd-tracker/", env!("CARGO_PKG_VERSION"))),
    );

    HttpClient::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
}

/// GET `request` and decode a JSON body, mapping non-2xx statuses to `FetchError::Status`
async fn get_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, FetchError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        warn!("Upstream error {}: {}", status.as_u16(), body_text);
        return Err(FetchError::Status(status.as_u16()));
    }

    Ok(response.json::<T>().await?)
}

/// Client for the USD exchange rate feed
pub struct ExchangeRateClient {
    http_client: HttpClient,
    url: String,
}

impl ExchangeRateClient {
    pub fn new(http_client: HttpClient, url: String) -> Self {
        Self { http_client, url }
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn fetch_rates(&self) -> Result<ExchangeRates, FetchError> {
        let response: ExchangeRateResponse = get_json(self.http_client.get(&self.url)).await?;
        let rates = response.into_rates()?;
        debug!(
            "Fetched rates CAD={} MXN={} CNY={} JPY={}",
            rates.cad, rates.mxn, rates.cny, rates.jpy
        );
        Ok(rates)
    }
}

/// Client for the bitcoin price feed.
///
/// Failures are returned as errors; a failed read is never reported as a price of zero.
pub struct BitcoinPriceClient {
    http_client: HttpClient,
    url: String,
}

impl BitcoinPriceClient {
    pub fn new(http_client: HttpClient, url: String) -> Self {
        Self { http_client, url }
    }
}

#[async_trait]
impl PriceSource for BitcoinPriceClient {
    async fn fetch_bitcoin_price(&self) -> Result<f64, FetchError> {
        let response: BitcoinPriceResponse = get_json(self.http_client.get(&self.url)).await?;
        let price = response.usd_price()?;
        debug!("Fetched bitcoin price {}", price);
        Ok(price)
    }
}

/// Client for the forex news search
pub struct NewsClient {
    http_client: HttpClient,
    url: String,
    api_key: String,
}

impl NewsClient {
    const QUERY: &'static str = "forex currency exchange";
    const PAGE_SIZE: &'static str = "5";

    pub fn new(http_client: HttpClient, url: String, api_key: String) -> Self {
        Self {
            http_client,
            url,
            api_key,
        }
    }

    /// Latest English-language forex articles, newest first
    pub async fn latest_articles(&self) -> Result<Vec<Article>, FetchError> {
        let request = self.http_client.get(&self.url).query(&[
            ("q", Self::QUERY),
            ("apiKey", self.api_key.as_str()),
            ("sortBy", "publishedAt"),
            ("language", "en"),
            ("pageSize", Self::PAGE_SIZE),
        ]);

        let response: NewsResponse = get_json(request).await?;
        Ok(response.articles)
    }
}
