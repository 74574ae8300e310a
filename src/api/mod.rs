//! Upstream data providers
//!
//! The ingestion pipeline only sees the `RateSource` and `PriceSource` traits,
//! so tests can swap the HTTP clients for in-memory fakes.

pub mod client;
pub mod models;

use async_trait::async_trait;

use crate::models::ExchangeRates;
use crate::utils::errors::FetchError;

pub use client::{build_http_client, BitcoinPriceClient, ExchangeRateClient, NewsClient};

/// Source of current USD exchange rates
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<ExchangeRates, FetchError>;
}

/// Source of the current USD bitcoin price
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_bitcoin_price(&self) -> Result<f64, FetchError>;
}
