use std::collections::HashMap;

use serde::Deserialize;

use crate::models::{Article, ExchangeRates};
use crate::utils::errors::FetchError;

/// Response from the exchange rate endpoint (`/v4/latest/USD`)
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRateResponse {
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

impl ExchangeRateResponse {
    /// Pick out the four tracked currencies. Any missing or non-positive rate fails the whole read.
    pub fn into_rates(self) -> Result<ExchangeRates, FetchError> {
        let pick = |code: &'static str| -> Result<f64, FetchError> {
            let value = *self.rates.get(code).ok_or(FetchError::MissingField(code))?;
            require_positive(code, value)
        };

        Ok(ExchangeRates {
            cad: pick("CAD")?,
            mxn: pick("MXN")?,
            cny: pick("CNY")?,
            jpy: pick("JPY")?,
        })
    }
}

/// One entry of the `bpi` map
#[derive(Debug, Clone, Deserialize)]
pub struct BpiEntry {
    pub rate_float: Option<f64>,
}

/// Response from the bitcoin price endpoint (`currentprice.json`)
#[derive(Debug, Clone, Deserialize)]
pub struct BitcoinPriceResponse {
    #[serde(default)]
    pub bpi: HashMap<String, BpiEntry>,
}

impl BitcoinPriceResponse {
    pub fn usd_price(&self) -> Result<f64, FetchError> {
        let price = self
            .bpi
            .get("USD")
            .and_then(|entry| entry.rate_float)
            .ok_or(FetchError::MissingField("bpi.USD.rate_float"))?;
        require_positive("bitcoin_price", price)
    }
}

/// Response from the news search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
}

fn require_positive(field: &'static str, value: f64) -> Result<f64, FetchError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FetchError::InvalidValue { field, value })
    }
}
