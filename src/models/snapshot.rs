//! Snapshot models

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// USD-denominated exchange rates for the four tracked currencies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub cad: f64,
    pub mxn: f64,
    pub cny: f64,
    pub jpy: f64,
}

/// One timestamped reading of all five tracked series.
///
/// Snapshots are immutable once built; `id` is an opaque key assigned at
/// construction and never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub rate_cad: f64,
    pub rate_mxn: f64,
    pub rate_cny: f64,
    pub rate_jpy: f64,
    pub bitcoin_price: f64,
}

impl Snapshot {
    /// Build a snapshot stamped with `timestamp` and a fresh id.
    /// The store keeps microsecond precision, so the timestamp is truncated to match.
    pub fn new(timestamp: DateTime<Utc>, rates: ExchangeRates, bitcoin_price: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: timestamp.trunc_subsecs(6),
            rate_cad: rates.cad,
            rate_mxn: rates.mxn,
            rate_cny: rates.cny,
            rate_jpy: rates.jpy,
            bitcoin_price,
        }
    }
}
