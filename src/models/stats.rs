//! Trend statistics models

use serde::Serialize;

/// Direction of a series between its first and latest value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Strengthening,
    Weakening,
}

impl Trend {
    /// `Strengthening` only when `latest` is strictly above `first`
    pub fn between(first: f64, latest: f64) -> Self {
        if latest > first {
            Trend::Strengthening
        } else {
            Trend::Weakening
        }
    }
}

/// Summary of one series over a window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStatistics {
    pub first: f64,
    pub latest: f64,
    pub highest: f64,
    pub lowest: f64,
    pub percent_change: f64,
    pub trend: Trend,
}

/// Statistics for all five series, keyed the way the analysis endpoint reports them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStatistics {
    #[serde(rename = "USD_vs_CAD")]
    pub cad: SeriesStatistics,
    #[serde(rename = "USD_vs_MXN")]
    pub mxn: SeriesStatistics,
    #[serde(rename = "USD_vs_CNY")]
    pub cny: SeriesStatistics,
    #[serde(rename = "USD_vs_JPY")]
    pub jpy: SeriesStatistics,
    #[serde(rename = "Bitcoin")]
    pub bitcoin: SeriesStatistics,
}
