//! Live data models

use serde::Serialize;

use super::Trend;

/// Live value for one series, compared against the last stored snapshot when available
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyReading {
    pub current: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

impl CurrencyReading {
    pub fn new(current: f64, previous: Option<f64>) -> Self {
        Self {
            current,
            previous,
            trend: previous.map(|p| Trend::between(p, current)),
            analysis: None,
        }
    }

    /// Reading for a USD exchange rate, with a plain-language note on the trend when there is one
    pub fn for_currency(code: &str, current: f64, previous: Option<f64>) -> Self {
        let mut reading = Self::new(current, previous);
        reading.analysis = reading.trend.map(|trend| usd_analysis(code, trend));
        reading
    }
}

fn usd_analysis(code: &str, trend: Trend) -> String {
    match trend {
        Trend::Strengthening => format!(
            "The USD is strengthening vs. {}. This may benefit consumers but hurt exporters.",
            code
        ),
        Trend::Weakening => format!("The USD is weakening vs. {}. Exporters might benefit.", code),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentData {
    #[serde(rename = "CAD")]
    pub cad: CurrencyReading,
    #[serde(rename = "MXN")]
    pub mxn: CurrencyReading,
    #[serde(rename = "CNY")]
    pub cny: CurrencyReading,
    #[serde(rename = "JPY")]
    pub jpy: CurrencyReading,
    #[serde(rename = "Bitcoin")]
    pub bitcoin: CurrencyReading,
}
