//! Historical query models

use chrono::Duration;
use serde::Serialize;

/// Canonical query windows ending at "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Day,
    Week,
    Month,
}

impl Window {
    pub fn duration(&self) -> Duration {
        match self {
            Window::Day => Duration::hours(24),
            Window::Week => Duration::days(7),
            Window::Month => Duration::days(30),
        }
    }

    /// Timestamp format used for the `dates` series
    pub fn date_format(&self) -> &'static str {
        match self {
            Window::Day | Window::Week => "%Y-%m-%d %H:%M",
            Window::Month => "%Y-%m-%d",
        }
    }

    /// Human label used in "not found" messages
    pub fn label(&self) -> &'static str {
        match self {
            Window::Day => "24 hours",
            Window::Week => "7 days",
            Window::Month => "30 days",
        }
    }
}

/// Parallel series over a window. Every vector has the same length and
/// index `i` of each refers to the same snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSeries {
    pub dates: Vec<String>,
    pub cad: Vec<f64>,
    pub mxn: Vec<f64>,
    pub cny: Vec<f64>,
    pub jpy: Vec<f64>,
    pub bitcoin: Vec<f64>,
}
