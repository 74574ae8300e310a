//! Data models for the tracker
//!
//! This module organizes the records persisted by the store and the
//! result structs returned by the query, statistics and live-data services.

pub mod snapshot;
pub mod history;
pub mod stats;
pub mod current;
pub mod news;

// Re-export commonly used types for convenience
pub use snapshot::{ExchangeRates, Snapshot};
pub use history::{HistoricalSeries, Window};
pub use stats::{SeriesStatistics, Trend, WindowStatistics};
pub use current::{CurrencyReading, CurrentData};
pub use news::Article;
