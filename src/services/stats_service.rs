use chrono::Duration;

use crate::db::SnapshotStore;
use crate::models::{SeriesStatistics, Snapshot, Trend, WindowStatistics};
use crate::services::history_service::window_snapshots;
use crate::utils::errors::{QueryError, StatsError};

/// Round to 2 decimal places, halves going to the even neighbour
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Compute first/latest/highest/lowest/percent change/trend over a chronologically ordered series.
///
/// Percent change is `(latest - first) / first * 100`, rounded to 2 places,
/// and is defined as 0 when `first` is 0.
pub fn compute_stats(values: &[f64]) -> Result<SeriesStatistics, StatsError> {
    let (&first, &latest) = match (values.first(), values.last()) {
        (Some(first), Some(latest)) => (first, latest),
        _ => return Err(StatsError::EmptySeries),
    };

    let highest = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = values.iter().copied().fold(f64::INFINITY, f64::min);

    let percent_change = if first != 0.0 {
        round2((latest - first) / first * 100.0)
    } else {
        0.0
    };

    Ok(SeriesStatistics {
        first,
        latest,
        highest,
        lowest,
        percent_change,
        trend: Trend::between(first, latest),
    })
}

/// Statistics for all five series of a non-empty, ordered slice
pub fn compute_window_stats(snapshots: &[Snapshot]) -> Result<WindowStatistics, StatsError> {
    let series = |field: fn(&Snapshot) -> f64| -> Vec<f64> { snapshots.iter().map(field).collect() };

    Ok(WindowStatistics {
        cad: compute_stats(&series(|s| s.rate_cad))?,
        mxn: compute_stats(&series(|s| s.rate_mxn))?,
        cny: compute_stats(&series(|s| s.rate_cny))?,
        jpy: compute_stats(&series(|s| s.rate_jpy))?,
        bitcoin: compute_stats(&series(|s| s.bitcoin_price))?,
    })
}

/// Statistics over `[now - duration, now]`. An empty window is `QueryError::NotFound`.
pub async fn stats_for_window(
    store: &SnapshotStore,
    duration: Duration,
) -> Result<WindowStatistics, QueryError> {
    let snapshots = window_snapshots(store, duration, "Not enough data for analysis").await?;
    // window_snapshots never returns an empty slice
    compute_window_stats(&snapshots)
        .map_err(|_| QueryError::NotFound("Not enough data for analysis".to_string()))
}
