use chrono::{Duration, Utc};

use crate::db::SnapshotStore;
use crate::models::{HistoricalSeries, Snapshot, Window};
use crate::utils::errors::QueryError;

/// Split snapshots into parallel per-field series, formatting timestamps with `date_format`
pub fn build_series(snapshots: &[Snapshot], date_format: &str) -> HistoricalSeries {
    let n = snapshots.len();
    let mut series = HistoricalSeries {
        dates: Vec::with_capacity(n),
        cad: Vec::with_capacity(n),
        mxn: Vec::with_capacity(n),
        cny: Vec::with_capacity(n),
        jpy: Vec::with_capacity(n),
        bitcoin: Vec::with_capacity(n),
    };

    for snap in snapshots {
        series.dates.push(snap.timestamp.format(date_format).to_string());
        series.cad.push(snap.rate_cad);
        series.mxn.push(snap.rate_mxn);
        series.cny.push(snap.rate_cny);
        series.jpy.push(snap.rate_jpy);
        series.bitcoin.push(snap.bitcoin_price);
    }

    series
}

/// Snapshots in `[now - duration, now]`, oldest first. An empty window is `QueryError::NotFound`.
pub async fn window_snapshots(
    store: &SnapshotStore,
    duration: Duration,
    not_found_message: &str,
) -> Result<Vec<Snapshot>, QueryError> {
    let cutoff = Utc::now() - duration;
    let snapshots = store.query_since(cutoff).await?;

    if snapshots.is_empty() {
        return Err(QueryError::NotFound(not_found_message.to_string()));
    }

    Ok(snapshots)
}

/// Historical series over the last `duration`
pub async fn historical(
    store: &SnapshotStore,
    duration: Duration,
    date_format: &str,
) -> Result<HistoricalSeries, QueryError> {
    let snapshots = window_snapshots(store, duration, "No historical data available").await?;
    Ok(build_series(&snapshots, date_format))
}

/// Historical series over one of the canonical windows
pub async fn historical_for(
    store: &SnapshotStore,
    window: Window,
) -> Result<HistoricalSeries, QueryError> {
    historical(store, window.duration(), window.date_format())
        .await
        .map_err(|e| match e {
            QueryError::NotFound(_) => QueryError::NotFound(format!(
                "No historical data available for {}",
                window.label()
            )),
            other => other,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_store;
    use crate::models::ExchangeRates;

    fn snapshot_at(hours_ago: i64, base: f64) -> Snapshot {
        Snapshot::new(
            Utc::now() - Duration::hours(hours_ago),
            ExchangeRates {
                cad: 1.3 + base,
                mxn: 17.0 + base,
                cny: 7.1 + base,
                jpy: 148.0 + base,
            },
            60_000.0 + base,
        )
    }

    #[tokio::test]
    async fn test_empty_store_is_not_found() {
        let store = memory_store().await;
        let result = historical_for(&store, Window::Day).await;
        match result {
            Err(QueryError::NotFound(msg)) => {
                assert_eq!(msg, "No historical data available for 24 hours")
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_window_excludes_older_snapshots() {
        let store = memory_store().await;
        for (hours_ago, base) in [(200, 0.0), (48, 0.1), (5, 0.2), (1, 0.3)] {
            store.append(&snapshot_at(hours_ago, base)).await.unwrap();
        }

        let day = historical_for(&store, Window::Day).await.unwrap();
        assert_eq!(day.dates.len(), 2);
        assert_eq!(day.cad, vec![1.3 + 0.2, 1.3 + 0.3]);
        assert_eq!(day.bitcoin, vec![60_000.0 + 0.2, 60_000.0 + 0.3]);

        let week = historical_for(&store, Window::Week).await.unwrap();
        assert_eq!(week.dates.len(), 3);

        let month = historical_for(&store, Window::Month).await.unwrap();
        assert_eq!(month.dates.len(), 4);
        assert_eq!(month.dates[0].len(), "2024-01-01".len());
    }

    #[tokio::test]
    async fn test_only_stale_data_is_not_found() {
        let store = memory_store().await;
        store.append(&snapshot_at(72, 0.0)).await.unwrap();

        assert!(matches!(
            historical(&store, Duration::hours(24), "%Y-%m-%d %H:%M").await,
            Err(QueryError::NotFound(_))
        ));
        assert!(historical(&store, Duration::days(7), "%Y-%m-%d %H:%M").await.is_ok());
    }

    #[test]
    fn test_series_are_aligned() {
        let snaps: Vec<_> = (0..7).map(|i| snapshot_at(7 - i, i as f64)).collect();
        let series = build_series(&snaps, "%Y-%m-%d %H:%M");

        let n = snaps.len();
        assert_eq!(series.dates.len(), n);
        assert_eq!(series.cad.len(), n);
        assert_eq!(series.mxn.len(), n);
        assert_eq!(series.cny.len(), n);
        assert_eq!(series.jpy.len(), n);
        assert_eq!(series.bitcoin.len(), n);
        for (i, snap) in snaps.iter().enumerate() {
            assert_eq!(series.jpy[i], snap.rate_jpy);
            assert_eq!(
                series.dates[i],
                snap.timestamp.format("%Y-%m-%d %H:%M").to_string()
            );
        }
    }
}
