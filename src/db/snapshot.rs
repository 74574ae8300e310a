use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use crate::models::Snapshot;
use crate::utils::errors::StoreError;

/// Raw row as stored: (id, recorded_at micros, cad, mxn, cny, jpy, bitcoin)
type SnapshotRow = (String, i64, f64, f64, f64, f64, f64);

const SELECT_COLUMNS: &str =
    "SELECT id, recorded_at, usd_to_cad, usd_to_mxn, usd_to_cny, usd_to_jpy, bitcoin_price FROM snapshot";

/// Convert a stored row back into a snapshot
fn row_to_snapshot(row: SnapshotRow) -> Result<Snapshot, StoreError> {
    let (id, recorded_at, rate_cad, rate_mxn, rate_cny, rate_jpy, bitcoin_price) = row;
    let timestamp = DateTime::<Utc>::from_timestamp_micros(recorded_at).ok_or_else(|| {
        StoreError::CorruptRow {
            id: id.clone(),
            reason: format!("timestamp {} out of range", recorded_at),
        }
    })?;

    Ok(Snapshot {
        id,
        timestamp,
        rate_cad,
        rate_mxn,
        rate_cny,
        rate_jpy,
        bitcoin_price,
    })
}

/// Lower bound in stored units. Rounds up so a bound with sub-microsecond
/// precision never admits a row that lies before it.
fn micros_at_or_after(instant: DateTime<Utc>) -> i64 {
    let micros = instant.timestamp_micros();
    if instant.timestamp_subsec_nanos() % 1_000 != 0 {
        micros + 1
    } else {
        micros
    }
}

/// Add one snapshot row
pub async fn insert_snapshot(pool: &SqlitePool, snapshot: &Snapshot) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO snapshot (id, recorded_at, usd_to_cad, usd_to_mxn, usd_to_cny, usd_to_jpy, bitcoin_price) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&snapshot.id)
    .bind(snapshot.timestamp.timestamp_micros())
    .bind(snapshot.rate_cad)
    .bind(snapshot.rate_mxn)
    .bind(snapshot.rate_cny)
    .bind(snapshot.rate_jpy)
    .bind(snapshot.bitcoin_price)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get snapshots recorded at or after `since`, oldest first.
/// Ties on the timestamp fall back to insertion order.
pub async fn get_snapshots_since(
    pool: &SqlitePool,
    since: DateTime<Utc>,
) -> Result<Vec<Snapshot>, StoreError> {
    let sql = format!(
        "{} WHERE recorded_at >= ? ORDER BY recorded_at ASC, rowid ASC",
        SELECT_COLUMNS
    );
    let rows = sqlx::query_as::<_, SnapshotRow>(&sql)
        .bind(micros_at_or_after(since))
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(row_to_snapshot).collect()
}

/// Get every snapshot, newest first
pub async fn get_all_snapshots_desc(pool: &SqlitePool) -> Result<Vec<Snapshot>, StoreError> {
    let sql = format!("{} ORDER BY recorded_at DESC, rowid DESC", SELECT_COLUMNS);
    let rows = sqlx::query_as::<_, SnapshotRow>(&sql)
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(row_to_snapshot).collect()
}

/// Get the most recent snapshot, if any
pub async fn get_latest_snapshot(pool: &SqlitePool) -> Result<Option<Snapshot>, StoreError> {
    let sql = format!("{} ORDER BY recorded_at DESC, rowid DESC LIMIT 1", SELECT_COLUMNS);
    let row = sqlx::query_as::<_, SnapshotRow>(&sql)
        .fetch_optional(pool)
        .await?;

    row.map(row_to_snapshot).transpose()
}
