use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::models::Snapshot;
use crate::utils::errors::StoreError;

pub mod snapshot;

const CREATE_TABLES_SQL: &str = include_str!("../../migrations/create_tables.sql");

/// Open the SQLite connection pool and create tables
pub async fn init_db(database_url: &str) -> Result<SqlitePool, StoreError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Execute each statement of the schema file
async fn create_tables(pool: &SqlitePool) -> Result<(), StoreError> {
    for statement in CREATE_TABLES_SQL.split(';') {
        let trimmed = statement.trim();
        if trimmed.is_empty() {
            continue;
        }
        sqlx::raw_sql(trimmed)
            .execute(pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;
    }
    debug!("Schema applied");
    Ok(())
}

/// Append-only handle over the snapshot table.
///
/// Appends are serialized through `write_lock` so that concurrent writers are
/// linearized; reads go straight to the pool and may run alongside an append.
pub struct SnapshotStore {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl SnapshotStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Persist one snapshot. A single INSERT, so a record is either fully written or not at all.
    pub async fn append(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        snapshot::insert_snapshot(&self.pool, snapshot)
            .await
            .map_err(|e| {
                error!("Failed to append snapshot {}: {}", snapshot.id, e);
                StoreError::from(e)
            })
    }

    /// All snapshots with `timestamp >= since`, oldest first
    pub async fn query_since(&self, since: DateTime<Utc>) -> Result<Vec<Snapshot>, StoreError> {
        snapshot::get_snapshots_since(&self.pool, since).await
    }

    /// Every snapshot, newest first
    pub async fn query_all_desc(&self) -> Result<Vec<Snapshot>, StoreError> {
        snapshot::get_all_snapshots_desc(&self.pool).await
    }

    pub async fn latest(&self) -> Result<Option<Snapshot>, StoreError> {
        snapshot::get_latest_snapshot(&self.pool).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// In-memory store for tests. A single connection that never recycles, so the database survives.
#[cfg(test)]
pub async fn memory_store() -> SnapshotStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    create_tables(&pool).await.expect("Failed to create tables");
    SnapshotStore::new(pool)
}
