use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{PriceSource, RateSource};
use crate::db::SnapshotStore;
use crate::models::Snapshot;
use crate::utils::errors::TickError;

/// Fetches one reading from both providers and appends it to the store.
///
/// `tick_lock` is held for the whole tick so two ticks never overlap. The
/// store's own write lock is only taken for the final append, never across
/// the network calls.
pub struct IngestionService {
    store: Arc<SnapshotStore>,
    rate_source: Arc<dyn RateSource>,
    price_source: Arc<dyn PriceSource>,
    tick_lock: Mutex<()>,
}

impl IngestionService {
    pub fn new(
        store: Arc<SnapshotStore>,
        rate_source: Arc<dyn RateSource>,
        price_source: Arc<dyn PriceSource>,
    ) -> Self {
        Self {
            store,
            rate_source,
            price_source,
            tick_lock: Mutex::new(()),
        }
    }

    /// Run one tick. On any fetch failure nothing is written.
    pub async fn run_tick(&self) -> Result<Snapshot, TickError> {
        let _tick = self.tick_lock.lock().await;

        let (rates, price) = tokio::join!(
            self.rate_source.fetch_rates(),
            self.price_source.fetch_bitcoin_price()
        );
        let rates = rates?;
        let bitcoin_price = price?;

        let snapshot = Snapshot::new(Utc::now(), rates, bitcoin_price);
        self.store.append(&snapshot).await?;

        debug!("Appended snapshot {} at {}", snapshot.id, snapshot.timestamp);
        Ok(snapshot)
    }

    /// Run one tick and log the outcome. Never fails, so the caller's loop keeps going.
    pub async fn run_logged_tick(&self) {
        match self.run_tick().await {
            Ok(snapshot) => info!(
                "Logged rates CAD={} MXN={} CNY={} JPY={} BTC={}",
                snapshot.rate_cad,
                snapshot.rate_mxn,
                snapshot.rate_cny,
                snapshot.rate_jpy,
                snapshot.bitcoin_price
            ),
            Err(TickError::Fetch(e)) => warn!("Tick abandoned, fetch failed: {}", e),
            Err(TickError::Store(e)) => warn!("Tick abandoned, append failed: {}", e),
        }
    }
}
