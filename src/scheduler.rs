//! Periodic ingestion task
//!
//! The scheduler owns a single background tokio task that fires an ingestion
//! tick every `interval`. Ticks run inline in the task loop, so a tick never
//! starts while the previous one is still in flight. Control (`pause`,
//! `resume`, `stop`) goes through a `watch` channel; a stop request is only
//! observed between ticks, which lets the current tick finish.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::models::Snapshot;
use crate::services::ingestion_service::IngestionService;
use crate::utils::errors::TickError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerStatus {
    Running,
    Paused,
    Stopped,
}

pub struct Scheduler {
    ingestion: Arc<IngestionService>,
    interval: Duration,
    state: watch::Sender<SchedulerStatus>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(ingestion: Arc<IngestionService>, interval: Duration) -> Self {
        let (state, _) = watch::channel(SchedulerStatus::Stopped);
        Self {
            ingestion,
            interval,
            state,
            handle: Mutex::new(None),
        }
    }

    /// Current state. A background task that has exited on its own reports `Stopped`.
    pub fn status(&self) -> SchedulerStatus {
        let exited = self
            .handle
            .try_lock()
            .map(|handle| handle.as_ref().is_some_and(|h| h.is_finished()))
            .unwrap_or(false);

        if exited && self.state.send_replace(SchedulerStatus::Stopped) != SchedulerStatus::Stopped {
            warn!("Scheduler task exited unexpectedly");
        }
        *self.state.borrow()
    }

    /// Spawn the background task. The first tick fires immediately.
    /// Calling `start` on a running scheduler does nothing.
    pub async fn start(&self) {
        let mut handle = self.handle.lock().await;
        if let Some(existing) = handle.as_ref() {
            if !existing.is_finished() {
                debug!("Scheduler already started");
                return;
            }
        }

        self.state.send_replace(SchedulerStatus::Running);
        let mut control = self.state.subscribe();
        let ingestion = Arc::clone(&self.ingestion);
        let period = self.interval;

        *handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let status = *control.borrow_and_update();
                        match status {
                            SchedulerStatus::Stopped => break,
                            SchedulerStatus::Paused => {
                                debug!("Scheduler paused, skipping tick");
                                continue;
                            }
                            SchedulerStatus::Running => ingestion.run_logged_tick().await,
                        }
                    }
                    changed = control.changed() => {
                        if changed.is_err() || *control.borrow_and_update() == SchedulerStatus::Stopped {
                            break;
                        }
                    }
                }
            }

            debug!("Scheduler task exited");
        }));

        info!("Scheduler started, ingesting every {:?}", period);
    }

    /// Skip ticks until `resume`. Only a running scheduler can be paused.
    pub fn pause(&self) -> bool {
        let paused = self.state.send_if_modified(|status| {
            if *status == SchedulerStatus::Running {
                *status = SchedulerStatus::Paused;
                true
            } else {
                false
            }
        });
        if paused {
            info!("Scheduler paused");
        }
        paused
    }

    pub fn resume(&self) -> bool {
        let resumed = self.state.send_if_modified(|status| {
            if *status == SchedulerStatus::Paused {
                *status = SchedulerStatus::Running;
                true
            } else {
                false
            }
        });
        if resumed {
            info!("Scheduler resumed");
        }
        resumed
    }

    /// Stop scheduling and wait for the background task, letting any in-flight tick finish.
    pub async fn stop(&self) {
        self.state.send_replace(SchedulerStatus::Stopped);

        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Scheduler task ended abnormally: {}", e);
            }
            info!("Scheduler stopped");
        }
    }

    /// Run a single tick now. Shares the non-overlap guard with timer ticks.
    pub async fn run_once(&self) -> Result<Snapshot, TickError> {
        self.ingestion.run_tick().await
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RateSource;
    use crate::db::{memory_store, SnapshotStore};
    use crate::models::ExchangeRates;
    use crate::services::ingestion_service::fakes::{FixedPrice, FixedRates};
    use crate::utils::errors::FetchError;

    const PERIOD: Duration = Duration::from_millis(25);

    async fn scheduler_with(rates: Arc<FixedRates>) -> (Arc<SnapshotStore>, Scheduler) {
        let store = Arc::new(memory_store().await);
        let ingestion = IngestionService::new(
            store.clone(),
            rates,
            Arc::new(FixedPrice::ok(64_000.0)),
        );
        (store, Scheduler::new(Arc::new(ingestion), PERIOD))
    }

    async fn count(store: &SnapshotStore) -> usize {
        store.query_all_desc().await.unwrap().len()
    }

    #[tokio::test]
    async fn test_start_ticks_and_stop_halts() {
        let (store, scheduler) = scheduler_with(Arc::new(FixedRates::ok())).await;
        assert_eq!(scheduler.status(), SchedulerStatus::Stopped);

        scheduler.start().await;
        assert_eq!(scheduler.status(), SchedulerStatus::Running);
        tokio::time::sleep(PERIOD * 4).await;

        scheduler.stop().await;
        assert_eq!(scheduler.status(), SchedulerStatus::Stopped);

        let written = count(&store).await;
        assert!(written >= 2, "expected at least 2 ticks, got {}", written);

        tokio::time::sleep(PERIOD * 3).await;
        assert_eq!(count(&store).await, written);
    }

    #[tokio::test]
    async fn test_failed_ticks_do_not_stop_the_schedule() {
        let rates = Arc::new(FixedRates::failing());
        let (store, scheduler) = scheduler_with(rates.clone()).await;

        scheduler.start().await;
        tokio::time::sleep(PERIOD * 4).await;
        scheduler.stop().await;

        assert!(rates.call_count() >= 2);
        assert_eq!(count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_failed_appends_do_not_stop_the_schedule() {
        let rates = Arc::new(FixedRates::ok());
        let (store, scheduler) = scheduler_with(rates.clone()).await;
        store.close().await;
        assert!(matches!(scheduler.run_once().await, Err(TickError::Store(_))));

        scheduler.start().await;
        tokio::time::sleep(PERIOD * 4).await;
        assert_eq!(scheduler.status(), SchedulerStatus::Running);
        scheduler.stop().await;

        assert!(rates.call_count() >= 3, "expected ticks after failed appends, got {}", rates.call_count());
    }

    struct PanickingRates;

    #[async_trait::async_trait]
    impl RateSource for PanickingRates {
        async fn fetch_rates(&self) -> Result<ExchangeRates, FetchError> {
            panic!("rate source blew up");
        }
    }

    #[tokio::test]
    async fn test_status_reports_stopped_after_task_dies() {
        let store = Arc::new(memory_store().await);
        let ingestion = IngestionService::new(
            store,
            Arc::new(PanickingRates),
            Arc::new(FixedPrice::ok(64_000.0)),
        );
        let scheduler = Scheduler::new(Arc::new(ingestion), PERIOD);

        scheduler.start().await;
        tokio::time::sleep(PERIOD * 2).await;

        assert_eq!(scheduler.status(), SchedulerStatus::Stopped);
        assert!(!scheduler.pause());
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_pause_skips_ticks_until_resumed() {
        let (store, scheduler) = scheduler_with(Arc::new(FixedRates::ok())).await;
        assert!(!scheduler.pause());

        scheduler.start().await;
        tokio::time::sleep(PERIOD / 2).await;
        assert!(scheduler.pause());
        assert_eq!(scheduler.status(), SchedulerStatus::Paused);
        tokio::time::sleep(PERIOD / 2).await;

        let while_paused = count(&store).await;
        tokio::time::sleep(PERIOD * 3).await;
        assert_eq!(count(&store).await, while_paused);

        assert!(scheduler.resume());
        tokio::time::sleep(PERIOD * 3).await;
        scheduler.stop().await;
        assert!(count(&store).await > while_paused);
    }

    #[tokio::test]
    async fn test_start_twice_and_stop_twice_are_harmless() {
        let (_store, scheduler) = scheduler_with(Arc::new(FixedRates::ok())).await;
        scheduler.start().await;
        scheduler.start().await;
        scheduler.stop().await;
        scheduler.stop().await;
        assert_eq!(scheduler.status(), SchedulerStatus::Stopped);
    }

    #[tokio::test]
    async fn test_run_once_appends_immediately() {
        let (store, scheduler) = scheduler_with(Arc::new(FixedRates::ok())).await;
        let snapshot = scheduler.run_once().await.unwrap();
        let stored = store.latest().await.unwrap().unwrap();
        assert_eq!(stored.id, snapshot.id);
    }
}
