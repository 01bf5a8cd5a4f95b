//! Live dashboard view.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::watch;

use materials_auth::SessionContext;
use materials_infra::{ChangeFeed, Ledger, LedgerStore, ServiceError};
use materials_inventory::{DashboardSnapshot, DashboardWindow};

use crate::{ConnectivityState, OfflineMode, PageGeneration, RefreshScheduler};

/// What happened to a refresh result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// The page changed while the read was in flight; the result was dropped.
    Discarded,
}

/// Dashboard page state: the latest snapshot plus the refresh plumbing.
pub struct DashboardView<S: ?Sized> {
    ledger: Ledger<S>,
    session: SessionContext,
    window: DashboardWindow,
    generation: PageGeneration,
    connectivity: Mutex<OfflineMode>,
    latest: watch::Sender<Option<DashboardSnapshot>>,
}

impl<S: LedgerStore + ?Sized> DashboardView<S> {
    pub fn new(
        ledger: Ledger<S>,
        session: SessionContext,
        window: DashboardWindow,
        generation: PageGeneration,
    ) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            ledger,
            session,
            window,
            generation,
            connectivity: Mutex::new(OfflineMode::new()),
            latest,
        }
    }

    /// Receiver that observes every applied snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<DashboardSnapshot>> {
        self.latest.subscribe()
    }

    pub fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.latest.borrow().clone()
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }

    /// Recompute from fresh reads. Results for a page that has since been
    /// left are discarded.
    pub async fn refresh(&self) -> Result<RefreshOutcome, ServiceError> {
        let ticket = self.generation.ticket();
        let result = self.ledger.dashboard(&self.session, Utc::now(), self.window).await;
        if !ticket.is_current() {
            tracing::debug!(
                generation = ticket.issued(),
                failed = result.is_err(),
                "discarding stale dashboard result"
            );
            return Ok(RefreshOutcome::Discarded);
        }

        self.connectivity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(&result);

        let snapshot = result?;
        tracing::debug!(
            below_min = snapshot.kpis.below_min,
            movements_today = snapshot.kpis.movements_today,
            "dashboard refreshed"
        );
        self.latest.send_replace(Some(snapshot));
        Ok(RefreshOutcome::Applied)
    }

    /// Initial load, then coalesced refreshes until the feed closes or the
    /// scheduler is shut down. Refresh failures are logged, not fatal.
    pub async fn watch<F: ChangeFeed>(&self, feed: F, scheduler: &RefreshScheduler) -> usize {
        self.refresh_logged().await;
        scheduler.run(feed, || self.refresh_logged()).await
    }

    async fn refresh_logged(&self) {
        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "dashboard refresh failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use materials_auth::{Principal, Role};
    use materials_core::{ItemId, UserId};
    use materials_infra::{InMemoryStore, StoreError, StoreOp, StoreResult};
    use materials_inventory::{HistoryEntry, Item, Movement, MovementRow, ReceiverTotal, StockLevel};

    /// Delays the stock read so navigation can happen mid-flight.
    struct SlowStore(InMemoryStore);

    #[async_trait]
    impl LedgerStore for SlowStore {
        async fn insert_movement(&self, row: &MovementRow) -> StoreResult<()> {
            self.0.insert_movement(row).await
        }
        async fn item_balance(&self, item_id: ItemId) -> StoreResult<Option<i64>> {
            self.0.item_balance(item_id).await
        }
        async fn stock_levels(&self) -> StoreResult<Vec<StockLevel>> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.0.stock_levels().await
        }
        async fn movements_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Movement>> {
            self.0.movements_since(since).await
        }
        async fn history(&self) -> StoreResult<Vec<HistoryEntry>> {
            self.0.history().await
        }
        async fn receiver_ranking(&self) -> StoreResult<Vec<ReceiverTotal>> {
            self.0.receiver_ranking().await
        }
    }

    fn viewer() -> SessionContext {
        SessionContext::new(Principal::new(UserId::new()), Role::Viewer)
    }

    fn view(generation: PageGeneration) -> DashboardView<SlowStore> {
        view_over(InMemoryStore::new(), generation)
    }

    fn view_over(store: InMemoryStore, generation: PageGeneration) -> DashboardView<SlowStore> {
        store.seed_item(Item {
            id: ItemId::new(),
            category: "EPI".to_string(),
            name: "Bota".to_string(),
            sku: None,
            unit: "PAR".to_string(),
            min_stock: 1,
            active: true,
        });
        DashboardView::new(
            Ledger::new(Arc::new(SlowStore(store))),
            viewer(),
            DashboardWindow::default(),
            generation,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_applies_current_results() {
        let view = view(PageGeneration::new());
        let mut rx = view.subscribe();

        assert_eq!(view.refresh().await.unwrap(), RefreshOutcome::Applied);
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone().unwrap();
        assert_eq!(snapshot.kpis.below_min, 1);
        assert_eq!(snapshot.daily.len(), 14);
        assert_eq!(view.connectivity(), ConnectivityState::Online);
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_during_read_discards_the_result() {
        let generation = PageGeneration::new();
        let view = Arc::new(view(generation.clone()));

        let in_flight = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        generation.advance();

        assert_eq!(in_flight.await.unwrap().unwrap(), RefreshOutcome::Discarded);
        assert!(view.snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_after_navigation_is_discarded_too() {
        let generation = PageGeneration::new();
        let store = InMemoryStore::new();
        store.fail_next(StoreOp::StockLevels, StoreError::transport("connection reset"));
        let view = Arc::new(view_over(store, generation.clone()));

        let in_flight = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        generation.advance();

        assert_eq!(in_flight.await.unwrap().unwrap(), RefreshOutcome::Discarded);
        assert_eq!(view.connectivity(), ConnectivityState::Online);
        assert!(view.snapshot().is_none());
    }
}
