//! Stock entries, exits and the read side of the ledger.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use materials_auth::{Permission, SessionContext};
use materials_core::{CollaboratorId, ItemId};
use materials_inventory::{
    check_decrease, DashboardSnapshot, DashboardWindow, HistoryEntry, MovementRequest, Quantity,
    ReceiverTotal, StockLevel,
};

use super::{insert_with_candidates, Recorded, ServiceError};
use crate::store::LedgerStore;

#[derive(Debug)]
pub struct Ledger<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for Ledger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore + ?Sized> Ledger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record a stock entry (increase).
    pub async fn record_entry(
        &self,
        session: &SessionContext,
        item_id: ItemId,
        quantity: Quantity,
        note: Option<String>,
    ) -> Result<Recorded, ServiceError> {
        session.require(Permission::RecordEntry)?;
        let actor = session.actor()?;
        let request = MovementRequest::entry(item_id, quantity, actor, note);

        let recorded = insert_with_candidates(self.store.as_ref(), &request).await?;
        tracing::info!(%item_id, qty = quantity.get(), label = recorded.label, "stock entry recorded");
        Ok(recorded)
    }

    /// Record a stock exit (decrease) to a receiving collaborator.
    ///
    /// The current balance is read first; a known balance lower than the
    /// requested quantity rejects the exit without writing. An unreadable
    /// balance does not block, and the store stays the final arbiter.
    pub async fn record_exit(
        &self,
        session: &SessionContext,
        item_id: ItemId,
        quantity: Quantity,
        receiver_id: Option<CollaboratorId>,
        note: Option<String>,
    ) -> Result<Recorded, ServiceError> {
        session.require(Permission::RecordExit)?;
        let actor = session.actor()?;
        let request = MovementRequest::exit(item_id, quantity, actor, receiver_id, note)?;

        let known = match self.store.item_balance(item_id).await {
            Ok(balance) => balance,
            Err(err) => {
                tracing::warn!(%item_id, error = %err, "balance unavailable; skipping pre-check");
                None
            }
        };
        if let Err(err) = check_decrease(known, quantity) {
            tracing::warn!(%item_id, qty = quantity.get(), ?known, "stock exit rejected locally");
            return Err(err.into());
        }

        let recorded = insert_with_candidates(self.store.as_ref(), &request).await?;
        tracing::info!(%item_id, qty = quantity.get(), label = recorded.label, "stock exit recorded");
        Ok(recorded)
    }

    pub async fn balance(
        &self,
        session: &SessionContext,
        item_id: ItemId,
    ) -> Result<Option<i64>, ServiceError> {
        session.require(Permission::ViewStock)?;
        Ok(self.store.item_balance(item_id).await?)
    }

    pub async fn stock(&self, session: &SessionContext) -> Result<Vec<StockLevel>, ServiceError> {
        session.require(Permission::ViewStock)?;
        Ok(self.store.stock_levels().await?)
    }

    pub async fn history(&self, session: &SessionContext) -> Result<Vec<HistoryEntry>, ServiceError> {
        session.require(Permission::ViewReports)?;
        Ok(self.store.history().await?)
    }

    pub async fn ranking(&self, session: &SessionContext) -> Result<Vec<ReceiverTotal>, ServiceError> {
        session.require(Permission::ViewReports)?;
        Ok(self.store.receiver_ranking().await?)
    }

    /// Fetch stock levels and the window's movements, then aggregate.
    pub async fn dashboard(
        &self,
        session: &SessionContext,
        now: DateTime<Utc>,
        window: DashboardWindow,
    ) -> Result<DashboardSnapshot, ServiceError> {
        session.require(Permission::ViewReports)?;
        let (stock, movements) = tokio::try_join!(
            self.store.stock_levels(),
            self.store.movements_since(window.start(now)),
        )?;
        Ok(window.compute(now, &stock, &movements))
    }
}
