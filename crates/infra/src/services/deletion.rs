//! Delete with deactivate-on-conflict fallback.

use crate::store::{CatalogRef, CatalogStore, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    HardDeleted,
    /// History still references the row; it was marked inactive instead.
    Deactivated,
}

impl core::fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::HardDeleted => f.write_str("deleted"),
            Self::Deactivated => f.write_str("deactivated (referenced by history)"),
        }
    }
}

/// Hard-delete `target`; on a referential-integrity rejection, set
/// `active = false` instead. Any other failure is returned as-is, and so is
/// a failure of the fallback update.
pub async fn delete_or_deactivate<S>(store: &S, target: CatalogRef) -> StoreResult<DeleteOutcome>
where
    S: CatalogStore + ?Sized,
{
    match store.delete(target).await {
        Ok(()) => {
            tracing::info!(%target, "catalog row deleted");
            Ok(DeleteOutcome::HardDeleted)
        }
        Err(err) if err.is_referential() => {
            tracing::warn!(%target, error = %err, "delete blocked by references; deactivating");
            store.set_active(target, false).await?;
            Ok(DeleteOutcome::Deactivated)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, LedgerStore, StoreError, StoreErrorKind, StoreOp};
    use materials_core::{ItemId, UserId};
    use materials_inventory::{Item, MovementRequest, Quantity};

    fn item() -> Item {
        Item {
            id: ItemId::new(),
            category: "EPI".to_string(),
            name: "Capacete".to_string(),
            sku: Some("CAP-01".to_string()),
            unit: "UN".to_string(),
            min_stock: 2,
            active: true,
        }
    }

    #[tokio::test]
    async fn unreferenced_row_is_removed() {
        let store = InMemoryStore::new();
        let helmet = item();
        store.seed_item(helmet.clone());

        let outcome = delete_or_deactivate(&store, CatalogRef::Item(helmet.id)).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::HardDeleted);
        assert!(store.item(helmet.id).is_none());
    }

    #[tokio::test]
    async fn referenced_row_is_deactivated() {
        let store = InMemoryStore::new();
        let helmet = item();
        store.seed_item(helmet.clone());
        let entry = MovementRequest::entry(helmet.id, Quantity::new(1).unwrap(), UserId::new(), None);
        store.insert_movement(&entry.with_label("IN")).await.unwrap();

        let outcome = delete_or_deactivate(&store, CatalogRef::Item(helmet.id)).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deactivated);
        assert_eq!(store.item(helmet.id).map(|i| i.active), Some(false));
    }

    #[tokio::test]
    async fn other_failures_do_not_fall_back() {
        let store = InMemoryStore::new();
        let helmet = item();
        store.seed_item(helmet.clone());
        store.fail_next(
            StoreOp::Delete,
            StoreError::with_code("42501", "permission denied for table items"),
        );

        let err = delete_or_deactivate(&store, CatalogRef::Item(helmet.id)).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::PermissionDenied);
        assert_eq!(store.item(helmet.id).map(|i| i.active), Some(true));
    }

    #[tokio::test]
    async fn failed_fallback_is_reported() {
        let store = InMemoryStore::new();
        let helmet = item();
        store.seed_item(helmet.clone());
        store.fail_next(StoreOp::Delete, StoreError::with_code("23503", "still referenced"));
        store.fail_next(StoreOp::SetActive, StoreError::transport("connection reset"));

        let err = delete_or_deactivate(&store, CatalogRef::Item(helmet.id)).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Transport);
    }
}
