//! Movement type normalization.
//!
//! Deployments disagree on the spelling of `stock_moves.move_type`, so an
//! insert walks the direction's candidate labels in order until one is
//! accepted. Only an allowed-value rejection advances to the next label.

use materials_inventory::{candidates, MovementRequest};

use crate::store::{LedgerStore, StoreError, StoreResult};

/// A movement accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recorded {
    /// The label the store accepted.
    pub label: &'static str,
    /// Insert attempts made, the accepted one included.
    pub attempts: usize,
}

/// Insert `request`, trying candidate labels in fixed order.
///
/// Stops at the first accepted insert. Any failure other than an
/// allowed-value rejection is returned immediately; if every label is
/// rejected, the last rejection is returned.
pub async fn insert_with_candidates<S>(store: &S, request: &MovementRequest) -> StoreResult<Recorded>
where
    S: LedgerStore + ?Sized,
{
    let mut last_err: Option<StoreError> = None;

    for (index, label) in candidates(request.direction).iter().copied().enumerate() {
        let attempts = index + 1;
        match store.insert_movement(&request.with_label(label)).await {
            Ok(()) => {
                tracing::debug!(label, attempts, "movement label accepted");
                return Ok(Recorded { label, attempts });
            }
            Err(err) if err.is_allowed_value_rejection() => {
                tracing::debug!(label, code = ?err.code, "movement label rejected; trying next");
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_err.unwrap_or_else(|| StoreError::decode("no movement labels configured")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, StoreOp, CHECK_VIOLATION};
    use materials_core::{CollaboratorId, ItemId, UserId};
    use materials_inventory::{Collaborator, Item, Quantity, DECREASE_LABELS, INCREASE_LABELS};
    use proptest::prelude::*;

    fn seeded(store: &InMemoryStore) -> (ItemId, CollaboratorId) {
        let item = Item {
            id: ItemId::new(),
            category: "EPI".to_string(),
            name: "Luva".to_string(),
            sku: None,
            unit: "PAR".to_string(),
            min_stock: 0,
            active: true,
        };
        let receiver = Collaborator {
            id: CollaboratorId::new(),
            name: "Ana".to_string(),
            sector: None,
            active: true,
        };
        let ids = (item.id, receiver.id);
        store.seed_item(item);
        store.seed_collaborator(receiver);
        ids
    }

    fn entry(item: ItemId) -> MovementRequest {
        MovementRequest::entry(item, Quantity::new(5).unwrap(), UserId::new(), None)
    }

    #[tokio::test]
    async fn first_accepted_label_wins() {
        let store = InMemoryStore::new().accepting(&["IN", "OUT"]);
        let (item, _) = seeded(&store);

        let recorded = insert_with_candidates(&store, &entry(item)).await.unwrap();
        assert_eq!(recorded, Recorded { label: "IN", attempts: 1 });
        assert_eq!(store.attempted_labels(), vec!["IN"]);
    }

    #[tokio::test]
    async fn rejected_labels_advance_in_order() {
        let store = InMemoryStore::new().accepting(&["INPUT", "SAIDA"]);
        let (item, receiver) = seeded(&store);

        let recorded = insert_with_candidates(&store, &entry(item)).await.unwrap();
        assert_eq!(recorded, Recorded { label: "INPUT", attempts: 3 });

        let exit = MovementRequest::exit(item, Quantity::new(1).unwrap(), UserId::new(), Some(receiver), None)
            .unwrap();
        let recorded = insert_with_candidates(&store, &exit).await.unwrap();
        assert_eq!(recorded, Recorded { label: "SAIDA", attempts: 2 });

        assert_eq!(
            store.attempted_labels(),
            vec!["IN", "ENTRADA", "INPUT", "OUT", "SAIDA"]
        );
        assert_eq!(store.movements().len(), 2);
    }

    #[tokio::test]
    async fn other_failures_stop_immediately() {
        let store = InMemoryStore::new().accepting(&["ENTRY"]);
        let (item, _) = seeded(&store);
        store.fail_next(StoreOp::InsertMovement, StoreError::with_code(CHECK_VIOLATION, "bad label"));
        store.fail_next(StoreOp::InsertMovement, StoreError::with_code("42501", "permission denied for table stock_moves"));

        let err = insert_with_candidates(&store, &entry(item)).await.unwrap_err();
        assert_eq!(err.message, "permission denied for table stock_moves");
        assert_eq!(store.attempted_labels(), vec!["IN", "ENTRADA"]);
        assert!(store.movements().is_empty());
    }

    #[tokio::test]
    async fn exhaustion_returns_last_rejection() {
        let store = InMemoryStore::new().accepting(&["MOVE_IN"]);
        let (item, _) = seeded(&store);

        let err = insert_with_candidates(&store, &entry(item)).await.unwrap_err();
        assert!(err.is_allowed_value_rejection());
        assert_eq!(store.attempted_labels().len(), 5);
        assert_eq!(store.attempted_labels().last().map(String::as_str), Some("ENTRY"));
    }

    proptest! {
        #[test]
        fn attempts_track_the_accepted_label_position(index in 0usize..5, increase in any::<bool>()) {
            let labels = if increase { INCREASE_LABELS } else { DECREASE_LABELS };
            let store = InMemoryStore::new().accepting(&[labels[index]]);
            let (item, receiver) = seeded(&store);
            let request = if increase {
                entry(item)
            } else {
                MovementRequest::exit(item, Quantity::new(1).unwrap(), UserId::new(), Some(receiver), None)
                    .unwrap()
            };

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let recorded = runtime.block_on(insert_with_candidates(&store, &request)).unwrap();

            prop_assert_eq!(recorded.label, labels[index]);
            prop_assert_eq!(recorded.attempts, index + 1);
            prop_assert_eq!(store.attempted_labels(), labels[..=index].to_vec());
        }
    }
}
