//! In-memory store for tests and local development.
//!
//! Mimics the backend constraints the client relies on: the movement label
//! check, foreign keys from movements to items and collaborators, and
//! (optionally) a non-negative balance trigger. Failures can be scripted per
//! operation to exercise error paths.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use materials_auth::{Invite, InviteDraft, Profile, Role};
use materials_core::{CollaboratorId, InviteId, ItemId, MovementId, UserId};
use materials_inventory::{
    balance_of, balances, join_balances, Collaborator, CollaboratorDraft, HistoryEntry, Item,
    ItemDraft, MoveDirection, Movement, MovementRow, ReceiverTotal, StockLevel,
};

use super::{
    CatalogRef, CatalogStore, DirectoryStore, LedgerStore, StoreError, StoreResult,
    CHECK_VIOLATION, FOREIGN_KEY_VIOLATION, RAISE_EXCEPTION,
};
use crate::changes::{ChangeNotice, ChangeSender};

/// Operations that can have failures scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    InsertMovement,
    ItemBalance,
    StockLevels,
    MovementsSince,
    SaveCatalog,
    Delete,
    SetActive,
    ProfileRole,
    Directory,
}

#[derive(Debug, Clone)]
struct StoredProfile {
    label: String,
    full_name: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    items: Vec<Item>,
    collaborators: Vec<Collaborator>,
    movements: Vec<Movement>,
    profiles: HashMap<UserId, StoredProfile>,
    invites: Vec<Invite>,
    failures: HashMap<StoreOp, VecDeque<StoreError>>,
    attempted_labels: Vec<String>,
}

impl State {
    fn take_failure(&mut self, op: StoreOp) -> StoreResult<()> {
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    fn collaborator(&self, id: CollaboratorId) -> Option<&Collaborator> {
        self.collaborators.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    accepted_labels: Option<HashSet<String>>,
    non_negative: bool,
    changes: Option<ChangeSender>,
}

impl InMemoryStore {
    /// Store accepting every movement label.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Restrict `stock_moves.move_type` to the given labels (exact match).
    pub fn accepting(mut self, labels: &[&str]) -> Self {
        self.accepted_labels = Some(labels.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Reject movements that would drive a balance negative, like a database trigger.
    pub fn with_non_negative_check(mut self) -> Self {
        self.non_negative = true;
        self
    }

    /// Publish change notices on successful writes.
    pub fn with_changes(mut self, sender: ChangeSender) -> Self {
        self.changes = Some(sender);
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, notice: ChangeNotice) {
        if let Some(changes) = &self.changes {
            changes.notify(notice);
        }
    }

    /// Queue a failure returned by the next call of `op`.
    pub fn fail_next(&self, op: StoreOp, err: StoreError) {
        self.lock().failures.entry(op).or_default().push_back(err);
    }

    pub fn seed_item(&self, item: Item) {
        self.lock().items.push(item);
    }

    pub fn seed_collaborator(&self, collaborator: Collaborator) {
        self.lock().collaborators.push(collaborator);
    }

    /// Insert a movement directly, bypassing constraints (history fixtures).
    pub fn seed_movement(&self, movement: Movement) {
        self.lock().movements.push(movement);
    }

    pub fn seed_profile(&self, user_id: UserId, label: &str, full_name: Option<&str>) {
        self.lock().profiles.insert(
            user_id,
            StoredProfile {
                label: label.to_string(),
                full_name: full_name.map(str::to_string),
                created_at: Utc::now(),
            },
        );
    }

    /// Labels tried by `insert_movement`, accepted or not, in call order.
    pub fn attempted_labels(&self) -> Vec<String> {
        self.lock().attempted_labels.clone()
    }

    pub fn movements(&self) -> Vec<Movement> {
        self.lock().movements.clone()
    }

    pub fn item(&self, id: ItemId) -> Option<Item> {
        self.lock().find_item(id).cloned()
    }

    pub fn collaborator(&self, id: CollaboratorId) -> Option<Collaborator> {
        self.lock().collaborator(id).cloned()
    }
}

fn fk_error(table: &str, referenced: &str) -> StoreError {
    StoreError::with_code(
        FOREIGN_KEY_VIOLATION,
        format!("update or delete on table \"{referenced}\" violates foreign key constraint on table \"{table}\""),
    )
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn items(&self) -> StoreResult<Vec<Item>> {
        let mut items = self.lock().items.clone();
        items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    async fn collaborators(&self) -> StoreResult<Vec<Collaborator>> {
        let mut collaborators = self.lock().collaborators.clone();
        collaborators.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collaborators)
    }

    async fn save_item(&self, draft: &ItemDraft) -> StoreResult<Item> {
        let saved = {
            let mut state = self.lock();
            state.take_failure(StoreOp::SaveCatalog)?;
            match draft.id {
                None => {
                    let item = draft.clone().into_item(ItemId::new());
                    state.items.push(item.clone());
                    item
                }
                Some(id) => {
                    let slot = state
                        .items
                        .iter_mut()
                        .find(|i| i.id == id)
                        .ok_or_else(|| StoreError::not_found(format!("item {id} not found")))?;
                    *slot = draft.clone().into_item(id);
                    slot.clone()
                }
            }
        };
        self.publish(ChangeNotice::Items);
        Ok(saved)
    }

    async fn save_collaborator(&self, draft: &CollaboratorDraft) -> StoreResult<Collaborator> {
        let mut state = self.lock();
        state.take_failure(StoreOp::SaveCatalog)?;
        match draft.id {
            None => {
                let collaborator = draft.clone().into_collaborator(CollaboratorId::new());
                state.collaborators.push(collaborator.clone());
                Ok(collaborator)
            }
            Some(id) => {
                let slot = state
                    .collaborators
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| StoreError::not_found(format!("collaborator {id} not found")))?;
                *slot = draft.clone().into_collaborator(id);
                Ok(slot.clone())
            }
        }
    }

    async fn delete(&self, target: CatalogRef) -> StoreResult<()> {
        {
            let mut state = self.lock();
            state.take_failure(StoreOp::Delete)?;
            match target {
                CatalogRef::Item(id) => {
                    if state.movements.iter().any(|m| m.item_id == id) {
                        return Err(fk_error("stock_moves", "items"));
                    }
                    state.items.retain(|i| i.id != id);
                }
                CatalogRef::Collaborator(id) => {
                    if state.movements.iter().any(|m| m.receiver_id == Some(id)) {
                        return Err(fk_error("stock_moves", "collaborators"));
                    }
                    state.collaborators.retain(|c| c.id != id);
                }
            }
        }
        if matches!(target, CatalogRef::Item(_)) {
            self.publish(ChangeNotice::Items);
        }
        Ok(())
    }

    async fn set_active(&self, target: CatalogRef, active: bool) -> StoreResult<()> {
        {
            let mut state = self.lock();
            state.take_failure(StoreOp::SetActive)?;
            match target {
                CatalogRef::Item(id) => {
                    if let Some(item) = state.items.iter_mut().find(|i| i.id == id) {
                        item.active = active;
                    }
                }
                CatalogRef::Collaborator(id) => {
                    if let Some(c) = state.collaborators.iter_mut().find(|c| c.id == id) {
                        c.active = active;
                    }
                }
            }
        }
        if matches!(target, CatalogRef::Item(_)) {
            self.publish(ChangeNotice::Items);
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn insert_movement(&self, row: &MovementRow) -> StoreResult<()> {
        {
            let mut state = self.lock();
            state.attempted_labels.push(row.move_type.clone());
            state.take_failure(StoreOp::InsertMovement)?;

            if let Some(accepted) = &self.accepted_labels {
                if !accepted.contains(&row.move_type) {
                    return Err(StoreError::with_code(
                        CHECK_VIOLATION,
                        "new row for relation \"stock_moves\" violates check constraint \"stock_moves_move_type_check\"",
                    ));
                }
            }
            if state.find_item(row.item_id).is_none() {
                return Err(fk_error("stock_moves", "items"));
            }
            if let Some(receiver) = row.receiver_id {
                if state.collaborator(receiver).is_none() {
                    return Err(fk_error("stock_moves", "collaborators"));
                }
            }

            let movement = Movement {
                id: MovementId::new(),
                created_at: Utc::now(),
                item_id: row.item_id,
                qty: row.qty,
                move_type: row.move_type.clone(),
                receiver_id: row.receiver_id,
                created_by: Some(row.created_by),
                note: row.note.clone(),
            };

            if self.non_negative && movement.direction() == Some(MoveDirection::Decrease) {
                let balance = balance_of(&state.movements, row.item_id);
                if balance - row.qty < 0 {
                    return Err(StoreError::with_code(
                        RAISE_EXCEPTION,
                        format!("insufficient balance: current balance {balance}, requested {}", row.qty),
                    ));
                }
            }

            state.movements.push(movement);
        }
        self.publish(ChangeNotice::Movements);
        Ok(())
    }

    async fn item_balance(&self, item_id: ItemId) -> StoreResult<Option<i64>> {
        let mut state = self.lock();
        state.take_failure(StoreOp::ItemBalance)?;
        if state.find_item(item_id).is_none() {
            return Ok(None);
        }
        Ok(Some(balance_of(&state.movements, item_id)))
    }

    async fn stock_levels(&self) -> StoreResult<Vec<StockLevel>> {
        let mut state = self.lock();
        state.take_failure(StoreOp::StockLevels)?;
        let mut items = state.items.clone();
        items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        Ok(join_balances(&items, &balances(&state.movements)))
    }

    async fn movements_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Movement>> {
        let mut state = self.lock();
        state.take_failure(StoreOp::MovementsSince)?;
        let mut moves: Vec<Movement> = state
            .movements
            .iter()
            .filter(|m| m.created_at >= since)
            .cloned()
            .collect();
        moves.sort_by_key(|m| m.created_at);
        Ok(moves)
    }

    async fn history(&self) -> StoreResult<Vec<HistoryEntry>> {
        let state = self.lock();
        let mut entries: Vec<HistoryEntry> = state
            .movements
            .iter()
            .map(|m| {
                let item = state.find_item(m.item_id);
                HistoryEntry {
                    created_at: m.created_at,
                    move_type: m.move_type.clone(),
                    category: item.map(|i| i.category.clone()).unwrap_or_default(),
                    item_name: item.map(|i| i.name.clone()).unwrap_or_default(),
                    qty: m.qty,
                    unit: item.map(|i| i.unit.clone()).unwrap_or_default(),
                    receiver: m
                        .receiver_id
                        .and_then(|r| state.collaborator(r))
                        .map(|c| c.name.clone())
                        .unwrap_or_default(),
                    actor: m
                        .created_by
                        .map(|u| {
                            state
                                .profiles
                                .get(&u)
                                .and_then(|p| p.full_name.clone())
                                .unwrap_or_else(|| u.to_string())
                        })
                        .unwrap_or_default(),
                    note: m.note.clone(),
                }
            })
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn receiver_ranking(&self) -> StoreResult<Vec<ReceiverTotal>> {
        let state = self.lock();
        let mut totals: HashMap<String, i64> = HashMap::new();
        for m in &state.movements {
            if m.direction() != Some(MoveDirection::Decrease) {
                continue;
            }
            let Some(receiver) = m.receiver_id.and_then(|r| state.collaborator(r)) else {
                continue;
            };
            *totals.entry(receiver.name.clone()).or_insert(0) += m.qty.abs();
        }
        let mut ranking: Vec<ReceiverTotal> = totals
            .into_iter()
            .map(|(receiver, total)| ReceiverTotal { receiver, total })
            .collect();
        ranking.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.receiver.cmp(&b.receiver)));
        Ok(ranking)
    }
}

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn profile_role(&self, user_id: UserId) -> StoreResult<Option<String>> {
        let mut state = self.lock();
        state.take_failure(StoreOp::ProfileRole)?;
        Ok(state.profiles.get(&user_id).map(|p| p.label.clone()))
    }

    async fn profiles(&self) -> StoreResult<Vec<Profile>> {
        let mut state = self.lock();
        state.take_failure(StoreOp::Directory)?;
        let mut profiles: Vec<Profile> = state
            .profiles
            .iter()
            .map(|(user_id, p)| Profile {
                user_id: *user_id,
                full_name: p.full_name.clone(),
                role: Role::parse(&p.label).unwrap_or(Role::Viewer),
                created_at: Some(p.created_at),
            })
            .collect();
        profiles.sort_by_key(|p| (p.created_at, p.user_id));
        Ok(profiles)
    }

    async fn update_role(&self, user_id: UserId, role: Role) -> StoreResult<()> {
        let mut state = self.lock();
        state.take_failure(StoreOp::Directory)?;
        let profile = state
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::not_found(format!("profile {user_id} not found")))?;
        profile.label = role.storage_label().to_string();
        Ok(())
    }

    async fn invites(&self) -> StoreResult<Vec<Invite>> {
        let mut state = self.lock();
        state.take_failure(StoreOp::Directory)?;
        let mut invites = state.invites.clone();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invites)
    }

    async fn create_invite(&self, draft: &InviteDraft) -> StoreResult<Invite> {
        let mut state = self.lock();
        state.take_failure(StoreOp::Directory)?;
        if state.invites.iter().any(|i| i.email == draft.email && i.is_pending()) {
            return Err(StoreError::with_code(
                "23505",
                format!("duplicate key value violates unique constraint (email)=({})", draft.email),
            ));
        }
        let invite = Invite {
            id: InviteId::new(),
            email: draft.email.clone(),
            role: draft.role,
            created_at: Utc::now(),
            used_at: None,
            created_by: Some(draft.created_by),
        };
        state.invites.push(invite.clone());
        Ok(invite)
    }

    async fn delete_invite(&self, id: InviteId) -> StoreResult<()> {
        let mut state = self.lock();
        state.take_failure(StoreOp::Directory)?;
        state.invites.retain(|i| i.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreErrorKind;
    use materials_inventory::MovementRequest;
    use materials_inventory::Quantity;

    fn item(name: &str) -> Item {
        Item {
            id: ItemId::new(),
            category: "EPI".to_string(),
            name: name.to_string(),
            sku: None,
            unit: "PAR".to_string(),
            min_stock: 0,
            active: true,
        }
    }

    #[tokio::test]
    async fn label_check_rejects_with_check_violation() {
        let store = InMemoryStore::new().accepting(&["ENTRADA"]);
        let gloves = item("Luva");
        store.seed_item(gloves.clone());
        let req = MovementRequest::entry(gloves.id, Quantity::new(1).unwrap(), UserId::new(), None);

        let err = store.insert_movement(&req.with_label("IN")).await.unwrap_err();
        assert!(err.is_allowed_value_rejection());
        store.insert_movement(&req.with_label("ENTRADA")).await.unwrap();
        assert_eq!(store.attempted_labels(), vec!["IN", "ENTRADA"]);
    }

    #[tokio::test]
    async fn referenced_item_cannot_be_hard_deleted() {
        let store = InMemoryStore::new();
        let gloves = item("Luva");
        store.seed_item(gloves.clone());
        let req = MovementRequest::entry(gloves.id, Quantity::new(2).unwrap(), UserId::new(), None);
        store.insert_movement(&req.with_label("IN")).await.unwrap();

        let err = store.delete(CatalogRef::Item(gloves.id)).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::ForeignKeyViolation);
        assert_eq!(store.item_balance(gloves.id).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let store = InMemoryStore::new();
        store.fail_next(StoreOp::ItemBalance, StoreError::transport("offline"));
        let id = ItemId::new();
        assert!(store.item_balance(id).await.is_err());
        assert_eq!(store.item_balance(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn non_negative_trigger_rejects_overdraw() {
        let store = InMemoryStore::new().with_non_negative_check();
        let gloves = item("Luva");
        let ana = Collaborator {
            id: CollaboratorId::new(),
            name: "Ana".to_string(),
            sector: None,
            active: true,
        };
        store.seed_item(gloves.clone());
        store.seed_collaborator(ana.clone());

        let req = MovementRequest::exit(
            gloves.id,
            Quantity::new(1).unwrap(),
            UserId::new(),
            Some(ana.id),
            None,
        )
        .unwrap();
        let err = store.insert_movement(&req.with_label("OUT")).await.unwrap_err();
        assert_eq!(err.code.as_deref(), Some(RAISE_EXCEPTION));
        assert!(!err.is_allowed_value_rejection());
    }
}
