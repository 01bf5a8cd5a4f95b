//! Store abstraction over the hosted backend.
//!
//! Three traits split the tables by concern; the production adapter
//! ([`PostgrestStore`]) and the in-memory adapter ([`InMemoryStore`])
//! implement all of them.

mod error;
mod in_memory;
mod postgrest;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use materials_auth::{Invite, InviteDraft, Profile, ProfileLookup, Role};
use materials_core::{CollaboratorId, InviteId, ItemId, UserId};
use materials_inventory::{
    Collaborator, CollaboratorDraft, HistoryEntry, Item, ItemDraft, Movement, MovementRow,
    ReceiverTotal, StockLevel,
};

pub use error::{
    StoreError, StoreErrorKind, StoreResult, CHECK_VIOLATION, FOREIGN_KEY_VIOLATION,
    INSUFFICIENT_PRIVILEGE, INVALID_TEXT_REPRESENTATION, RAISE_EXCEPTION,
};
pub use in_memory::{InMemoryStore, StoreOp};
pub use postgrest::PostgrestStore;

/// A catalog row addressed for deletion or (de)activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogRef {
    Item(ItemId),
    Collaborator(CollaboratorId),
}

impl CatalogRef {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Item(_) => "items",
            Self::Collaborator(_) => "collaborators",
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            Self::Item(id) => *id.as_uuid(),
            Self::Collaborator(id) => *id.as_uuid(),
        }
    }
}

impl core::fmt::Display for CatalogRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.table(), self.uuid())
    }
}

/// Items and collaborators.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All items, ordered by category then name.
    async fn items(&self) -> StoreResult<Vec<Item>>;

    /// All collaborators, ordered by name.
    async fn collaborators(&self) -> StoreResult<Vec<Collaborator>>;

    /// Insert (`draft.id == None`) or update an item; returns the stored row.
    async fn save_item(&self, draft: &ItemDraft) -> StoreResult<Item>;

    async fn save_collaborator(&self, draft: &CollaboratorDraft) -> StoreResult<Collaborator>;

    /// Hard delete. Fails with a referential error while history references the row.
    async fn delete(&self, target: CatalogRef) -> StoreResult<()>;

    async fn set_active(&self, target: CatalogRef, active: bool) -> StoreResult<()>;
}

/// Append-only movements and the derived views over them.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append one movement. The label in `row.move_type` may be rejected.
    async fn insert_movement(&self, row: &MovementRow) -> StoreResult<()>;

    /// Current balance from the per-item view; `None` when the view has no row.
    async fn item_balance(&self, item_id: ItemId) -> StoreResult<Option<i64>>;

    async fn stock_levels(&self) -> StoreResult<Vec<StockLevel>>;

    /// Movements created at or after `since`, oldest first.
    async fn movements_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Movement>>;

    async fn history(&self) -> StoreResult<Vec<HistoryEntry>>;

    async fn receiver_ranking(&self) -> StoreResult<Vec<ReceiverTotal>>;
}

/// Profiles and invites.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Raw stored role label for a user; `None` when no profile row exists.
    async fn profile_role(&self, user_id: UserId) -> StoreResult<Option<String>>;

    async fn profiles(&self) -> StoreResult<Vec<Profile>>;

    async fn update_role(&self, user_id: UserId, role: Role) -> StoreResult<()>;

    /// Invites, newest first.
    async fn invites(&self) -> StoreResult<Vec<Invite>>;

    async fn create_invite(&self, draft: &InviteDraft) -> StoreResult<Invite>;

    async fn delete_invite(&self, id: InviteId) -> StoreResult<()>;
}

/// Adapts a [`DirectoryStore`] to the role resolver's lookup seam.
#[derive(Debug)]
pub struct StoreProfiles<S: ?Sized>(pub Arc<S>);

impl<S: ?Sized> Clone for StoreProfiles<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

#[async_trait]
impl<S: DirectoryStore + ?Sized> ProfileLookup for StoreProfiles<S> {
    type Error = StoreError;

    async fn role_label(&self, user_id: UserId) -> Result<Option<String>, StoreError> {
        self.0.profile_role(user_id).await
    }
}
