//! Item and collaborator management.

use std::sync::Arc;

use materials_auth::{Permission, SessionContext};
use materials_core::{CollaboratorId, ItemId};
use materials_inventory::{Collaborator, CollaboratorDraft, Item, ItemDraft};

use super::{delete_or_deactivate, DeleteOutcome, ServiceError};
use crate::store::{CatalogRef, CatalogStore};

#[derive(Debug)]
pub struct Catalog<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for Catalog<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CatalogStore + ?Sized> Catalog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn items(&self, session: &SessionContext) -> Result<Vec<Item>, ServiceError> {
        session.require(Permission::ViewStock)?;
        Ok(self.store.items().await?)
    }

    pub async fn collaborators(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<Collaborator>, ServiceError> {
        session.require(Permission::ViewStock)?;
        Ok(self.store.collaborators().await?)
    }

    pub async fn save_item(
        &self,
        session: &SessionContext,
        draft: ItemDraft,
    ) -> Result<Item, ServiceError> {
        session.require(Permission::ManageItems)?;
        let draft = draft.normalize()?;
        let item = self.store.save_item(&draft).await?;
        tracing::info!(item_id = %item.id, label = %item.label(), "item saved");
        Ok(item)
    }

    pub async fn save_collaborator(
        &self,
        session: &SessionContext,
        draft: CollaboratorDraft,
    ) -> Result<Collaborator, ServiceError> {
        session.require(Permission::ManageCollaborators)?;
        let draft = draft.normalize()?;
        let collaborator = self.store.save_collaborator(&draft).await?;
        tracing::info!(collaborator_id = %collaborator.id, name = %collaborator.name, "collaborator saved");
        Ok(collaborator)
    }

    pub async fn delete_item(
        &self,
        session: &SessionContext,
        id: ItemId,
    ) -> Result<DeleteOutcome, ServiceError> {
        session.require(Permission::ManageItems)?;
        Ok(delete_or_deactivate(self.store.as_ref(), CatalogRef::Item(id)).await?)
    }

    pub async fn delete_collaborator(
        &self,
        session: &SessionContext,
        id: CollaboratorId,
    ) -> Result<DeleteOutcome, ServiceError> {
        session.require(Permission::ManageCollaborators)?;
        Ok(delete_or_deactivate(self.store.as_ref(), CatalogRef::Collaborator(id)).await?)
    }

    /// Re-activate or deactivate without deleting.
    pub async fn set_active(
        &self,
        session: &SessionContext,
        target: CatalogRef,
        active: bool,
    ) -> Result<(), ServiceError> {
        let permission = match target {
            CatalogRef::Item(_) => Permission::ManageItems,
            CatalogRef::Collaborator(_) => Permission::ManageCollaborators,
        };
        session.require(permission)?;
        self.store.set_active(target, active).await?;
        tracing::info!(%target, active, "catalog row status changed");
        Ok(())
    }
}
