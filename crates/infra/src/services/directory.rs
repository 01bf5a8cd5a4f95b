//! Profile roles and invitations.

use std::sync::Arc;

use materials_auth::{Invite, InviteDraft, Permission, Profile, Role, SessionContext};
use materials_core::{InviteId, UserId};

use super::ServiceError;
use crate::store::DirectoryStore;

#[derive(Debug)]
pub struct Directory<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for Directory<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DirectoryStore + ?Sized> Directory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn profiles(&self, session: &SessionContext) -> Result<Vec<Profile>, ServiceError> {
        session.require(Permission::ManageUsers)?;
        Ok(self.store.profiles().await?)
    }

    pub async fn invites(&self, session: &SessionContext) -> Result<Vec<Invite>, ServiceError> {
        session.require(Permission::ManageUsers)?;
        Ok(self.store.invites().await?)
    }

    pub async fn invite(
        &self,
        session: &SessionContext,
        email: &str,
        role: Role,
    ) -> Result<Invite, ServiceError> {
        session.require(Permission::ManageUsers)?;
        let draft = InviteDraft::new(email, role, session.actor()?)?;
        let invite = self.store.create_invite(&draft).await?;
        tracing::info!(invite_id = %invite.id, email = %invite.email, %role, "invite created");
        Ok(invite)
    }

    pub async fn uninvite(&self, session: &SessionContext, id: InviteId) -> Result<(), ServiceError> {
        session.require(Permission::ManageUsers)?;
        self.store.delete_invite(id).await?;
        tracing::info!(invite_id = %id, "invite removed");
        Ok(())
    }

    /// Change a profile's role. Takes effect on that user's next resolution.
    pub async fn set_role(
        &self,
        session: &SessionContext,
        user_id: UserId,
        role: Role,
    ) -> Result<(), ServiceError> {
        session.require(Permission::ManageUsers)?;
        self.store.update_role(user_id, role).await?;
        tracing::info!(%user_id, %role, "role updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, StoreErrorKind, StoreProfiles};
    use materials_auth::{Principal, RoleResolver};

    #[tokio::test]
    async fn role_change_is_seen_on_next_resolution() {
        let store = Arc::new(InMemoryStore::new());
        let admin = UserId::new();
        let worker = UserId::new();
        store.seed_profile(admin, "MASTER", Some("Chefe"));
        store.seed_profile(worker, "VIEWER", None);

        let resolver = RoleResolver::new(StoreProfiles(Arc::clone(&store)));
        let directory = Directory::new(Arc::clone(&store));
        let worker_principal = Principal::new(worker);

        assert_eq!(resolver.resolve(Some(&worker_principal)).await, Role::Viewer);

        let admin_session = resolver.session(Some(Principal::new(admin))).await;
        assert_eq!(admin_session.role(), Role::Admin);
        directory.set_role(&admin_session, worker, Role::Lead).await.unwrap();

        assert_eq!(resolver.resolve(Some(&worker_principal)).await, Role::Lead);
    }

    #[tokio::test]
    async fn invites_are_normalized_and_admin_only() {
        let store = Arc::new(InMemoryStore::new());
        let directory = Directory::new(Arc::clone(&store));
        let admin = SessionContext::new(Principal::new(UserId::new()), Role::Admin);
        let lead = SessionContext::new(Principal::new(UserId::new()), Role::Lead);

        let invite = directory.invite(&admin, " Bia@Example.com", Role::Lead).await.unwrap();
        assert_eq!(invite.email, "bia@example.com");
        assert!(invite.is_pending());

        let err = directory.invite(&admin, "bia@example.com", Role::Viewer).await.unwrap_err();
        match err {
            ServiceError::Store(e) => assert_eq!(e.kind, StoreErrorKind::Rejected),
            other => panic!("unexpected {other:?}"),
        }

        assert!(directory.invites(&lead).await.is_err());
        directory.uninvite(&admin, invite.id).await.unwrap();
        assert!(directory.invites(&admin).await.unwrap().is_empty());
    }
}
