//! Role resolution (fail-closed, uncached).

use async_trait::async_trait;

use materials_core::UserId;

use crate::{Principal, Role, SessionContext};

/// Source of profile role labels (the `profiles` table in production).
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    type Error: core::fmt::Display + Send;

    /// Raw role label for a user, or `None` when no profile row exists.
    async fn role_label(&self, user_id: UserId) -> Result<Option<String>, Self::Error>;
}

/// Resolves a principal's role on every call.
///
/// There is deliberately no memoization: a role changed by an administrator
/// must be visible on the next independent resolution.
#[derive(Debug, Clone)]
pub struct RoleResolver<L> {
    lookup: L,
}

impl<L: ProfileLookup> RoleResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Resolve the role for an optional principal.
    ///
    /// Missing principal, missing profile, unknown label and lookup failure
    /// all resolve to [`Role::Viewer`].
    pub async fn resolve(&self, principal: Option<&Principal>) -> Role {
        let Some(principal) = principal else {
            return Role::Viewer;
        };

        match self.lookup.role_label(principal.user_id).await {
            Ok(Some(label)) => Role::parse(&label).unwrap_or_else(|| {
                tracing::warn!(user_id = %principal.user_id, %label, "unknown role label; using VIEWER");
                Role::Viewer
            }),
            Ok(None) => Role::Viewer,
            Err(err) => {
                tracing::warn!(user_id = %principal.user_id, error = %err, "profile lookup failed; using VIEWER");
                Role::Viewer
            }
        }
    }

    /// Build a fresh session context for a page entry or operation.
    pub async fn session(&self, principal: Option<Principal>) -> SessionContext {
        match principal {
            Some(p) => {
                let role = self.resolve(Some(&p)).await;
                SessionContext::new(p, role)
            }
            None => SessionContext::anonymous(),
        }
    }
}
