use serde::{Deserialize, Serialize};

use materials_core::UserId;

use crate::{AuthzError, Permission, Role};

/// Identity of an authenticated principal, as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: Option<String>,
}

impl Principal {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Per-operation authorization context.
///
/// Built fresh on every page entry (the role is re-resolved each time) and
/// passed explicitly into guarded operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    principal: Option<Principal>,
    role: Role,
}

impl SessionContext {
    pub fn new(principal: Principal, role: Role) -> Self {
        Self {
            principal: Some(principal),
            role,
        }
    }

    /// No signed-in principal; always resolves to the least privileged role.
    pub fn anonymous() -> Self {
        Self {
            principal: None,
            role: Role::Viewer,
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Actor id recorded on movements and invites.
    pub fn actor(&self) -> Result<UserId, AuthzError> {
        self.principal
            .as_ref()
            .map(|p| p.user_id)
            .ok_or(AuthzError::NotAuthenticated)
    }

    pub fn require(&self, permission: Permission) -> Result<(), AuthzError> {
        crate::authorize(self, permission)
    }
}
