use thiserror::Error;

use crate::{Permission, Role, SessionContext};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("no active session; sign in again")]
    NotAuthenticated,

    #[error("forbidden: role {role} lacks permission '{permission}'")]
    Forbidden { role: Role, permission: Permission },
}

/// Authorize a session for one operation.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(session: &SessionContext, required: Permission) -> Result<(), AuthzError> {
    if !session.is_authenticated() {
        return Err(AuthzError::NotAuthenticated);
    }

    let role = session.role();
    if role.grants(required) {
        Ok(())
    } else {
        tracing::debug!(%role, permission = %required, "permission denied");
        Err(AuthzError::Forbidden {
            role,
            permission: required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Principal;
    use materials_core::UserId;

    #[test]
    fn anonymous_session_is_rejected_before_role_check() {
        let err = authorize(&SessionContext::anonymous(), Permission::ViewStock).unwrap_err();
        assert_eq!(err, AuthzError::NotAuthenticated);
    }

    #[test]
    fn lead_may_record_exit_but_not_manage_items() {
        let session = SessionContext::new(Principal::new(UserId::new()), Role::Lead);
        assert!(authorize(&session, Permission::RecordExit).is_ok());

        match authorize(&session, Permission::ManageItems) {
            Err(AuthzError::Forbidden { role, permission }) => {
                assert_eq!(role, Role::Lead);
                assert_eq!(permission, Permission::ManageItems);
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn actor_requires_principal() {
        assert_eq!(
            SessionContext::anonymous().actor(),
            Err(AuthzError::NotAuthenticated)
        );
        let id = UserId::new();
        let session = SessionContext::new(Principal::new(id), Role::Viewer);
        assert_eq!(session.actor(), Ok(id));
    }
}
