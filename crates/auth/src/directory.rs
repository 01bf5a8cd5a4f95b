//! User directory rows: profiles and pending invites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use materials_core::{DomainError, DomainResult, InviteId, UserId};

use crate::Role;

/// One row of `profiles`. Exactly one role per principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "role_or_viewer")]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.user_id.to_string(),
        }
    }
}

/// One row of `user_invites`. Consumption (`used_at`) happens outside this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub id: InviteId,
    pub email: String,
    #[serde(default, deserialize_with = "role_or_viewer")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<UserId>,
}

impl Invite {
    pub fn is_pending(&self) -> bool {
        self.used_at.is_none()
    }
}

/// Stored role label; missing, null or unknown labels read as VIEWER.
fn role_or_viewer<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label.as_deref().and_then(Role::parse).unwrap_or_default())
}

/// Insert payload for `user_invites`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteDraft {
    pub email: String,
    pub role: Role,
    pub created_by: UserId,
}

impl InviteDraft {
    /// Email is trimmed and lower-cased; it must contain `@`.
    pub fn new(email: &str, role: Role, created_by: UserId) -> DomainResult<Self> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("enter a valid email address"));
        }
        Ok(Self {
            email,
            role,
            created_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_email_is_normalized() {
        let draft = InviteDraft::new("  Ana@Example.COM ", Role::Lead, UserId::new()).unwrap();
        assert_eq!(draft.email, "ana@example.com");
        assert!(InviteDraft::new("ana.example.com", Role::Viewer, UserId::new()).is_err());
        assert!(InviteDraft::new("   ", Role::Viewer, UserId::new()).is_err());
    }

    #[test]
    fn profile_role_uses_storage_labels() {
        let json = serde_json::json!({
            "user_id": UserId::new().to_string(),
            "full_name": null,
            "role": "LIDER",
            "created_at": "2026-01-02T03:04:05Z"
        });
        let profile: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.role, Role::Lead);
        assert_eq!(profile.display_name(), profile.user_id.to_string());

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["role"], "LIDER");
    }

    #[test]
    fn unreadable_roles_decode_as_viewer() {
        let rows = serde_json::json!([
            { "user_id": UserId::new().to_string(), "role": null },
            { "user_id": UserId::new().to_string(), "role": "ROOT" },
            { "user_id": UserId::new().to_string() },
            { "user_id": UserId::new().to_string(), "role": "master" }
        ]);
        let profiles: Vec<Profile> = serde_json::from_value(rows).unwrap();
        let roles: Vec<Role> = profiles.iter().map(|p| p.role).collect();
        assert_eq!(roles, vec![Role::Viewer, Role::Viewer, Role::Viewer, Role::Admin]);

        let invite: Invite = serde_json::from_value(serde_json::json!({
            "id": InviteId::new().to_string(),
            "email": "ana@example.com",
            "role": "OWNER",
            "created_at": "2026-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(invite.role, Role::Viewer);
        assert!(invite.is_pending());
    }
}
