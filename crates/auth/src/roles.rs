use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Permission;

/// Access tier of a principal.
///
/// Variants are declared from least to most privileged, so `Ord` doubles as
/// the privilege ordering used by page gating. The default is the least
/// privileged role.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    #[default]
    Viewer,
    Lead,
    Admin,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role label '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Lead, Role::Viewer];

    /// Canonical display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Lead => "LEAD",
            Role::Viewer => "VIEWER",
        }
    }

    /// Label persisted in the `profiles.role` / `user_invites.role` columns.
    pub fn storage_label(&self) -> &'static str {
        match self {
            Role::Admin => "MASTER",
            Role::Lead => "LIDER",
            Role::Viewer => "VIEWER",
        }
    }

    /// Parse a stored or canonical label (case-insensitive, trimmed).
    pub fn parse(label: &str) -> Option<Role> {
        match label.trim().to_ascii_uppercase().as_str() {
            "ADMIN" | "MASTER" => Some(Role::Admin),
            "LEAD" | "LIDER" => Some(Role::Lead),
            "VIEWER" => Some(Role::Viewer),
            _ => None,
        }
    }

    /// Whether this role meets a page's minimum requirement.
    pub fn at_least(self, minimum: Role) -> bool {
        self >= minimum
    }

    /// Permissions granted to this role.
    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Role::Admin => &[
                Permission::ViewStock,
                Permission::ViewReports,
                Permission::RecordEntry,
                Permission::RecordExit,
                Permission::ManageItems,
                Permission::ManageCollaborators,
                Permission::ManageUsers,
            ],
            Role::Lead => &[
                Permission::ViewStock,
                Permission::ViewReports,
                Permission::RecordExit,
            ],
            Role::Viewer => &[Permission::ViewStock, Permission::ViewReports],
        }
    }

    pub fn grants(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.storage_label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_stored_and_canonical_labels() {
        assert_eq!(Role::parse("MASTER"), Some(Role::Admin));
        assert_eq!(Role::parse(" admin "), Some(Role::Admin));
        assert_eq!(Role::parse("LIDER"), Some(Role::Lead));
        assert_eq!(Role::parse("lead"), Some(Role::Lead));
        assert_eq!(Role::parse("VIEWER"), Some(Role::Viewer));
        assert_eq!(Role::parse("OWNER"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn privilege_ordering() {
        assert!(Role::Admin.at_least(Role::Lead));
        assert!(Role::Lead.at_least(Role::Lead));
        assert!(!Role::Viewer.at_least(Role::Lead));
        assert!(!Role::Lead.at_least(Role::Admin));
    }

    #[test]
    fn only_admin_records_entries_but_lead_records_exits() {
        assert!(Role::Admin.grants(Permission::RecordEntry));
        assert!(!Role::Lead.grants(Permission::RecordEntry));
        assert!(Role::Lead.grants(Permission::RecordExit));
        assert!(!Role::Viewer.grants(Permission::RecordExit));
        assert!(Role::Viewer.grants(Permission::ViewStock));
    }

    #[test]
    fn serde_uses_storage_labels() {
        assert_eq!(serde_json::to_string(&Role::Lead).unwrap(), "\"LIDER\"");
        let r: Role = serde_json::from_str("\"MASTER\"").unwrap();
        assert_eq!(r, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"ROOT\"").is_err());
    }
}
