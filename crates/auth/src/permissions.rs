use serde::{Deserialize, Serialize};

/// Operation-level permission.
///
/// Roles map to a fixed set of these (see [`crate::Role::permissions`]).
/// Checked before any mutating call reaches the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewStock,
    ViewReports,
    RecordEntry,
    RecordExit,
    ManageItems,
    ManageCollaborators,
    ManageUsers,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewStock => "stock.read",
            Permission::ViewReports => "reports.read",
            Permission::RecordEntry => "movements.entry",
            Permission::RecordExit => "movements.exit",
            Permission::ManageItems => "items.manage",
            Permission::ManageCollaborators => "collaborators.manage",
            Permission::ManageUsers => "users.manage",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
