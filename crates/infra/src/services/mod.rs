//! Guarded operations composed from the domain rules and the store traits.
//!
//! Every operation takes an explicit [`SessionContext`](materials_auth::SessionContext)
//! and checks its permission before touching the store.

mod catalog;
mod deletion;
mod directory;
mod ledger;
mod movements;

use materials_auth::AuthzError;
use materials_core::DomainError;

use crate::store::StoreError;

pub use catalog::Catalog;
pub use deletion::{delete_or_deactivate, DeleteOutcome};
pub use directory::Directory;
pub use ledger::Ledger;
pub use movements::{insert_with_candidates, Recorded};

/// Failure of a guarded operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Input rejected locally; no request was sent.
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Authz(#[from] AuthzError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}
