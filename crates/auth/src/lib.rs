//! `materials-auth` — role resolution and access gating.
//!
//! This crate is intentionally decoupled from HTTP and storage: profile
//! lookups come in through the [`ProfileLookup`] trait, and every guarded
//! operation receives an explicit [`SessionContext`] instead of reading
//! ambient state.
//!
//! Nothing here is a security boundary. The hosted store enforces row-level
//! policy independently; these checks only keep the client from issuing
//! requests that would be refused anyway.

pub mod authorize;
pub mod directory;
pub mod gate;
pub mod permissions;
pub mod principal;
pub mod resolver;
pub mod roles;

pub use authorize::{authorize, AuthzError};
pub use directory::{Invite, InviteDraft, Profile};
pub use gate::{AccessGate, Page, PageEntry};
pub use permissions::Permission;
pub use principal::{Principal, SessionContext};
pub use resolver::{ProfileLookup, RoleResolver};
pub use roles::{Role, UnknownRole};
