//! `materials-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every other crate
//! in the workspace (no IO, no transport, no storage).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::{active_only, find_by_id, Entity};
pub use error::{DomainError, DomainResult};
pub use id::{CollaboratorId, InviteId, ItemId, MovementId, UserId};
pub use value_object::ValueObject;
