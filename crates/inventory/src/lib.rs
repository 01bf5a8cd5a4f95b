//! Inventory domain module (stock ledger semantics).
//!
//! This crate contains the business rules for the materials ledger,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage): draft validation, movement type labels, balance derivation and
//! the pre-flight balance guard, stock listing filters and dashboard
//! aggregation.

pub mod balance;
pub mod collaborator;
pub mod dashboard;
pub mod item;
pub mod labels;
pub mod movement;
pub mod reports;
pub mod stock;

pub use balance::{balance_of, balances, check_decrease};
pub use collaborator::{eligible_receivers, Collaborator, CollaboratorDraft};
pub use dashboard::{DailyFlow, DashboardSnapshot, DashboardWindow, ItemVolume, Kpis};
pub use item::{Item, ItemDraft};
pub use labels::{candidates, direction_of, DECREASE_LABELS, INCREASE_LABELS};
pub use movement::{MoveDirection, Movement, MovementRequest, MovementRow, Quantity};
pub use reports::{HistoryEntry, ReceiverTotal};
pub use stock::{categories, join_balances, CategoryFilter, StockFilter, StockLevel, StockTotals};
