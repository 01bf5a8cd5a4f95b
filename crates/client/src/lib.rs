//! `materials-client`
//!
//! **Responsibility:** the interactive side of the application.
//!
//! This crate provides:
//! - Page navigation through the access gate
//! - Stale-result discarding across navigation (page generations)
//! - Coalesced dashboard refresh driven by change notifications
//! - Connectivity tracking (the hosted store remains the authority)

pub mod dashboard;
pub mod navigator;
pub mod offline;
pub mod refresh;
pub mod staleness;

pub use dashboard::{DashboardView, RefreshOutcome};
pub use navigator::Navigator;
pub use offline::{ConnectivityState, OfflineMode};
pub use refresh::{Debouncer, RefreshScheduler};
pub use staleness::{PageGeneration, Ticket};
