//! Page generations: discard results whose initiating page state is gone.
//!
//! Every navigation advances the generation. A read takes a [`Ticket`]
//! before it starts and applies its result only if the ticket is still
//! current when the result arrives.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default)]
pub struct PageGeneration(Arc<AtomicU64>);

#[derive(Debug, Clone)]
pub struct Ticket {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl PageGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Invalidate every ticket issued so far. Returns the new generation.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            generation: Arc::clone(&self.0),
            issued: self.current(),
        }
    }
}

impl Ticket {
    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.issued
    }

    /// `Some(value)` if the ticket is still current, `None` if the result is stale.
    pub fn accept<T>(&self, value: T) -> Option<T> {
        self.is_current().then_some(value)
    }
}
