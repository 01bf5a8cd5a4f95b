//! Page navigation through the access gate.

use materials_auth::{AccessGate, Page, PageEntry, ProfileLookup};
use materials_infra::SessionHandle;

use crate::PageGeneration;

/// Resolves the role afresh on every page entry and invalidates in-flight
/// reads of the page being left.
pub struct Navigator<L> {
    gate: AccessGate<L>,
    session: SessionHandle,
    generation: PageGeneration,
}

impl<L: ProfileLookup> Navigator<L> {
    pub fn new(gate: AccessGate<L>, session: SessionHandle) -> Self {
        Self {
            gate,
            session,
            generation: PageGeneration::new(),
        }
    }

    /// Shared generation counter; views take tickets from it.
    pub fn generation(&self) -> &PageGeneration {
        &self.generation
    }

    pub async fn open(&self, page: Page) -> PageEntry {
        self.generation.advance();
        let principal = self.session.principal().await;
        let entry = self.gate.enter(page, principal).await;
        match &entry {
            PageEntry::Granted(session) => {
                tracing::debug!(path = page.path(), role = %session.role(), "page entered");
            }
            PageEntry::Redirect(to) => {
                tracing::debug!(path = page.path(), redirect = to.path(), "page entry redirected");
            }
        }
        entry
    }
}
