//! Page-level access gating (navigation convenience only).

use serde::{Deserialize, Serialize};

use crate::{Principal, ProfileLookup, Role, RoleResolver, SessionContext};

/// Navigable pages and their access requirements.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    SignIn,
    Dashboard,
    Stock,
    History,
    Ranking,
    Items,
    Collaborators,
    Entry,
    Exit,
    Users,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::SignIn => "/login",
            Page::Dashboard => "/dashboard",
            Page::Stock => "/estoque",
            Page::History => "/historico",
            Page::Ranking => "/ranking",
            Page::Items => "/master",
            Page::Collaborators => "/collaboradores",
            Page::Entry => "/mobile",
            Page::Exit => "/mobile/saida",
            Page::Users => "/master/usuarios",
        }
    }

    /// Minimum role needed to stay on the page.
    pub fn min_role(&self) -> Role {
        match self {
            Page::Entry | Page::Users => Role::Admin,
            Page::Exit => Role::Lead,
            _ => Role::Viewer,
        }
    }

    /// Where an under-privileged principal is sent.
    pub fn fallback(&self) -> Page {
        Page::Stock
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Page::SignIn)
    }
}

/// Outcome of entering a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEntry {
    Granted(SessionContext),
    Redirect(Page),
}

/// Resolves the role on each page entry and decides whether to redirect.
#[derive(Debug, Clone)]
pub struct AccessGate<L> {
    resolver: RoleResolver<L>,
}

impl<L: ProfileLookup> AccessGate<L> {
    pub fn new(resolver: RoleResolver<L>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &RoleResolver<L> {
        &self.resolver
    }

    pub async fn enter(&self, page: Page, principal: Option<Principal>) -> PageEntry {
        if !page.requires_session() {
            return PageEntry::Granted(self.resolver.session(principal).await);
        }

        let Some(principal) = principal else {
            tracing::debug!(page = page.path(), "no session; redirecting to sign-in");
            return PageEntry::Redirect(Page::SignIn);
        };

        let session = self.resolver.session(Some(principal)).await;
        decide(page, session)
    }
}

/// Pure gating decision for an already-resolved session.
pub fn decide(page: Page, session: SessionContext) -> PageEntry {
    if page.requires_session() && !session.is_authenticated() {
        return PageEntry::Redirect(Page::SignIn);
    }
    if session.role().at_least(page.min_role()) {
        PageEntry::Granted(session)
    } else {
        tracing::debug!(
            page = page.path(),
            role = %session.role(),
            required = %page.min_role(),
            "insufficient role; redirecting"
        );
        PageEntry::Redirect(page.fallback())
    }
}
