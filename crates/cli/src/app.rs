//! Signed-in application context shared by the commands.

use std::sync::Arc;

use anyhow::{bail, Context};

use materials_auth::{AccessGate, Page, PageEntry, RoleResolver, SessionContext};
use materials_client::Navigator;
use materials_core::{active_only, find_by_id, CollaboratorId, Entity, ItemId};
use materials_infra::{
    AuthClient, Catalog, Directory, Ledger, MaterialsConfig, PostgrestStore, SessionHandle,
    StoreProfiles,
};
use materials_inventory::{eligible_receivers, Collaborator, Item};

use crate::Credentials;

pub struct App {
    pub config: MaterialsConfig,
    pub auth: AuthClient,
    pub navigator: Navigator<StoreProfiles<PostgrestStore>>,
    pub ledger: Ledger<PostgrestStore>,
    pub catalog: Catalog<PostgrestStore>,
    pub directory: Directory<PostgrestStore>,
}

impl App {
    /// Sign in and wire the services to the hosted store.
    pub async fn connect(config: MaterialsConfig, credentials: &Credentials) -> anyhow::Result<Self> {
        let (Some(email), Some(password)) = (&credentials.email, &credentials.password) else {
            bail!("sign-in required: pass --email/--password or set MATERIALS_EMAIL/MATERIALS_PASSWORD");
        };

        let http = config.http_client().context("building HTTP client")?;
        let session = SessionHandle::new();
        let auth = AuthClient::new(&config, http.clone(), session.clone());
        auth.sign_in(email, password).await?;

        let store = Arc::new(PostgrestStore::new(&config, http, session.clone()));
        let gate = AccessGate::new(RoleResolver::new(StoreProfiles(Arc::clone(&store))));

        Ok(Self {
            navigator: Navigator::new(gate, session),
            ledger: Ledger::new(Arc::clone(&store)),
            catalog: Catalog::new(Arc::clone(&store)),
            directory: Directory::new(store),
            auth,
            config,
        })
    }

    /// Enter a page, failing with the gate's redirect when access is denied.
    pub async fn enter(&self, page: Page) -> anyhow::Result<SessionContext> {
        match self.navigator.open(page).await {
            PageEntry::Granted(session) => Ok(session),
            PageEntry::Redirect(Page::SignIn) => bail!("not signed in"),
            PageEntry::Redirect(_) => bail!(
                "this command requires role {} or higher",
                page.min_role()
            ),
        }
    }

    /// Revoke the session; failures are only logged.
    pub async fn close(&self) {
        if let Err(err) = self.auth.sign_out().await {
            tracing::debug!(error = %err, "sign-out failed");
        }
    }

    /// Resolve an item by id or by a search matching exactly one active item.
    pub async fn resolve_item(&self, session: &SessionContext, needle: &str) -> anyhow::Result<Item> {
        let items = self.catalog.items(session).await?;
        if let Ok(id) = needle.parse::<ItemId>() {
            return find_by_id(&items, &id)
                .cloned()
                .with_context(|| format!("item {id} not found"));
        }
        let matches: Vec<&Item> = active_only(&items).filter(|i| i.matches(needle)).collect();
        pick_one("item", needle, &matches, |i| i.label()).cloned()
    }

    /// Resolve an active collaborator by id or unique search text.
    pub async fn resolve_receiver(
        &self,
        session: &SessionContext,
        needle: &str,
    ) -> anyhow::Result<Collaborator> {
        let collaborators = self.catalog.collaborators(session).await?;
        if let Ok(id) = needle.parse::<CollaboratorId>() {
            return find_by_id(&collaborators, &id)
                .filter(|c| c.is_active())
                .cloned()
                .with_context(|| format!("active collaborator {id} not found"));
        }
        let matches: Vec<&Collaborator> = eligible_receivers(&collaborators, needle).collect();
        pick_one("collaborator", needle, &matches, |c| c.name.clone()).cloned()
    }
}

fn pick_one<'a, T>(
    kind: &str,
    needle: &str,
    matches: &[&'a T],
    label: impl Fn(&T) -> String,
) -> anyhow::Result<&'a T> {
    match matches {
        [] => bail!("no active {kind} matches \"{needle}\""),
        [one] => Ok(*one),
        many => {
            let names: Vec<String> = many.iter().take(5).map(|m| label(m)).collect();
            bail!(
                "\"{needle}\" matches {} {kind}s: {}{}",
                many.len(),
                names.join(", "),
                if many.len() > 5 { ", ..." } else { "" }
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_one_requires_a_unique_match() {
        let a = "Luva".to_string();
        let b = "Luva nitrílica".to_string();
        assert_eq!(pick_one("item", "x", &[&a], |s| s.clone()).unwrap(), "Luva");

        let err = pick_one("item", "luva", &[&a, &b], |s| s.clone()).unwrap_err();
        assert_eq!(err.to_string(), "\"luva\" matches 2 items: Luva, Luva nitrílica");

        let none: [&String; 0] = [];
        assert!(pick_one("item", "bota", &none, |s| s.clone()).is_err());
    }
}
