use serde::{Deserialize, Serialize};

use materials_core::{active_only, CollaboratorId, DomainError, DomainResult, Entity};

/// Person who receives stock exits (row of the `collaborators` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: CollaboratorId,
    pub name: String,
    pub sector: Option<String>,
    pub active: bool,
}

impl Collaborator {
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        format!("{} {}", self.name, self.sector.as_deref().unwrap_or(""))
            .to_lowercase()
            .contains(&needle)
    }
}

impl Entity for Collaborator {
    type Id = CollaboratorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Create/edit form for a collaborator. `id == None` means insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CollaboratorId>,
    pub name: String,
    pub sector: Option<String>,
    pub active: bool,
}

impl CollaboratorDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            sector: None,
            active: true,
        }
    }

    pub fn normalize(self) -> DomainResult<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("collaborator name is required"));
        }
        let sector = self
            .sector
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            id: self.id,
            name,
            sector,
            active: self.active,
        })
    }

    pub fn into_collaborator(self, id: CollaboratorId) -> Collaborator {
        Collaborator {
            id,
            name: self.name,
            sector: self.sector,
            active: self.active,
        }
    }
}

/// Active collaborators matching a query, in input order.
pub fn eligible_receivers<'a>(
    collaborators: &'a [Collaborator],
    query: &'a str,
) -> impl Iterator<Item = &'a Collaborator> + 'a {
    active_only(collaborators).filter(move |c| c.matches(query))
}
