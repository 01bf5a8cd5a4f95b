use serde::{Deserialize, Serialize};

use materials_core::{DomainError, DomainResult, Entity, ItemId};

/// Catalog item (row of the `items` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub category: String,
    pub name: String,
    pub sku: Option<String>,
    pub unit: String,
    pub min_stock: i64,
    pub active: bool,
}

impl Item {
    /// Display label used by selectors and rankings.
    pub fn label(&self) -> String {
        format!("{} — {}", self.category, self.name)
    }

    /// Case-insensitive match over category, name and SKU.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        format!(
            "{} {} {}",
            self.category,
            self.name,
            self.sku.as_deref().unwrap_or("")
        )
        .to_lowercase()
        .contains(&needle)
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Create/edit form for an item. `id == None` means insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub category: String,
    pub name: String,
    pub sku: Option<String>,
    pub unit: String,
    pub min_stock: i64,
    pub active: bool,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            id: None,
            category: String::new(),
            name: String::new(),
            sku: None,
            unit: "UNIDADE".to_string(),
            min_stock: 0,
            active: true,
        }
    }
}

impl From<&Item> for ItemDraft {
    fn from(item: &Item) -> Self {
        Self {
            id: Some(item.id),
            category: item.category.clone(),
            name: item.name.clone(),
            sku: item.sku.clone(),
            unit: item.unit.clone(),
            min_stock: item.min_stock,
            active: item.active,
        }
    }
}

impl ItemDraft {
    /// Trim fields, drop an empty SKU, clamp the minimum and check required fields.
    pub fn normalize(self) -> DomainResult<Self> {
        let category = self.category.trim().to_string();
        let name = self.name.trim().to_string();
        let unit = self.unit.trim().to_string();

        if category.is_empty() {
            return Err(DomainError::validation("category is required"));
        }
        if name.is_empty() {
            return Err(DomainError::validation("item name is required"));
        }
        if unit.is_empty() {
            return Err(DomainError::validation("unit is required"));
        }

        let sku = self
            .sku
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            id: self.id,
            category,
            name,
            sku,
            unit,
            min_stock: self.min_stock.max(0),
            active: self.active,
        })
    }

    /// Materialize a validated draft with a concrete id.
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            category: self.category,
            name: self.name,
            sku: self.sku,
            unit: self.unit,
            min_stock: self.min_stock,
            active: self.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ItemDraft {
        ItemDraft {
            category: "  EPI ".to_string(),
            name: " Luva nitrílica ".to_string(),
            sku: Some("   ".to_string()),
            min_stock: -3,
            ..ItemDraft::default()
        }
    }

    #[test]
    fn normalize_trims_clamps_and_drops_blank_sku() {
        let d = draft().normalize().unwrap();
        assert_eq!(d.category, "EPI");
        assert_eq!(d.name, "Luva nitrílica");
        assert_eq!(d.sku, None);
        assert_eq!(d.unit, "UNIDADE");
        assert_eq!(d.min_stock, 0);
    }

    #[test]
    fn normalize_requires_category_name_and_unit() {
        let mut d = draft();
        d.category = " ".to_string();
        assert!(matches!(d.normalize(), Err(DomainError::Validation(_))));

        let mut d = draft();
        d.name.clear();
        assert!(matches!(d.normalize(), Err(DomainError::Validation(_))));

        let mut d = draft();
        d.unit = "\t".to_string();
        assert!(matches!(d.normalize(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn matches_searches_sku_case_insensitively() {
        let item = ItemDraft {
            sku: Some("LV-09".to_string()),
            ..draft()
        }
        .normalize()
        .unwrap()
        .into_item(ItemId::new());

        assert!(item.matches("lv-0"));
        assert!(item.matches("epi luva"));
        assert!(item.matches("  "));
        assert!(!item.matches("capacete"));
        assert_eq!(item.label(), "EPI — Luva nitrílica");
    }
}
