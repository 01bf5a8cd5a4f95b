//! Stock listing: rows of the per-item balance view, filters and totals.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use materials_core::ItemId;

use crate::Item;

/// Item attributes joined with the current derived balance (`v_stock`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub item_id: ItemId,
    pub category: String,
    pub name: String,
    pub sku: Option<String>,
    pub unit: String,
    pub min_stock: i64,
    pub active: bool,
    pub balance: i64,
}

impl StockLevel {
    pub fn from_item(item: &Item, balance: i64) -> Self {
        Self {
            item_id: item.id,
            category: item.category.clone(),
            name: item.name.clone(),
            sku: item.sku.clone(),
            unit: item.unit.clone(),
            min_stock: item.min_stock,
            active: item.active,
            balance,
        }
    }

    pub fn below_minimum(&self) -> bool {
        self.balance < self.min_stock
    }

    pub fn label(&self) -> String {
        format!("{} — {}", self.category, self.name)
    }

    fn search_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.category,
            self.name,
            self.sku.as_deref().unwrap_or(""),
            self.unit,
            self.balance
        )
        .to_lowercase()
    }
}

/// Join catalog rows with a balance map; items without movements have balance 0.
pub fn join_balances(items: &[Item], balances: &HashMap<ItemId, i64>) -> Vec<StockLevel> {
    items
        .iter()
        .map(|i| StockLevel::from_item(i, balances.get(&i.id).copied().unwrap_or(0)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    fn accepts(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(c) => c == category,
        }
    }
}

/// Filters of the stock page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockFilter {
    pub query: String,
    pub category: CategoryFilter,
    pub only_active: bool,
    pub only_below_min: bool,
}

impl Default for StockFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: CategoryFilter::All,
            only_active: true,
            only_below_min: false,
        }
    }
}

impl StockFilter {
    pub fn accepts(&self, row: &StockLevel) -> bool {
        if self.only_active && !row.active {
            return false;
        }
        if !self.category.accepts(&row.category) {
            return false;
        }
        if self.only_below_min && !row.below_minimum() {
            return false;
        }
        let needle = self.query.trim().to_lowercase();
        needle.is_empty() || row.search_text().contains(&needle)
    }

    pub fn apply<'a>(&self, rows: &'a [StockLevel]) -> Vec<&'a StockLevel> {
        rows.iter().filter(|r| self.accepts(r)).collect()
    }
}

/// Summary badges over a (filtered) listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StockTotals {
    pub items: usize,
    pub below_min: usize,
    pub total_balance: i64,
}

impl StockTotals {
    pub fn of<'a>(rows: impl IntoIterator<Item = &'a StockLevel>) -> Self {
        rows.into_iter().fold(Self::default(), |mut acc, r| {
            acc.items += 1;
            acc.total_balance += r.balance;
            if r.below_minimum() {
                acc.below_min += 1;
            }
            acc
        })
    }
}

/// Distinct categories, sorted.
pub fn categories(rows: &[StockLevel]) -> Vec<String> {
    rows.iter()
        .map(|r| r.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: &str, name: &str, balance: i64, min: i64, active: bool) -> StockLevel {
        StockLevel {
            item_id: ItemId::new(),
            category: category.to_string(),
            name: name.to_string(),
            sku: None,
            unit: "UN".to_string(),
            min_stock: min,
            active,
            balance,
        }
    }

    fn sample() -> Vec<StockLevel> {
        vec![
            row("EPI", "Luva", 12, 20, true),
            row("EPI", "Capacete", 30, 5, true),
            row("Limpeza", "Detergente", 0, 2, false),
        ]
    }

    #[test]
    fn default_filter_hides_inactive() {
        let rows = sample();
        let shown = StockFilter::default().apply(&rows);
        assert_eq!(shown.len(), 2);

        let totals = StockTotals::of(shown);
        assert_eq!(totals.items, 2);
        assert_eq!(totals.below_min, 1);
        assert_eq!(totals.total_balance, 42);
    }

    #[test]
    fn below_min_and_category_filters_combine() {
        let rows = sample();
        let filter = StockFilter {
            only_active: false,
            only_below_min: true,
            ..StockFilter::default()
        };
        assert_eq!(filter.apply(&rows).len(), 2);

        let filter = StockFilter {
            category: CategoryFilter::Named("Limpeza".to_string()),
            ..filter
        };
        let shown = filter.apply(&rows);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].name, "Detergente");
    }

    #[test]
    fn query_matches_balance_text() {
        let rows = sample();
        let filter = StockFilter {
            query: "30".to_string(),
            ..StockFilter::default()
        };
        let shown = filter.apply(&rows);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].name, "Capacete");
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        assert_eq!(categories(&sample()), vec!["EPI".to_string(), "Limpeza".to_string()]);
    }

    #[test]
    fn join_defaults_missing_balances_to_zero() {
        let item = crate::ItemDraft {
            category: "EPI".to_string(),
            name: "Óculos".to_string(),
            ..crate::ItemDraft::default()
        }
        .into_item(ItemId::new());
        let rows = join_balances(std::slice::from_ref(&item), &HashMap::new());
        assert_eq!(rows[0].balance, 0);
        assert!(!rows[0].below_minimum());
    }
}
