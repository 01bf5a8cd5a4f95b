//! Dashboard aggregation over a trailing window of movements.
//!
//! Pure and deterministic: the caller passes `now`, the stock levels and the
//! movements it fetched; nothing here is cached between refreshes.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use materials_core::ItemId;

use crate::{MoveDirection, Movement, StockLevel};

/// Trailing window size and ranking cut-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardWindow {
    /// Calendar days covered, today included.
    pub days: u32,
    /// Number of items kept in the volume ranking.
    pub top_n: usize,
}

impl Default for DashboardWindow {
    fn default() -> Self {
        Self { days: 14, top_n: 8 }
    }
}

/// Increase/decrease totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyFlow {
    pub day: NaiveDate,
    pub label: String,
    pub increase: i64,
    pub decrease: i64,
}

/// Total absolute quantity moved for one item over the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemVolume {
    pub item_id: ItemId,
    pub label: String,
    pub volume: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Kpis {
    pub total_items: usize,
    pub active_items: usize,
    pub below_min: usize,
    pub total_balance: i64,
    pub movements_today: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub kpis: Kpis,
    pub daily: Vec<DailyFlow>,
    pub top_items: Vec<ItemVolume>,
}

impl DashboardWindow {
    fn first_day(&self, now: DateTime<Utc>) -> NaiveDate {
        let back = u64::from(self.days.max(1) - 1);
        now.date_naive()
            .checked_sub_days(Days::new(back))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Start of the first day in the window (inclusive lower bound for queries).
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.first_day(now).and_time(NaiveTime::MIN))
    }

    fn contains(&self, now: DateTime<Utc>, day: NaiveDate) -> bool {
        day >= self.first_day(now) && day <= now.date_naive()
    }

    pub fn compute(
        &self,
        now: DateTime<Utc>,
        stock: &[StockLevel],
        movements: &[Movement],
    ) -> DashboardSnapshot {
        let in_window: Vec<&Movement> = movements
            .iter()
            .filter(|m| self.contains(now, m.created_at.date_naive()))
            .collect();

        DashboardSnapshot {
            generated_at: now,
            kpis: kpis(now, stock, &in_window),
            daily: self.daily(now, &in_window),
            top_items: self.top_items(stock, &in_window),
        }
    }

    fn daily(&self, now: DateTime<Utc>, movements: &[&Movement]) -> Vec<DailyFlow> {
        let mut by_day: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();

        let mut day = self.first_day(now);
        let today = now.date_naive();
        while day <= today {
            by_day.insert(day, (0, 0));
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        for m in movements {
            let Some(slot) = by_day.get_mut(&m.created_at.date_naive()) else {
                continue;
            };
            let qty = m.qty.abs();
            match m.direction() {
                Some(MoveDirection::Increase) => slot.0 += qty,
                Some(MoveDirection::Decrease) => slot.1 += qty,
                None => {}
            }
        }

        by_day
            .into_iter()
            .map(|(day, (increase, decrease))| DailyFlow {
                day,
                label: day.format("%d/%m").to_string(),
                increase,
                decrease,
            })
            .collect()
    }

    fn top_items(&self, stock: &[StockLevel], movements: &[&Movement]) -> Vec<ItemVolume> {
        let mut volume: HashMap<ItemId, i64> = HashMap::new();
        for m in movements {
            *volume.entry(m.item_id).or_insert(0) += m.qty.abs();
        }

        let labels: HashMap<ItemId, String> =
            stock.iter().map(|s| (s.item_id, s.label())).collect();

        let mut ranked: Vec<ItemVolume> = volume
            .into_iter()
            .map(|(item_id, volume)| ItemVolume {
                item_id,
                label: labels
                    .get(&item_id)
                    .cloned()
                    .unwrap_or_else(|| item_id.to_string()),
                volume,
            })
            .collect();

        ranked.sort_by(|a, b| b.volume.cmp(&a.volume).then_with(|| a.label.cmp(&b.label)));
        ranked.truncate(self.top_n);
        ranked
    }
}

fn kpis(now: DateTime<Utc>, stock: &[StockLevel], movements: &[&Movement]) -> Kpis {
    let today = now.date_naive();
    Kpis {
        total_items: stock.len(),
        active_items: stock.iter().filter(|s| s.active).count(),
        below_min: stock.iter().filter(|s| s.below_minimum()).count(),
        total_balance: stock.iter().map(|s| s.balance).sum(),
        movements_today: movements
            .iter()
            .filter(|m| m.created_at.date_naive() == today)
            .count(),
    }
}
