//! Plain-text rendering of command results.

use std::fmt::Write;

use materials_auth::{Invite, Profile};
use materials_inventory::{
    Collaborator, DashboardSnapshot, HistoryEntry, Item, ReceiverTotal, StockLevel, StockTotals,
};

pub fn stock(rows: &[&StockLevel]) -> String {
    let mut out = String::new();
    for r in rows {
        let flag = if r.below_minimum() { "!" } else { " " };
        let _ = writeln!(
            out,
            "{flag} {:<36} {:>8} {:<8} min {:>5}  {}{}",
            r.label(),
            r.balance,
            r.unit,
            r.min_stock,
            r.sku.as_deref().unwrap_or("-"),
            if r.active { "" } else { "  (inactive)" },
        );
    }
    let totals = StockTotals::of(rows.iter().copied());
    let _ = writeln!(
        out,
        "{} items, {} below minimum, total balance {}",
        totals.items, totals.below_min, totals.total_balance
    );
    out
}

pub fn items(rows: &[&Item]) -> String {
    let mut out = String::new();
    for i in rows {
        let _ = writeln!(
            out,
            "{}  {:<36} {:<8} min {:>5}{}",
            i.id,
            i.label(),
            i.unit,
            i.min_stock,
            if i.active { "" } else { "  (inactive)" },
        );
    }
    out
}

pub fn collaborators(rows: &[&Collaborator]) -> String {
    let mut out = String::new();
    for c in rows {
        let _ = writeln!(
            out,
            "{}  {:<28} {}{}",
            c.id,
            c.name,
            c.sector.as_deref().unwrap_or("-"),
            if c.active { "" } else { "  (inactive)" },
        );
    }
    out
}

pub fn history(rows: &[HistoryEntry]) -> String {
    let mut out = String::new();
    for h in rows {
        let _ = write!(
            out,
            "{}  {:<8} {:>6} {:<8} {} — {}",
            h.created_at.format("%d/%m/%Y %H:%M"),
            h.move_type,
            h.qty,
            h.unit,
            h.category,
            h.item_name,
        );
        if !h.receiver.is_empty() {
            let _ = write!(out, "  → {}", h.receiver);
        }
        if !h.actor.is_empty() {
            let _ = write!(out, "  by {}", h.actor);
        }
        if let Some(note) = &h.note {
            let _ = write!(out, "  \"{note}\"");
        }
        out.push('\n');
    }
    out
}

pub fn ranking(rows: &[ReceiverTotal]) -> String {
    let mut out = String::new();
    for (pos, r) in rows.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {:<28} {:>8}", pos + 1, r.receiver, r.total);
    }
    out
}

pub fn dashboard(snapshot: &DashboardSnapshot) -> String {
    let k = &snapshot.kpis;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "items {} (active {})  below minimum {}  total balance {}  movements today {}",
        k.total_items, k.active_items, k.below_min, k.total_balance, k.movements_today
    );
    let _ = writeln!(out, "\nday    entries  exits");
    for d in &snapshot.daily {
        let _ = writeln!(out, "{}  {:>7}  {:>5}", d.label, d.increase, d.decrease);
    }
    let _ = writeln!(out, "\ntop items by volume");
    for v in &snapshot.top_items {
        let _ = writeln!(out, "  {:<36} {:>8}", v.label, v.volume);
    }
    out
}

pub fn users(profiles: &[Profile], invites: &[Invite]) -> String {
    let mut out = String::from("profiles\n");
    for p in profiles {
        let _ = writeln!(out, "  {}  {:<7} {}", p.user_id, p.role, p.display_name());
    }
    out.push_str("invites\n");
    for i in invites {
        let status = match i.used_at {
            Some(at) => format!("used {}", at.format("%d/%m/%Y")),
            None => "pending".to_string(),
        };
        let _ = writeln!(out, "  {}  {:<7} {:<32} {}", i.id, i.role, i.email, status);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use materials_core::ItemId;
    use materials_inventory::DashboardWindow;

    fn level(name: &str, balance: i64, min: i64) -> StockLevel {
        StockLevel {
            item_id: ItemId::new(),
            category: "EPI".to_string(),
            name: name.to_string(),
            sku: None,
            unit: "PAR".to_string(),
            min_stock: min,
            active: true,
            balance,
        }
    }

    #[test]
    fn stock_flags_items_below_minimum() {
        let low = level("Luva", 2, 5);
        let ok = level("Bota", 9, 1);
        let text = stock(&[&low, &ok]);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("! EPI — Luva"));
        assert!(lines[1].starts_with("  EPI — Bota"));
        assert_eq!(lines[2], "2 items, 1 below minimum, total balance 11");
    }

    #[test]
    fn dashboard_lists_every_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let snapshot = DashboardWindow::default().compute(now, &[level("Luva", 0, 1)], &[]);
        let text = dashboard(&snapshot);
        assert!(text.starts_with("items 1 (active 1)  below minimum 1"));
        assert!(text.contains("01/03"));
        assert!(text.contains("14/03"));
    }
}
