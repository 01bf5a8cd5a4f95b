//! Read-only report rows returned by the store's stored procedures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Denormalized movement history line (`v_historico_completo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub move_type: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub item_name: String,
    pub qty: i64,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub unit: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub receiver: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub actor: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Total quantity received per collaborator (`ranking_colaboradores`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverTotal {
    pub receiver: String,
    pub total: i64,
}

// Joined columns come back as null when the referenced row is gone.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_entry_tolerates_null_joins() {
        let json = serde_json::json!({
            "id": "ignored",
            "created_at": "2026-03-14T10:00:00Z",
            "type": "OUT",
            "category": "EPI",
            "item_name": "Luva",
            "qty": 2,
            "unit": "PAR",
            "receiver": null,
            "actor": "ana@example.com",
            "note": null
        });
        let entry: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.move_type, "OUT");
        assert_eq!(entry.receiver, "");
        assert_eq!(entry.note, None);
    }
}
