use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use materials_core::{
    CollaboratorId, DomainError, DomainResult, ItemId, MovementId, UserId, ValueObject,
};

use crate::labels;

/// Direction of a ledger movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Increase,
    Decrease,
}

impl MoveDirection {
    /// +1 for increases, -1 for decreases.
    pub fn sign(self) -> i64 {
        match self {
            MoveDirection::Increase => 1,
            MoveDirection::Decrease => -1,
        }
    }
}

impl core::fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            MoveDirection::Increase => "entry",
            MoveDirection::Decrease => "exit",
        })
    }
}

/// Strictly positive whole quantity. Direction lives in the movement label.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl ValueObject for Quantity {}

impl Quantity {
    pub fn new(value: i64) -> DomainResult<Self> {
        if value <= 0 {
            return Err(DomainError::validation(format!(
                "quantity must be a positive integer (got {value})"
            )));
        }
        Ok(Self(value))
    }

    /// Parse user input. Fractions, signs and non-numeric text are rejected.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        let value: i64 = trimmed.parse().map_err(|_| {
            DomainError::validation(format!(
                "quantity must be a positive integer (got '{trimmed}')"
            ))
        })?;
        Self::new(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Stored ledger entry (row of `stock_moves`). Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub created_at: DateTime<Utc>,
    pub item_id: ItemId,
    pub qty: i64,
    pub move_type: String,
    #[serde(default)]
    pub receiver_id: Option<CollaboratorId>,
    #[serde(default, alias = "actor_user_id")]
    pub created_by: Option<UserId>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Movement {
    pub fn direction(&self) -> Option<MoveDirection> {
        labels::direction_of(&self.move_type)
    }

    /// Contribution to the item balance; `None` for unrecognized labels.
    pub fn signed_qty(&self) -> Option<i64> {
        self.direction().map(|d| d.sign() * self.qty.abs())
    }
}

/// Validated intent to append a movement (label not chosen yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRequest {
    pub direction: MoveDirection,
    pub item_id: ItemId,
    pub quantity: Quantity,
    pub created_by: UserId,
    pub receiver_id: Option<CollaboratorId>,
    pub note: Option<String>,
}

impl MovementRequest {
    /// Stock entry (increase). No receiver.
    pub fn entry(
        item_id: ItemId,
        quantity: Quantity,
        created_by: UserId,
        note: Option<String>,
    ) -> Self {
        Self {
            direction: MoveDirection::Increase,
            item_id,
            quantity,
            created_by,
            receiver_id: None,
            note: clean_note(note),
        }
    }

    /// Stock exit (decrease). A receiving collaborator is required.
    pub fn exit(
        item_id: ItemId,
        quantity: Quantity,
        created_by: UserId,
        receiver_id: Option<CollaboratorId>,
        note: Option<String>,
    ) -> DomainResult<Self> {
        let receiver_id = receiver_id
            .ok_or_else(|| DomainError::validation("select the collaborator receiving the items"))?;
        Ok(Self {
            direction: MoveDirection::Decrease,
            item_id,
            quantity,
            created_by,
            receiver_id: Some(receiver_id),
            note: clean_note(note),
        })
    }

    /// Insert payload using one candidate label.
    pub fn with_label(&self, label: &str) -> MovementRow {
        MovementRow {
            item_id: self.item_id,
            qty: self.quantity.get(),
            move_type: label.to_string(),
            note: self.note.clone(),
            created_by: self.created_by,
            receiver_id: self.receiver_id,
        }
    }
}

/// Insert payload for `stock_moves`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRow {
    pub item_id: ItemId,
    pub qty: i64,
    pub move_type: String,
    pub note: Option<String>,
    pub created_by: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<CollaboratorId>,
}

fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
