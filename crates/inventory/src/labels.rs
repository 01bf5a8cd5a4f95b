//! Movement type labels.
//!
//! The `stock_moves.move_type` column accepts one spelling per direction, but
//! which spelling is not known ahead of time. Writers try the candidates in
//! the fixed order below; readers map any candidate back to its direction.

use crate::MoveDirection;

/// Increase labels, in insertion-attempt order.
pub const INCREASE_LABELS: [&str; 5] = ["IN", "ENTRADA", "INPUT", "INBOUND", "ENTRY"];

/// Decrease labels, in insertion-attempt order.
pub const DECREASE_LABELS: [&str; 5] = ["OUT", "SAIDA", "OUTPUT", "OUTBOUND", "EXIT"];

/// Ordered candidate labels for a direction.
pub fn candidates(direction: MoveDirection) -> &'static [&'static str] {
    match direction {
        MoveDirection::Increase => &INCREASE_LABELS,
        MoveDirection::Decrease => &DECREASE_LABELS,
    }
}

/// Direction of a stored label, or `None` for labels outside both lists.
pub fn direction_of(label: &str) -> Option<MoveDirection> {
    let label = label.trim();
    if INCREASE_LABELS.iter().any(|c| c.eq_ignore_ascii_case(label)) {
        Some(MoveDirection::Increase)
    } else if DECREASE_LABELS.iter().any(|c| c.eq_ignore_ascii_case(label)) {
        Some(MoveDirection::Decrease)
    } else {
        None
    }
}
