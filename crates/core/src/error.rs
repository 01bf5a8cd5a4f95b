//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Every variant is raised before any network call;
/// store and transport failures belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. empty required field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authorization failure at the domain boundary.
    #[error("unauthorized")]
    Unauthorized,

    /// A decrease would drive a known balance negative.
    #[error("insufficient balance: current balance {available}, requested {requested}")]
    InsufficientBalance { available: i64, requested: i64 },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_balance(available: i64, requested: i64) -> Self {
        Self::InsufficientBalance {
            available,
            requested,
        }
    }

    /// True for errors raised by local validation (never reached the network).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidId(_) | Self::InsufficientBalance { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_message_names_both_quantities() {
        let err = DomainError::insufficient_balance(12, 15);
        let msg = err.to_string();
        assert!(msg.contains("current balance 12"));
        assert!(msg.contains("requested 15"));
        assert!(err.is_validation());
    }

    #[test]
    fn conflict_is_not_a_validation_error() {
        assert!(!DomainError::conflict("x").is_validation());
        assert!(!DomainError::Unauthorized.is_validation());
    }
}
