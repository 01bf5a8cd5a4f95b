//! Store error taxonomy.
//!
//! Rejections are classified from the structured SQLSTATE code the backend
//! returns, never from message text. Only the movement normalizer and the
//! soft-delete fallback act on the classification; everywhere else the
//! message surfaces unchanged.

use serde::Deserialize;

/// How a store failure should be interpreted by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// A value was outside the column's allowed set (check constraint or enum).
    AllowedValueRejected,
    /// A referencing row blocks the operation.
    ForeignKeyViolation,
    PermissionDenied,
    NotFound,
    /// Any other rejection reported by the backend.
    Rejected,
    /// The request never produced a backend answer.
    Transport,
    /// The backend answered with a body we could not read.
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub code: Option<String>,
    pub message: String,
}

pub type StoreResult<T> = Result<T, StoreError>;

pub const CHECK_VIOLATION: &str = "23514";
pub const INVALID_TEXT_REPRESENTATION: &str = "22P02";
pub const FOREIGN_KEY_VIOLATION: &str = "23503";
pub const INSUFFICIENT_PRIVILEGE: &str = "42501";
pub const RAISE_EXCEPTION: &str = "P0001";

impl StoreErrorKind {
    /// Classify a SQLSTATE (or backend-specific) code.
    pub fn from_code(code: &str) -> Self {
        match code {
            CHECK_VIOLATION | INVALID_TEXT_REPRESENTATION => Self::AllowedValueRejected,
            FOREIGN_KEY_VIOLATION => Self::ForeignKeyViolation,
            INSUFFICIENT_PRIVILEGE => Self::PermissionDenied,
            "PGRST116" => Self::NotFound,
            _ => Self::Rejected,
        }
    }
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    /// Rejection carrying a backend code; the kind is derived from the code.
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            kind: StoreErrorKind::from_code(&code),
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Decode, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, message)
    }

    /// Build from an HTTP error response (status plus raw body).
    ///
    /// A JSON body with a `code` wins. Otherwise 401/403 map to permission
    /// denied, 404 to not found, 5xx to transport, a non-JSON body to decode,
    /// and anything left to a plain rejection.
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Body {
            code: Option<String>,
            message: Option<String>,
            details: Option<String>,
        }

        let parsed: Option<Body> = serde_json::from_str(body).ok();
        let unreadable = parsed.is_none() && !body.trim().is_empty();
        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .map(|m| match parsed.as_ref().and_then(|b| b.details.as_deref()) {
                Some(details) if !details.is_empty() => format!("{m} ({details})"),
                _ => m,
            })
            .unwrap_or_else(|| {
                let text = body.trim();
                if text.is_empty() {
                    format!("request failed with status {status}")
                } else {
                    text.to_string()
                }
            });

        match parsed.and_then(|b| b.code).filter(|c| !c.is_empty()) {
            Some(code) => {
                let mut err = Self::with_code(code, message);
                if err.kind == StoreErrorKind::Rejected && matches!(status, 401 | 403) {
                    err.kind = StoreErrorKind::PermissionDenied;
                }
                err
            }
            None => {
                let kind = match status {
                    401 | 403 => StoreErrorKind::PermissionDenied,
                    404 => StoreErrorKind::NotFound,
                    s if s >= 500 => StoreErrorKind::Transport,
                    _ if unreadable => StoreErrorKind::Decode,
                    _ => StoreErrorKind::Rejected,
                };
                Self::new(kind, message)
            }
        }
    }

    pub fn is_allowed_value_rejection(&self) -> bool {
        self.kind == StoreErrorKind::AllowedValueRejected
    }

    pub fn is_referential(&self) -> bool {
        self.kind == StoreErrorKind::ForeignKeyViolation
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_drive_classification() {
        assert!(StoreError::with_code("23514", "x").is_allowed_value_rejection());
        assert!(StoreError::with_code("22P02", "x").is_allowed_value_rejection());
        assert!(StoreError::with_code("23503", "x").is_referential());
        assert_eq!(StoreError::with_code("42501", "x").kind, StoreErrorKind::PermissionDenied);
        assert_eq!(StoreError::with_code("23505", "x").kind, StoreErrorKind::Rejected);
        assert_eq!(StoreError::with_code(RAISE_EXCEPTION, "x").kind, StoreErrorKind::Rejected);
    }

    #[test]
    fn message_text_does_not_affect_classification() {
        let err = StoreError::with_code("23505", "violates check constraint \"x\"");
        assert!(!err.is_allowed_value_rejection());
    }

    #[test]
    fn response_bodies_are_parsed() {
        let body = r#"{"code":"23503","message":"update or delete on table \"items\" violates foreign key constraint","details":"Key is still referenced","hint":null}"#;
        let err = StoreError::from_response(409, body);
        assert!(err.is_referential());
        assert_eq!(err.code.as_deref(), Some("23503"));
        assert!(err.message.ends_with("(Key is still referenced)"));

        let err = StoreError::from_response(403, "");
        assert_eq!(err.kind, StoreErrorKind::PermissionDenied);
        assert_eq!(err.message, "request failed with status 403");

        let err = StoreError::from_response(502, "bad gateway");
        assert_eq!(err.kind, StoreErrorKind::Transport);
        assert_eq!(err.message, "bad gateway");

        let err = StoreError::from_response(503, "<html>Service Unavailable</html>");
        assert_eq!(err.kind, StoreErrorKind::Transport);

        let err = StoreError::from_response(400, "<html>Bad Request</html>");
        assert_eq!(err.kind, StoreErrorKind::Decode);

        let err = StoreError::from_response(409, r#"{"message":"conflict"}"#);
        assert_eq!(err.kind, StoreErrorKind::Rejected);
        assert_eq!(err.message, "conflict");
    }
}
