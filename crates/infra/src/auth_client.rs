//! Password authentication against the hosted auth service.
//!
//! The client keeps the current session in a shared [`SessionHandle`]; the
//! store adapter reads the access token from the same handle so requests run
//! under the signed-in principal's row-level policies.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use materials_auth::Principal;
use materials_core::UserId;

use crate::config::MaterialsConfig;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("not signed in")]
    NotSignedIn,
    #[error("{0}")]
    Validation(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("auth API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Tokens and identity of a signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub principal: Principal,
}

/// Shared, swappable current session.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<RwLock<Option<AuthSession>>>);

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<AuthSession> {
        self.0.read().await.clone()
    }

    pub async fn set(&self, session: AuthSession) {
        *self.0.write().await = Some(session);
    }

    pub async fn clear(&self) -> Option<AuthSession> {
        self.0.write().await.take()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.0.read().await.as_ref().map(|s| s.access_token.clone())
    }

    pub async fn principal(&self) -> Option<Principal> {
        self.0.read().await.as_ref().map(|s| s.principal.clone())
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Account created and signed in immediately.
    SignedIn(Principal),
    /// Account created; the address must be confirmed before signing in.
    ConfirmationRequired,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session: SessionHandle,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: Uuid,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: UserBody,
}

impl AuthClient {
    pub fn new(config: &MaterialsConfig, http: reqwest::Client, session: SessionHandle) -> Self {
        Self {
            http,
            base_url: config.auth_url(),
            api_key: config.api_key.clone(),
            session,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Currently signed-in principal, if any.
    pub async fn current_principal(&self) -> Option<Principal> {
        self.session.principal().await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("email and password are required".to_string()));
        }

        let resp = self
            .http
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| AuthError::Network(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(error_from_response(status, &body));
        }

        let session = session_from_token_body(&body, Utc::now())?;
        let principal = session.principal.clone();
        self.session.set(session).await;
        tracing::info!(user_id = %principal.user_id, "signed in");
        Ok(principal)
    }

    /// Create an account. `full_name` is stored as user metadata (blank is omitted).
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, AuthError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(AuthError::Validation("enter a valid email address".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("password is required".to_string()));
        }
        let full_name = full_name.map(str::trim).unwrap_or("");

        let resp = self
            .http
            .post(format!("{}/signup", self.base_url))
            .header("apikey", &self.api_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| AuthError::Network(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(error_from_response(status, &body));
        }

        match signup_outcome(&body, Utc::now())? {
            Some(session) => {
                let principal = session.principal.clone();
                self.session.set(session).await;
                tracing::info!(user_id = %principal.user_id, "account created and signed in");
                Ok(SignUpOutcome::SignedIn(principal))
            }
            None => {
                tracing::info!(%email, "account created; confirmation pending");
                Ok(SignUpOutcome::ConfirmationRequired)
            }
        }
    }

    /// Revoke the current session. The local session is cleared even if the
    /// revoke request fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.session.clear().await else {
            return Err(AuthError::NotSignedIn);
        };

        let resp = self
            .http
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }
        tracing::info!(user_id = %session.principal.user_id, "signed out");
        Ok(())
    }
}

fn session_from_token_body(body: &str, now: DateTime<Utc>) -> Result<AuthSession, AuthError> {
    let token: TokenBody = serde_json::from_str(body).map_err(|e| AuthError::Parse(e.to_string()))?;
    let mut principal = Principal::new(UserId::from_uuid(token.user.id));
    if let Some(email) = token.user.email {
        principal = principal.with_email(email);
    }
    Ok(AuthSession {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: token.expires_in.map(|secs| now + Duration::seconds(secs)),
        principal,
    })
}

/// Sign-up answers with a token body when auto-confirm is on, a bare user otherwise.
fn signup_outcome(body: &str, now: DateTime<Utc>) -> Result<Option<AuthSession>, AuthError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| AuthError::Parse(e.to_string()))?;
    if value.get("access_token").is_some() {
        session_from_token_body(body, now).map(Some)
    } else {
        Ok(None)
    }
}

fn error_from_response(status: u16, body: &str) -> AuthError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
        error_description: Option<String>,
        msg: Option<String>,
        message: Option<String>,
    }

    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    if let Some(b) = &parsed {
        if b.error.as_deref() == Some("invalid_grant") {
            return AuthError::InvalidCredentials;
        }
    }
    let message = parsed
        .and_then(|b| b.error_description.or(b.msg).or(b.message).or(b.error))
        .unwrap_or_else(|| body.trim().to_string());
    AuthError::Api(status, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn token_body_becomes_session() {
        let id = Uuid::now_v7();
        let body = json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r",
            "user": { "id": id, "email": "ana@example.com" }
        })
        .to_string();

        let session = session_from_token_body(&body, now()).unwrap();
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.principal.user_id, UserId::from_uuid(id));
        assert_eq!(session.principal.email.as_deref(), Some("ana@example.com"));
        assert_eq!(session.expires_at, Some(now() + Duration::hours(1)));
    }

    #[test]
    fn signup_without_token_requires_confirmation() {
        let body = json!({ "id": Uuid::now_v7(), "email": "ana@example.com" }).to_string();
        assert_eq!(signup_outcome(&body, now()).unwrap(), None);
    }

    #[test]
    fn invalid_grant_is_invalid_credentials() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert!(matches!(error_from_response(400, body), AuthError::InvalidCredentials));

        let body = r#"{"code":422,"msg":"Password should be at least 6 characters"}"#;
        match error_from_response(422, body) {
            AuthError::Api(422, msg) => assert!(msg.starts_with("Password")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn session_handle_is_shared() {
        let handle = SessionHandle::new();
        let other = handle.clone();
        handle
            .set(AuthSession {
                access_token: "t".to_string(),
                refresh_token: None,
                expires_at: None,
                principal: Principal::new(UserId::new()),
            })
            .await;
        assert_eq!(other.access_token().await.as_deref(), Some("t"));
        assert!(other.clear().await.is_some());
        assert!(handle.principal().await.is_none());
    }
}
