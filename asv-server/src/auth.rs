//! Bearer-token sessions
//!
//! Tokens are random UUIDs issued by the login endpoint and held in memory
//! for the lifetime of the process.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::state::AppState;
use asv_core::wire::LoginRequest;
use axum::http::{header, HeaderMap};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    tokens: Arc<RwLock<HashSet<String>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token
    pub async fn issue(&self) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.tokens.write().await.insert(token.clone());
        token
    }

    pub async fn is_valid(&self, token: &str) -> bool {
        self.tokens.read().await.contains(token)
    }

    /// Returns false when the token was not known
    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token)
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

pub fn credentials_match(config: &ServerConfig, request: &LoginRequest) -> bool {
    request.username == config.admin_user && request.password == config.admin_password
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Check the request carries a live token, returning it
pub async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<String, ServerError> {
    let token = bearer_token(headers).ok_or(ServerError::Unauthorized)?;
    if state.sessions.is_valid(token).await {
        Ok(token.to_string())
    } else {
        Err(ServerError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("Basic YWRtaW4=")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_issue_and_revoke() {
        let sessions = SessionRegistry::new();
        let a = sessions.issue().await;
        let b = sessions.issue().await;
        assert_ne!(a, b);
        assert!(sessions.is_valid(&a).await);
        assert!(sessions.revoke(&a).await);
        assert!(!sessions.is_valid(&a).await);
        assert!(!sessions.revoke(&a).await);
        assert_eq!(sessions.len().await, 1);
    }

    #[test]
    fn test_credentials_match() {
        let config = ServerConfig::with_data_dir("/tmp");
        let mut request = LoginRequest {
            username: "admin".into(),
            password: "asv2025".into(),
        };
        assert!(credentials_match(&config, &request));
        request.password = "asv2024".into();
        assert!(!credentials_match(&config, &request));
    }
}
