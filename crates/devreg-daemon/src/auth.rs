//! Authentication middleware for bearer token validation
//!
//! Reads stay open; only requests whose method is listed in
//! `auth.protected_methods` need a token, and only when `auth.require_token`
//! is set.

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::AuthConfig;

/// Token check state built from configuration
pub struct AuthState {
    require_token: bool,
    tokens: HashSet<String>,
    protected: HashSet<Method>,
}

impl AuthState {
    /// Create new auth state
    pub fn new(config: AuthConfig) -> Self {
        let protected = config
            .protected_methods
            .iter()
            .filter_map(|m| match Method::from_bytes(m.to_uppercase().as_bytes()) {
                Ok(method) => Some(method),
                Err(_) => {
                    warn!(method = %m, "Ignoring unknown HTTP method in auth.protected_methods");
                    None
                }
            })
            .collect();

        if config.require_token && config.tokens.is_empty() {
            warn!(
                "Token auth is required but no tokens are configured; \
                 protected routes will reject every request"
            );
        }

        Self {
            require_token: config.require_token,
            tokens: config.tokens.into_iter().collect(),
            protected,
        }
    }

    /// Check if a request with this method needs a token
    pub fn is_required_for(&self, method: &Method) -> bool {
        self.require_token && self.protected.contains(method)
    }

    /// Validate a token
    pub fn validate_token(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}

/// Error response for authentication failures
#[derive(Serialize)]
struct AuthError {
    error: String,
    code: &'static str,
}

fn unauthorized(error: &str, code: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(AuthError {
            error: error.to_string(),
            code,
        }),
    )
        .into_response()
}

/// Authentication middleware
///
/// Validates Bearer tokens from the Authorization header on protected methods.
/// Passes through all requests when auth is disabled.
pub async fn auth_middleware(
    State(state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.is_required_for(request.method()) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) => token,
            None => {
                warn!("Invalid authorization header format");
                return unauthorized(
                    "Invalid authorization header format. Use: Bearer <token>",
                    "INVALID_AUTH_FORMAT",
                );
            }
        },
        None => {
            debug!(path = %request.uri().path(), "Missing authorization header");
            return unauthorized(
                "Authorization required. Include header: Authorization: Bearer <token>",
                "AUTH_REQUIRED",
            );
        }
    };

    if !state.validate_token(token) {
        warn!(path = %request.uri().path(), "Invalid token");
        return unauthorized("Invalid token", "INVALID_TOKEN");
    }

    debug!("Token validated successfully");
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(require_token: bool) -> AuthConfig {
        AuthConfig {
            require_token,
            tokens: vec!["abc123".to_string()],
            protected_methods: vec![
                "patch".to_string(),
                "DELETE".to_string(),
                "BOGUS METHOD".to_string(),
            ],
        }
    }

    #[test]
    fn test_protected_methods() {
        let state = AuthState::new(config(true));
        assert!(state.is_required_for(&Method::PATCH));
        assert!(state.is_required_for(&Method::DELETE));
        assert!(!state.is_required_for(&Method::GET));
        assert!(!state.is_required_for(&Method::POST));
    }

    #[test]
    fn test_disabled_auth_requires_nothing() {
        let state = AuthState::new(config(false));
        assert!(!state.is_required_for(&Method::PATCH));
    }

    #[test]
    fn test_token_validation() {
        let state = AuthState::new(config(true));
        assert!(state.validate_token("abc123"));
        assert!(!state.validate_token("invalid"));
    }
}
