//! Middleware for staff and admin bearer authentication

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::AppState;
use crate::error::ScannerError;
use mess::{AccessError, token};

/// Authenticate the staff bearer token and stash it in request extensions
///
/// Runs before every scanner-facing route; a missing, unknown, revoked, or
/// expired token fails closed with one uniform response.
pub async fn staff_auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ScannerError> {
    let bearer = bearer_value(req.headers())?;

    let staff_token = state.token_store.authenticate(&bearer, Utc::now()).await?;

    // Hand the token to handlers so scan events can reference it
    req.extensions_mut().insert(staff_token);

    Ok(next.run(req).await)
}

/// Guard the admin routes with the configured admin bearer token
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ScannerError> {
    let bearer = bearer_value(req.headers())?;

    // Compare digests rather than the raw values so the check costs the
    // same however much of the token matches
    if token::hash_secret(&bearer) != token::hash_secret(&state.config.admin_token) {
        return Err(AccessError::Unauthenticated.into());
    }

    Ok(next.run(req).await)
}

fn bearer_value(headers: &HeaderMap) -> Result<String, ScannerError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AccessError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AccessError::Unauthenticated)?;

    // A bearer value never contains spaces; anything else is malformed
    if token.is_empty() || token.contains(' ') {
        return Err(AccessError::Unauthenticated.into());
    }

    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = value {
            headers.insert(
                axum::http::header::AUTHORIZATION,
                HeaderValue::from_str(value).expect("valid header"),
            );
        }
        headers
    }

    #[test]
    fn test_bearer_value_extraction() {
        let token = bearer_value(&headers(Some("Bearer abc123"))).expect("valid bearer");
        assert_eq!(token, "abc123");
    }

    #[test]
    fn test_missing_or_malformed_headers_are_rejected() {
        assert!(bearer_value(&headers(None)).is_err());
        assert!(bearer_value(&headers(Some("abc123"))).is_err());
        assert!(bearer_value(&headers(Some("Basic abc123"))).is_err());
        assert!(bearer_value(&headers(Some("Bearer "))).is_err());
        assert!(bearer_value(&headers(Some("Bearer two parts"))).is_err());
    }
}
