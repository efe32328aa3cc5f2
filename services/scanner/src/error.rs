//! Custom error types for the scanner service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mess::AccessError;
use serde_json::json;
use thiserror::Error;

/// Custom error type for the scanner service
#[derive(Error, Debug)]
pub enum ScannerError {
    /// Failure from the access-control core
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server error
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ScannerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ScannerError::Access(err) => match err {
                // Credential and identity failures share one opaque message
                // so a caller can never probe which check failed or whether
                // a member id exists
                AccessError::InvalidCredential | AccessError::MemberNotFound => {
                    (StatusCode::UNAUTHORIZED, "Invalid credential".to_string())
                }
                AccessError::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "Unauthenticated".to_string())
                }
                AccessError::CutoffViolation { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
                }
                AccessError::OverlapViolation { .. } => (StatusCode::CONFLICT, err.to_string()),
                AccessError::AlreadyExpired => (StatusCode::CONFLICT, err.to_string()),
            },
            ScannerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ScannerError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ScannerError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for scanner results
pub type ScannerResult<T> = Result<T, ScannerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_credential_failures_map_to_one_opaque_response() {
        let invalid = ScannerError::Access(AccessError::InvalidCredential).into_response();
        let missing = ScannerError::Access(AccessError::MemberNotFound).into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_business_violations_keep_their_detail() {
        let cutoff = ScannerError::Access(AccessError::CutoffViolation {
            detail: "earliest permitted start date is 2026-03-07".to_string(),
        });
        assert_eq!(
            cutoff.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let overlap = ScannerError::Access(AccessError::OverlapViolation {
            entity: "payment cycle",
            from: NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"),
            to: NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid date"),
        });
        assert_eq!(overlap.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_expired_reactivation_maps_to_conflict() {
        let err = ScannerError::Access(AccessError::AlreadyExpired);
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
