//! Error taxonomy for the access-control core
//!
//! Cryptographic and identity-resolution failures are deliberately opaque:
//! every malformed, forged, or stale credential collapses into
//! `InvalidCredential` so a caller can never learn which check failed.
//! Business-rule violations carry full detail, since they are
//! user-correctable input errors.

use chrono::NaiveDate;
use thiserror::Error;

/// Failures produced by the access-control core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Malformed, forged, stale-epoch, or nonce-mismatched QR credential
    #[error("invalid credential")]
    InvalidCredential,

    /// Staff bearer token missing, unknown, revoked, or expired
    #[error("unauthenticated")]
    Unauthenticated,

    /// Member referenced by a structurally valid credential does not exist;
    /// presented to callers exactly like `InvalidCredential`
    #[error("member not found")]
    MemberNotFound,

    /// Mess cut request rejected by the cutoff rule or an invalid range
    #[error("mess cut rejected: {detail}")]
    CutoffViolation { detail: String },

    /// A payment cycle or mess cut overlaps an existing record
    #[error("{entity} overlaps an existing one covering {from} to {to}")]
    OverlapViolation {
        entity: &'static str,
        from: NaiveDate,
        to: NaiveDate,
    },

    /// Attempt to reactivate a staff token whose expiry has already passed
    #[error("cannot reactivate an expired staff token")]
    AlreadyExpired,
}

/// Type alias for Result with AccessError
pub type AccessResult<T> = Result<T, AccessError>;
