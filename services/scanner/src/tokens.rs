//! Staff bearer token store
//!
//! Issues, authenticates, revokes, and reactivates the bearer tokens that
//! scanner terminals present. The raw secret leaves this module exactly
//! once, at issue time; only its hash is stored or compared thereafter.

use chrono::{DateTime, Duration, Utc};
use mess::models::StaffToken;
use mess::{AccessError, token};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ScannerError, ScannerResult};
use crate::repositories::StaffTokenRepository;

/// Staff token store
#[derive(Clone)]
pub struct TokenStore {
    repo: StaffTokenRepository,
}

impl TokenStore {
    /// Create a new token store
    pub fn new(repo: StaffTokenRepository) -> Self {
        Self { repo }
    }

    /// Issue a new staff token
    ///
    /// Returns the stored record and the raw secret. The secret is never
    /// recoverable after this call.
    pub async fn issue(
        &self,
        label: &str,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> ScannerResult<(StaffToken, String)> {
        let raw_secret = token::generate_secret();
        let token_hash = token::hash_secret(&raw_secret);
        let expires_at = ttl.map(|ttl| now + ttl);

        let staff_token = self.repo.insert(label, &token_hash, expires_at).await?;
        info!(token_id = %staff_token.id, label, "issued staff token");

        Ok((staff_token, raw_secret))
    }

    /// Authenticate a presented bearer value
    ///
    /// Fails closed: an unknown hash, a revoked token, and an expired token
    /// all produce the same `Unauthenticated` error.
    pub async fn authenticate(
        &self,
        bearer: &str,
        now: DateTime<Utc>,
    ) -> ScannerResult<StaffToken> {
        let token_hash = token::hash_secret(bearer);

        let staff_token = self
            .repo
            .find_by_hash(&token_hash)
            .await?
            .ok_or(AccessError::Unauthenticated)?;

        if !staff_token.is_valid(now) {
            warn!(token_id = %staff_token.id, "rejected inactive or expired staff token");
            return Err(AccessError::Unauthenticated.into());
        }

        Ok(staff_token)
    }

    /// Revoke a token; idempotent
    pub async fn revoke(&self, id: Uuid) -> ScannerResult<StaffToken> {
        let staff_token = self
            .repo
            .set_active(id, false)
            .await?
            .ok_or_else(|| ScannerError::BadRequest("Staff token not found".to_string()))?;

        info!(token_id = %id, "revoked staff token");
        Ok(staff_token)
    }

    /// Reactivate a revoked token
    ///
    /// A token whose expiry has already passed stays dead; expired tokens
    /// cannot be silently resurrected.
    pub async fn reactivate(&self, id: Uuid, now: DateTime<Utc>) -> ScannerResult<StaffToken> {
        let staff_token = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ScannerError::BadRequest("Staff token not found".to_string()))?;

        if staff_token.is_expired(now) {
            return Err(AccessError::AlreadyExpired.into());
        }

        let staff_token = self
            .repo
            .set_active(id, true)
            .await?
            .ok_or_else(|| ScannerError::BadRequest("Staff token not found".to_string()))?;

        info!(token_id = %id, "reactivated staff token");
        Ok(staff_token)
    }
}
