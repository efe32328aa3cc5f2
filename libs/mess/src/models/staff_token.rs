//! Staff token model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff bearer credential entity
///
/// Only the SHA-256 hash of the secret is stored; the raw secret is shown
/// to the issuing admin exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffToken {
    pub id: Uuid,
    pub label: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub active: bool,
    pub issued_at: DateTime<Utc>,
    /// `None` means the token never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl StaffToken {
    /// Whether the token authenticates at `now`
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at > now,
            None => true,
        }
    }

    /// Whether the expiry deadline has already passed at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(active: bool, expires_at: Option<DateTime<Utc>>) -> StaffToken {
        StaffToken {
            id: Uuid::new_v4(),
            label: "Front gate tablet".to_string(),
            token_hash: "0".repeat(64),
            active,
            issued_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_token_without_expiry_is_valid() {
        let now = Utc::now();
        assert!(token(true, None).is_valid(now));
    }

    #[test]
    fn test_inactive_token_is_invalid() {
        let now = Utc::now();
        assert!(!token(false, None).is_valid(now));
        assert!(!token(false, Some(now + Duration::hours(1))).is_valid(now));
    }

    #[test]
    fn test_one_hour_token_rejected_after_61_minutes() {
        let issued = Utc::now();
        let t = token(true, Some(issued + Duration::hours(1)));
        assert!(t.is_valid(issued + Duration::minutes(59)));
        assert!(!t.is_valid(issued + Duration::minutes(61)));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let issued = Utc::now();
        let t = token(true, Some(issued + Duration::hours(1)));
        // Valid strictly before the deadline, invalid at the deadline
        assert!(!t.is_valid(issued + Duration::hours(1)));
        assert!(t.is_expired(issued + Duration::hours(1)));
        assert!(!t.is_expired(issued + Duration::minutes(59)));
    }
}
