//! Member model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Registration state of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Pending,
    Approved,
    Denied,
}

impl MemberStatus {
    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Pending => "PENDING",
            MemberStatus::Approved => "APPROVED",
            MemberStatus::Denied => "DENIED",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(MemberStatus::Pending),
            "APPROVED" => Ok(MemberStatus::Approved),
            "DENIED" => Ok(MemberStatus::Denied),
            other => Err(format!("unknown member status: {}", other)),
        }
    }
}

/// Member entity
///
/// The credential fields implement the per-member half of the revocation
/// scheme: a presented QR payload is only valid while its version and nonce
/// match `credential_version` and `credential_nonce` exactly. Rotating them
/// invalidates every outstanding QR for this member without touching anyone
/// else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub roll_no: String,
    pub room_no: String,
    pub phone: String,
    pub status: MemberStatus,
    pub credential_version: i32,
    pub credential_nonce: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
