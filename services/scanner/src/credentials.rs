//! Credential issuance and rotation
//!
//! Issues QR images for approved members and drives both revocation levers:
//! per-member nonce rotation and the global secret epoch. Epoch rotation is
//! best-effort per member; one member's failed update must not block the
//! rest, so the caller gets a per-member success/failure report.

use chrono::{DateTime, Utc};
use mess::credential::{self, CredentialCodec};
use mess::models::MemberStatus;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ScannerError, ScannerResult};
use crate::repositories::{MemberRepository, SettingsRepository};

/// Result of one global epoch rotation
#[derive(Debug, Clone, Serialize)]
pub struct EpochRotation {
    pub new_epoch: i32,
    /// Members whose credentials were re-keyed under the new epoch
    pub rotated: Vec<Uuid>,
    /// Members whose update failed and still need re-issuing
    pub failed: Vec<MemberRotationFailure>,
}

/// One member whose credential rotation failed
#[derive(Debug, Clone, Serialize)]
pub struct MemberRotationFailure {
    pub member_id: Uuid,
    pub error: String,
}

/// Credential issuance and rotation service
#[derive(Clone)]
pub struct CredentialService {
    members: MemberRepository,
    settings: SettingsRepository,
    codec: CredentialCodec,
}

impl CredentialService {
    /// Create a new credential service
    pub fn new(
        members: MemberRepository,
        settings: SettingsRepository,
        codec: CredentialCodec,
    ) -> Self {
        Self {
            members,
            settings,
            codec,
        }
    }

    /// Render the current QR credential of an approved member as PNG bytes
    pub async fn issue_qr(&self, member_id: Uuid, now: DateTime<Utc>) -> ScannerResult<Vec<u8>> {
        let member = self
            .members
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| ScannerError::BadRequest("Member not found".to_string()))?;

        if member.status != MemberStatus::Approved {
            return Err(ScannerError::BadRequest(
                "Member is not approved".to_string(),
            ));
        }

        let payload = self.codec.issue(&member, now);
        info!(member_id = %member.id, "issued credential QR");
        Ok(mess::qr::render_png(&payload)?)
    }

    /// Rotate one member's credential, invalidating their outstanding QR
    ///
    /// The member is re-keyed under the current secret epoch with a fresh
    /// nonce; the caller is responsible for re-issuing and re-notifying.
    pub async fn rotate_member(&self, member_id: Uuid) -> ScannerResult<(i32, String)> {
        let epoch = self.settings.current_epoch().await?;
        let nonce = credential::generate_nonce();

        self.members
            .update_credential(member_id, epoch, &nonce)
            .await?;

        Ok((epoch, nonce))
    }

    /// Advance the global secret epoch, invalidating every outstanding
    /// credential, then re-key each approved member under the new epoch
    pub async fn rotate_epoch(&self) -> ScannerResult<EpochRotation> {
        let new_epoch = self.settings.advance_epoch().await?;
        let member_ids = self.members.approved_ids().await?;

        let mut rotated = Vec::new();
        let mut failed = Vec::new();

        for member_id in member_ids {
            let nonce = credential::generate_nonce();
            match self
                .members
                .update_credential(member_id, new_epoch, &nonce)
                .await
            {
                Ok(()) => rotated.push(member_id),
                Err(err) => {
                    warn!(member_id = %member_id, error = %err, "member credential rotation failed");
                    failed.push(MemberRotationFailure {
                        member_id,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            new_epoch,
            rotated = rotated.len(),
            failed = failed.len(),
            "rotated credential secret epoch"
        );

        Ok(EpochRotation {
            new_epoch,
            rotated,
            failed,
        })
    }
}
