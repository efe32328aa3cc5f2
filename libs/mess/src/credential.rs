//! Signed QR credential encoding and verification
//!
//! A credential is the pipe-joined payload
//! `version|member_id|issued_at|nonce|signature` where the signature is the
//! hex HMAC-SHA256 of the first four fields under a server-held secret. Two
//! independent revocation levers exist: rotating the global secret epoch
//! invalidates every outstanding credential, and rotating a member's
//! version/nonce invalidates that member's alone. `issued_at` is recorded
//! for audit but is not an expiry; a credential only dies by rotation or a
//! member status change.
//!
//! The epoch and the member row are injected by the caller so the codec
//! stays free of hidden state.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AccessError, AccessResult};
use crate::models::Member;

type HmacSha256 = Hmac<Sha256>;

/// Field delimiter; guaranteed absent from every payload field
pub const FIELD_SEPARATOR: char = '|';

const PAYLOAD_FIELDS: usize = 5;

/// Parsed, signature-checked claims of a presented credential
///
/// Holding a `CredentialClaims` proves the payload was well-formed, signed
/// under the current secret, and issued under the current secret epoch. It
/// does not yet prove the member exists or still carries this
/// version/nonce; that is [`CredentialCodec::verify_member`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialClaims {
    pub version: i32,
    pub member_id: Uuid,
    pub issued_at: i64,
    pub nonce: String,
}

/// Encoder/verifier for member QR credentials
#[derive(Clone)]
pub struct CredentialCodec {
    secret: Vec<u8>,
}

impl CredentialCodec {
    /// Create a codec over the shared signing secret
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Build the signed payload for a member's QR code
    ///
    /// The payload carries the member's current credential version and
    /// nonce, so it stops verifying as soon as either rotates.
    pub fn issue(&self, member: &Member, now: DateTime<Utc>) -> String {
        let message = format!(
            "{}|{}|{}|{}",
            member.credential_version,
            member.id,
            now.timestamp(),
            member.credential_nonce
        );
        let signature = self.sign(&message);
        format!("{}|{}", message, signature)
    }

    /// Decode a presented payload and check structure, signature, and epoch
    ///
    /// Every failure collapses into [`AccessError::InvalidCredential`]; a
    /// caller can never distinguish a forged signature from a stale epoch
    /// or a malformed payload.
    pub fn decode(&self, payload: &str, secret_epoch: i32) -> AccessResult<CredentialClaims> {
        let parts: Vec<&str> = payload.split(FIELD_SEPARATOR).collect();
        if parts.len() != PAYLOAD_FIELDS {
            debug!(fields = parts.len(), "credential payload has wrong field count");
            return Err(AccessError::InvalidCredential);
        }

        let signature = parts[4];
        let message_len = payload.len() - signature.len() - 1;
        let message = &payload[..message_len];

        let signature_bytes =
            hex::decode(signature).map_err(|_| AccessError::InvalidCredential)?;
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take a key of any size");
        mac.update(message.as_bytes());
        // Constant-time comparison; a mismatch is indistinguishable from any
        // other malformed payload
        if mac.verify_slice(&signature_bytes).is_err() {
            debug!("credential signature verification failed");
            return Err(AccessError::InvalidCredential);
        }

        let version: i32 = parts[0].parse().map_err(|_| AccessError::InvalidCredential)?;
        if version != secret_epoch {
            debug!(
                presented = version,
                current = secret_epoch,
                "credential issued under a stale secret epoch"
            );
            return Err(AccessError::InvalidCredential);
        }

        let member_id =
            Uuid::parse_str(parts[1]).map_err(|_| AccessError::InvalidCredential)?;
        let issued_at: i64 = parts[2].parse().map_err(|_| AccessError::InvalidCredential)?;
        let nonce = parts[3].to_string();

        Ok(CredentialClaims {
            version,
            member_id,
            issued_at,
            nonce,
        })
    }

    /// Check decoded claims against the member row they name
    ///
    /// The member's own credential version and nonce must match the
    /// presented ones exactly; any drift means the credential was rotated
    /// away.
    pub fn verify_member(&self, claims: &CredentialClaims, member: &Member) -> AccessResult<Uuid> {
        if member.id != claims.member_id
            || member.credential_version != claims.version
            || member.credential_nonce != claims.nonce
        {
            debug!(member_id = %claims.member_id, "credential does not match member state");
            return Err(AccessError::InvalidCredential);
        }
        Ok(member.id)
    }

    fn sign(&self, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take a key of any size");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Generate a fresh 12-character lowercase hex credential nonce
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberStatus;

    const SECRET: &str = "a-test-secret-that-is-long-enough-to-sign-with";

    fn member() -> Member {
        Member {
            id: Uuid::new_v4(),
            name: "Asha Nair".to_string(),
            roll_no: "CS2023042".to_string(),
            room_no: "B-214".to_string(),
            phone: "+919812345678".to_string(),
            status: MemberStatus::Approved,
            credential_version: 1,
            credential_nonce: generate_nonce(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_verify_round_trip() {
        let codec = CredentialCodec::new(SECRET);
        let m = member();

        let payload = codec.issue(&m, Utc::now());
        let claims = codec.decode(&payload, m.credential_version).expect("decode");
        assert_eq!(codec.verify_member(&claims, &m), Ok(m.id));
    }

    #[test]
    fn test_round_trip_holds_for_any_issue_time() {
        let codec = CredentialCodec::new(SECRET);
        let m = member();

        for ts in [0i64, 1_000_000_000, 4_102_444_800] {
            let now = DateTime::from_timestamp(ts, 0).expect("valid timestamp");
            let payload = codec.issue(&m, now);
            let claims = codec.decode(&payload, 1).expect("decode");
            assert_eq!(claims.issued_at, ts);
            assert_eq!(codec.verify_member(&claims, &m), Ok(m.id));
        }
    }

    #[test]
    fn test_wrong_field_count_is_rejected() {
        let codec = CredentialCodec::new(SECRET);
        let m = member();
        let payload = codec.issue(&m, Utc::now());

        assert_eq!(
            codec.decode(&format!("{}|extra", payload), 1),
            Err(AccessError::InvalidCredential)
        );
        let truncated = payload.rsplit_once('|').expect("has separator").0;
        assert_eq!(
            codec.decode(truncated, 1),
            Err(AccessError::InvalidCredential)
        );
        assert_eq!(codec.decode("", 1), Err(AccessError::InvalidCredential));
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let codec = CredentialCodec::new(SECRET);
        let m = member();
        let payload = codec.issue(&m, Utc::now());

        // Flip every character of the signature segment in turn
        let (message, signature) = payload.rsplit_once('|').expect("has separator");
        for i in 0..signature.len() {
            let mut sig: Vec<char> = signature.chars().collect();
            sig[i] = if sig[i] == '0' { '1' } else { '0' };
            let tampered: String = sig.into_iter().collect();
            assert_eq!(
                codec.decode(&format!("{}|{}", message, tampered), 1),
                Err(AccessError::InvalidCredential),
                "flipped signature character {} was accepted",
                i
            );
        }
    }

    #[test]
    fn test_non_hex_signature_is_rejected_like_a_mismatch() {
        let codec = CredentialCodec::new(SECRET);
        let m = member();
        let payload = codec.issue(&m, Utc::now());
        let message = payload.rsplit_once('|').expect("has separator").0;

        assert_eq!(
            codec.decode(&format!("{}|not-hex-at-all", message), 1),
            Err(AccessError::InvalidCredential)
        );
    }

    #[test]
    fn test_altered_fields_are_rejected() {
        let codec = CredentialCodec::new(SECRET);
        let m = member();
        let payload = codec.issue(&m, Utc::now());
        let parts: Vec<&str> = payload.split('|').collect();

        // Alter member id
        let other_id = Uuid::new_v4().to_string();
        let forged = format!(
            "{}|{}|{}|{}|{}",
            parts[0], other_id, parts[2], parts[3], parts[4]
        );
        assert_eq!(codec.decode(&forged, 1), Err(AccessError::InvalidCredential));

        // Alter version
        let forged = format!("2|{}|{}|{}|{}", parts[1], parts[2], parts[3], parts[4]);
        assert_eq!(codec.decode(&forged, 2), Err(AccessError::InvalidCredential));

        // Alter nonce
        let forged = format!(
            "{}|{}|{}|{}|{}",
            parts[0], parts[1], parts[2], "ffffffffffff", parts[4]
        );
        assert_eq!(codec.decode(&forged, 1), Err(AccessError::InvalidCredential));
    }

    #[test]
    fn test_stale_epoch_is_rejected() {
        let codec = CredentialCodec::new(SECRET);
        let m = member();
        let payload = codec.issue(&m, Utc::now());

        // Valid under epoch 1, rejected once the global epoch advances,
        // even though signature and per-member nonce are still correct
        assert!(codec.decode(&payload, 1).is_ok());
        assert_eq!(codec.decode(&payload, 2), Err(AccessError::InvalidCredential));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let codec = CredentialCodec::new(SECRET);
        let other = CredentialCodec::new("an-entirely-different-signing-secret");
        let m = member();

        let payload = codec.issue(&m, Utc::now());
        assert_eq!(other.decode(&payload, 1), Err(AccessError::InvalidCredential));
    }

    #[test]
    fn test_rotated_member_credential_stops_verifying() {
        let codec = CredentialCodec::new(SECRET);
        let mut m = member();
        let payload = codec.issue(&m, Utc::now());

        // Nonce rotation invalidates the old payload for this member only
        m.credential_nonce = generate_nonce();
        let claims = codec.decode(&payload, 1).expect("decode");
        assert_eq!(
            codec.verify_member(&claims, &m),
            Err(AccessError::InvalidCredential)
        );
    }

    #[test]
    fn test_claims_for_someone_else_do_not_verify() {
        let codec = CredentialCodec::new(SECRET);
        let m = member();
        let other = member();

        let payload = codec.issue(&m, Utc::now());
        let claims = codec.decode(&payload, 1).expect("decode");
        assert_eq!(
            codec.verify_member(&claims, &other),
            Err(AccessError::InvalidCredential)
        );
    }

    #[test]
    fn test_generated_nonce_shape() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 12);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(nonce, generate_nonce());
    }
}
