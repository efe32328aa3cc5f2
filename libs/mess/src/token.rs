//! Staff bearer secret primitives
//!
//! A staff secret is 32 bytes from the system CSPRNG, URL-safe
//! base64-encoded so it survives being pasted into a scanner URL. Only its
//! SHA-256 hex digest is ever stored; the digest doubles as the lookup key
//! during authentication, so no secret comparison happens on that path.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Entropy of a freshly issued staff secret, in bytes
pub const SECRET_BYTES: usize = 32;

/// Generate a new raw staff secret
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// One-way hash of a presented secret, as stored and looked up
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secret_is_url_safe_and_long_enough() {
        let secret = generate_secret();
        // 32 bytes of entropy, base64 without padding
        assert_eq!(secret.len(), 43);
        assert!(
            secret
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_secrets_are_unique() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn test_hash_is_deterministic_sha256_hex() {
        let hash = hash_secret("some-bearer-secret");
        assert_eq!(hash, hash_secret("some-bearer-secret"));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash, hash_secret("some-other-secret"));
    }
}
