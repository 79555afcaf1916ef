//! Hashing helpers for values that must never be stored in clear.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 of the input as lowercase hex.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Storage key for a session token id (JWT `jti`).
pub fn session_token_hash(jti: &str) -> String {
    sha256_hex(jti)
}
