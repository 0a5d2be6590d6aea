//! PKCE (Proof Key for Code Exchange) primitives for OAuth 2.0
//!
//! Implements the S256 method of RFC 7636: the verifier stays with the client
//! until the token exchange, the challenge travels with the authorization
//! request.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tabauth_domain::constants::{NONCE_BYTES, STATE_BYTES, VERIFIER_BYTES};
use tabauth_domain::{AuthError, PkceChallenge, Result};

/// Generate a URL-safe random string from `byte_length` bytes of OS entropy
///
/// The bytes are encoded as base64url without padding, so 32 bytes yield 43
/// characters (within the RFC 7636 verifier limits of 43-128).
///
/// # Errors
/// Returns `AuthError::Internal` if the operating system RNG is unavailable
pub fn generate_random_string(byte_length: usize) -> Result<String> {
    let mut bytes = vec![0u8; byte_length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Internal(format!("secure random source failed: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Derive the S256 code challenge: BASE64URL(SHA256(UTF8(verifier)))
#[must_use]
pub fn derive_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Generate a fresh verifier, challenge, state and nonce
///
/// Each value is drawn independently: 32 bytes for the verifier, 16 bytes
/// each for state and nonce.
///
/// # Errors
/// Returns `AuthError::Internal` if the operating system RNG is unavailable
pub fn generate_pkce_challenge() -> Result<PkceChallenge> {
    let verifier = generate_random_string(VERIFIER_BYTES)?;
    let challenge = derive_challenge(&verifier);
    let state = generate_random_string(STATE_BYTES)?;
    let nonce = generate_random_string(NONCE_BYTES)?;

    Ok(PkceChallenge { verifier, challenge, state, nonce })
}

/// Compare the stored and returned `state` values
///
/// Runs in time independent of where the inputs first differ.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    let (a, b) = (expected.as_bytes(), actual.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
