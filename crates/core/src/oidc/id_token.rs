//! Minimal ID token payload inspection
//!
//! Only the `nonce` claim is read. The signature is not verified.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use tabauth_domain::{AuthError, Result};

/// Extract the `nonce` claim from a compact JWS ID token
///
/// Returns `Ok(None)` when the payload has no string `nonce` claim.
///
/// # Errors
/// Returns `AuthError::InvalidResponse` if the token is not a three part JWS
/// with a base64url JSON object payload
pub fn nonce_claim(id_token: &str) -> Result<Option<String>> {
    let mut parts = id_token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(AuthError::InvalidResponse("id_token is not a compact JWS".into())),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidResponse(format!("id_token payload is not base64url: {e}")))?;
    let claims: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::InvalidResponse(format!("id_token payload is not a JSON object: {e}")))?;

    Ok(claims.get("nonce").and_then(|v| v.as_str()).map(str::to_string))
}
