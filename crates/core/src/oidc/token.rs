//! Token endpoint response shaping

use serde::{Deserialize, Deserializer};
use tabauth_domain::constants::DEFAULT_EXPIRES_IN_SECONDS;
use tabauth_domain::{AuthError, Result, TokenSet};

/// Raw token endpoint response
///
/// `access_token` is optional here so its absence can be reported as an
/// invalid response rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "deserialize_expires_in")]
    pub expires_in: Option<i64>,
}

/// OAuth 2.0 error body (RFC 6749 section 5.2)
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// Convert into a token set received at `now_secs`
    ///
    /// A missing or non-positive `expires_in` uses the one hour default, so
    /// `expires_at` is always later than `now_secs`. When `prior_refresh_token`
    /// is given and the response carries none, it is kept.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidResponse` if `access_token` is missing or empty
    pub fn into_token_set(self, now_secs: i64, prior_refresh_token: Option<&str>) -> Result<TokenSet> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidResponse("token response has no access_token".into()))?;

        let expires_in =
            self.expires_in.filter(|secs| *secs > 0).unwrap_or(DEFAULT_EXPIRES_IN_SECONDS);

        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| prior_refresh_token.map(str::to_string));

        Ok(TokenSet {
            access_token,
            id_token: self.id_token,
            refresh_token,
            token_type: self.token_type,
            scope: self.scope,
            expires_at: now_secs.saturating_add(expires_in),
        })
    }
}

/// Accept `expires_in` as a JSON number or a numeric string
fn deserialize_expires_in<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flexible {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Flexible>::deserialize(deserializer)? {
        Some(Flexible::Int(secs)) => Some(secs),
        Some(Flexible::Float(secs)) if secs.is_finite() => Some(secs as i64),
        Some(Flexible::Text(text)) => text.trim().parse::<f64>().ok().filter(|s| s.is_finite()).map(|s| s as i64),
        _ => None,
    })
}
