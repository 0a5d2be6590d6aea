//! Redirect return detection on the current location

use url::Url;

/// Query parameters removed from the location once a callback is handled
const CALLBACK_PARAMS: [&str; 6] =
    ["code", "state", "error", "error_description", "error_uri", "session_state"];

/// Authorization server redirect back to the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    /// Successful authorization: a code to exchange
    Code { code: String, state: String },
    /// The provider refused or failed the request
    Error { error: String, description: Option<String>, state: String },
}

impl Callback {
    pub fn state(&self) -> &str {
        match self {
            Self::Code { state, .. } | Self::Error { state, .. } => state,
        }
    }
}

/// Classify the location as a callback
///
/// A location is a callback only when it carries a non-empty `state` together
/// with either a non-empty `code` or an `error`. Unparseable locations are
/// not callbacks.
pub fn detect_callback(location: &str) -> Option<Callback> {
    let url = Url::parse(location).ok()?;
    let param = |name: &str| {
        url.query_pairs().find(|(k, _)| k == name).map(|(_, v)| v.into_owned()).filter(|v| !v.is_empty())
    };

    let state = param("state")?;
    if let Some(code) = param("code") {
        return Some(Callback::Code { code, state });
    }
    param("error").map(|error| Callback::Error { error, description: param("error_description"), state })
}

/// Location with the callback parameters removed, other parameters kept
///
/// Returns `None` if the location cannot be parsed.
pub fn strip_callback_params(location: &str) -> Option<String> {
    let mut url = Url::parse(location).ok()?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !CALLBACK_PARAMS.contains(&&**k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept.iter());
    }
    Some(url.to_string())
}
