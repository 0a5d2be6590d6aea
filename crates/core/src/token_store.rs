//! Typed persistence of tokens, the cached profile and PKCE artifacts
//!
//! Malformed persisted data is recovered here: it reads as absent and is
//! logged, never returned as an error.

use std::sync::Arc;

use tabauth_domain::constants::{NONCE_KEY, PKCE_VERIFIER_KEY, STATE_KEY, TOKENS_KEY, USER_KEY};
use tabauth_domain::{AuthError, PendingAuthorization, PkceChallenge, Result, TokenSet, UserProfile};
use tracing::{debug, warn};

use crate::ports::KeyValueStorage;

/// Token store over a shared key/value backend
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Underlying storage, shared with the refresh lock
    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    /// Persist the token set as JSON
    ///
    /// # Errors
    /// Returns the backend error if the write fails
    pub fn save(&self, tokens: &TokenSet) -> Result<()> {
        let json = serde_json::to_string(tokens)
            .map_err(|e| AuthError::Internal(format!("failed to encode token set: {e}")))?;
        self.storage.set(TOKENS_KEY, &json)
    }

    /// Load the persisted token set; missing, unreadable or malformed data is `None`
    pub fn load(&self) -> Option<TokenSet> {
        let raw = self.read(TOKENS_KEY)?;
        match serde_json::from_str::<TokenSet>(&raw) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                let err = AuthError::MalformedStorageData(format!("{TOKENS_KEY}: {e}"));
                warn!(error = %err, "token_store.tokens_malformed");
                None
            }
        }
    }

    /// Persist the cached user profile
    ///
    /// # Errors
    /// Returns the backend error if the write fails
    pub fn save_user(&self, user: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(user)
            .map_err(|e| AuthError::Internal(format!("failed to encode user profile: {e}")))?;
        self.storage.set(USER_KEY, &json)
    }

    /// Load the cached user profile; anything but a JSON object is `None`
    pub fn load_user(&self) -> Option<UserProfile> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                let err = AuthError::MalformedStorageData(format!("{USER_KEY}: {e}"));
                warn!(error = %err, "token_store.user_malformed");
                None
            }
        }
    }

    /// Persist verifier, state and nonce ahead of the authorize redirect
    ///
    /// # Errors
    /// Returns the first backend error; earlier writes are not rolled back
    pub fn save_pkce(&self, pkce: &PkceChallenge) -> Result<()> {
        self.storage.set(PKCE_VERIFIER_KEY, &pkce.verifier)?;
        self.storage.set(STATE_KEY, &pkce.state)?;
        self.storage.set(NONCE_KEY, &pkce.nonce)
    }

    /// Read the PKCE artifacts and remove them in the same step
    ///
    /// The artifacts are gone afterwards whatever the caller decides, so a
    /// callback can be completed at most once.
    ///
    /// # Errors
    /// Returns the backend error if a read fails
    pub fn take_pkce(&self) -> Result<PendingAuthorization> {
        let pending = PendingAuthorization {
            verifier: self.storage.get(PKCE_VERIFIER_KEY)?,
            state: self.storage.get(STATE_KEY)?,
            nonce: self.storage.get(NONCE_KEY)?,
        };
        self.remove_all(&[PKCE_VERIFIER_KEY, STATE_KEY, NONCE_KEY])?;
        Ok(pending)
    }

    /// Remove tokens, profile and any lingering PKCE artifacts
    ///
    /// Every removal is attempted even if an earlier one fails.
    ///
    /// # Errors
    /// Returns the first backend error encountered
    pub fn clear_all(&self) -> Result<()> {
        self.remove_all(&[TOKENS_KEY, USER_KEY, PKCE_VERIFIER_KEY, STATE_KEY, NONCE_KEY])?;
        debug!("token_store.cleared");
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        let mut first_error = None;
        for key in keys {
            if let Err(e) = self.storage.remove(key) {
                warn!(key = %key, error = %e, "token_store.remove_failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "token_store.read_failed");
                None
            }
        }
    }
}
