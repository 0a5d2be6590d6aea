//! Production wiring of a `SessionOrchestrator`

use std::sync::Arc;

use tabauth_common::time::{Clock, SystemClock};
use tabauth_core::{Navigator, SessionOrchestrator};
use tabauth_domain::{AuthConfig, Result};
use tracing::info;

use crate::oidc::ReqwestOidcClient;
use crate::storage::{resolve_storage, StorageOptions};

/// Session over the storage selected by `config.storage`, the reqwest wire
/// client and the system clock
///
/// The `session` backend opens the default scope, so a reload on the
/// callback URL finds the authorization started before the redirect.
///
/// # Errors
/// Returns `AuthError::Config` for an invalid configuration and
/// `AuthError::Storage` if the storage backend cannot be opened.
pub fn create_session(config: AuthConfig, navigator: Arc<dyn Navigator>) -> Result<Arc<SessionOrchestrator>> {
    let options = StorageOptions::from_config(&config);
    create_session_with(config, navigator, &options)
}

/// Like [`create_session`] with explicit storage placement, e.g. one scope
/// per window through [`StorageOptions::with_new_scope`]
///
/// # Errors
/// See [`create_session`].
pub fn create_session_with(
    config: AuthConfig,
    navigator: Arc<dyn Navigator>,
    options: &StorageOptions,
) -> Result<Arc<SessionOrchestrator>> {
    config.validate()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let storage = resolve_storage(config.storage, options)?;
    let oidc = Arc::new(ReqwestOidcClient::new(config.clone(), clock.clone())?);

    info!(client_id = %config.client_id, storage = %config.storage, "session.created");
    Ok(Arc::new(SessionOrchestrator::new(config, storage, oidc, navigator, clock)))
}
