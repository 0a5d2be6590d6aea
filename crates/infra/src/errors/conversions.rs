//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use tabauth_domain::AuthError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AuthError);

impl From<InfraError> for AuthError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AuthError> for InfraError {
    fn from(value: AuthError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoAuthError {
    fn into_auth_error(self) -> AuthError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → AuthError */
/* -------------------------------------------------------------------------- */

impl IntoAuthError for HttpError {
    fn into_auth_error(self) -> AuthError {
        if self.is_timeout() {
            return AuthError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return AuthError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return AuthError::InvalidResponse(format!("response body could not be decoded: {self}"));
        }

        if let Some(status) = self.status() {
            return AuthError::http_status(status.as_u16(), "HTTP request");
        }

        AuthError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_auth_error())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → AuthError */
/* -------------------------------------------------------------------------- */

impl IntoAuthError for std::io::Error {
    fn into_auth_error(self) -> AuthError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => AuthError::Storage(format!("storage file not found: {self}")),
            ErrorKind::PermissionDenied => {
                AuthError::Storage(format!("storage access denied: {self}"))
            }
            _ => AuthError::Storage(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_auth_error())
    }
}

impl From<tempfile::PersistError> for InfraError {
    fn from(value: tempfile::PersistError) -> Self {
        InfraError(AuthError::Storage(format!("failed to persist storage file: {}", value.error)))
    }
}

/* -------------------------------------------------------------------------- */
/* Serialization formats → AuthError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(AuthError::MalformedStorageData(value.to_string()))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(AuthError::Config(format!("invalid TOML: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
