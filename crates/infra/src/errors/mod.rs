//! Infrastructure error mapping

mod conversions;

pub use conversions::InfraError;
use tabauth_domain::AuthError;

/// Route an external error through [`InfraError`] into the domain error
pub(crate) fn into_auth<E: Into<InfraError>>(err: E) -> AuthError {
    let infra: InfraError = err.into();
    AuthError::from(infra)
}
