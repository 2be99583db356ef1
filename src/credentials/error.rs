use crate::{profile::StoreError, provider::ProviderError};
use thiserror::Error;

/// Error taxonomy of the credential facade.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Authentication(&'static str),
    #[error("Email already registered")]
    Conflict,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Upstream service error")]
    Provider(#[source] ProviderError),
    #[error("Upstream service error")]
    Store(#[source] StoreError),
}

impl AuthError {
    pub(crate) const INVALID_CREDENTIALS: &'static str = "Invalid credentials";
    pub(crate) const INVALID_TOKEN: &'static str = "Invalid or expired token";
    pub(crate) const MISSING_TOKEN: &'static str = "Missing bearer token";
    pub(crate) const PROFILE_NOT_FOUND: &'static str = "User profile not found";

    /// True for failures of an external collaborator.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Store(_))
    }
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::EmailExists => Self::Conflict,
            ProviderError::InvalidCredentials(_) => Self::Authentication(Self::INVALID_CREDENTIALS),
            ProviderError::InvalidToken => Self::Authentication(Self::INVALID_TOKEN),
            ProviderError::Rejected(code) => {
                Self::Validation(format!("Rejected by identity provider: {code}"))
            }
            other => Self::Provider(other),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_map_to_taxonomy() {
        assert!(matches!(
            AuthError::from(ProviderError::EmailExists),
            AuthError::Conflict
        ));
        assert!(matches!(
            AuthError::from(ProviderError::InvalidCredentials("USER_DISABLED".into())),
            AuthError::Authentication(AuthError::INVALID_CREDENTIALS)
        ));
        assert!(matches!(
            AuthError::from(ProviderError::InvalidToken),
            AuthError::Authentication(AuthError::INVALID_TOKEN)
        ));
        assert!(matches!(
            AuthError::from(ProviderError::Rejected("WEAK_PASSWORD".into())),
            AuthError::Validation(msg) if msg.contains("WEAK_PASSWORD")
        ));

        let upstream = AuthError::from(ProviderError::Upstream {
            status: 500,
            message: "INTERNAL".into(),
        });
        assert!(upstream.is_upstream());
        assert_eq!(upstream.to_string(), "Upstream service error");
    }

    #[test]
    fn credential_reason_is_not_exposed() {
        let err = AuthError::from(ProviderError::InvalidCredentials("EMAIL_NOT_FOUND".into()));
        assert_eq!(err.to_string(), "Invalid credentials");
    }
}
