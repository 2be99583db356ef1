//! Identity provider seam.
//!
//! The provider owns credentials and tokens. This module only describes what
//! the credential facade needs from it; [`toolkit::ToolkitProvider`] speaks the
//! Identity Toolkit style REST dialect over HTTPS.

pub mod toolkit;

#[cfg(test)]
pub(crate) mod memory;

use crate::BoxFuture;
use std::fmt;
use thiserror::Error;

pub use toolkit::ToolkitProvider;

/// Account data as reported by the provider for a valid token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Provider-minted session returned by sign-up and sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub token: String,
    /// Seconds until the provider expires the token, when reported.
    pub expires_in: Option<u64>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("token", &"***")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("email already registered")]
    EmailExists,
    #[error("invalid credentials ({0})")]
    InvalidCredentials(String),
    #[error("invalid or revoked token")]
    InvalidToken,
    #[error("input rejected by provider ({0})")]
    Rejected(String),
    #[error("provider returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Operations the credential facade delegates to the identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Create an account and return a session for it.
    fn sign_up<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<Session, ProviderError>>;

    /// Verify an email/password pair and return a fresh session.
    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<Session, ProviderError>>;

    /// Resolve a session token to its account. Revoked tokens must fail.
    fn lookup<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Identity, ProviderError>>;

    /// Invalidate a session token.
    fn revoke<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<(), ProviderError>>;

    /// Replace the display name of the token's account.
    fn set_display_name<'a>(
        &'a self,
        token: &'a str,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<(), ProviderError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_debug_redacts_token() {
        let session = Session {
            user_id: "uid-1".to_string(),
            email: "a@example.com".to_string(),
            token: "secret-token".to_string(),
            expires_in: Some(3600),
        };
        let debug = format!("{session:?}");
        assert!(debug.contains("uid-1"));
        assert!(!debug.contains("secret-token"));
    }
}
