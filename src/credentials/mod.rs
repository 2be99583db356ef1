//! Credential facade.
//!
//! Validates inbound credentials, delegates to the identity provider and keeps
//! the profile store in step. Token validity is never tracked here: every
//! token-bearing call is resolved by the provider, so a revoked token fails as
//! soon as the provider says so.

mod error;
pub mod validate;

pub use error::AuthError;

use crate::{
    profile::{Profile, ProfileStore, ProfileUpdate, PublicProfile},
    provider::{Identity, IdentityProvider, Session},
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validate::{check_alias, check_email, check_password, check_profile_image, normalize_email};

/// Display attributes supplied at registration.
#[derive(Clone, Debug, Default)]
pub struct ProfileAttributes {
    pub alias: String,
    pub profile_image: Option<String>,
}

/// Raw profile changes as received from the client.
#[derive(Clone, Debug, Default)]
pub struct ProfileChanges {
    pub alias: Option<String>,
    /// An empty string clears the image.
    pub profile_image: Option<String>,
}

/// Outcome of a successful register or login.
#[derive(Clone, Debug)]
pub struct SignedIn {
    pub session: Session,
    pub profile: Profile,
}

impl SignedIn {
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.session.user_id
    }
}

pub struct CredentialFacade {
    provider: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl CredentialFacade {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { provider, profiles }
    }

    #[must_use]
    pub fn profiles(&self) -> &dyn ProfileStore {
        self.profiles.as_ref()
    }

    /// Create the identity with the provider and write its profile document.
    ///
    /// # Errors
    /// `Validation` on malformed input, `Conflict` if the email is taken,
    /// `Provider`/`Store` on upstream failure.
    #[instrument(skip(self, password, attributes))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        attributes: ProfileAttributes,
    ) -> Result<SignedIn, AuthError> {
        let email = normalize_email(email);
        check_email(&email)?;
        check_password(password)?;

        let alias = attributes.alias.trim();
        check_alias(alias)?;

        let profile_image = match attributes.profile_image.as_deref() {
            Some(image) => check_profile_image(image)?,
            None => None,
        };

        let session = self.provider.sign_up(&email, password, alias).await?;

        let profile = Profile::new(
            session.user_id.clone(),
            email,
            alias.to_string(),
            profile_image,
        );

        // the identity already exists at this point, no rollback
        if let Err(err) = self.profiles.put(&profile).await {
            error!(
                user_id = %profile.user_id,
                "Identity created but profile write failed: {err}"
            );
            return Err(err.into());
        }

        info!(user_id = %profile.user_id, "User registered");

        Ok(SignedIn { session, profile })
    }

    /// Authenticate with the provider and load the caller's profile.
    ///
    /// # Errors
    /// `Authentication` on bad credentials, `NotFound` if the profile document
    /// is missing, `Provider`/`Store` on upstream failure.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let email = normalize_email(email);
        check_email(&email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let session = match self.provider.sign_in(&email, password).await {
            Ok(session) => session,
            Err(err) => {
                debug!("Sign-in rejected: {err}");
                return Err(err.into());
            }
        };

        let profile = self
            .profiles
            .get(&session.user_id)
            .await?
            .ok_or(AuthError::NotFound(AuthError::PROFILE_NOT_FOUND))?;

        info!(user_id = %session.user_id, "Login successful");

        Ok(SignedIn { session, profile })
    }

    /// Ask the provider to invalidate `token`; returns the user it belonged to.
    ///
    /// # Errors
    /// `Authentication` if the token is missing or already invalid,
    /// `Provider` on upstream failure.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &str) -> Result<String, AuthError> {
        let identity = self.authenticate(token).await?;

        self.provider.revoke(token.trim()).await?;

        info!(user_id = %identity.user_id, "Logout successful");

        Ok(identity.user_id)
    }

    /// Full profile of the token's owner.
    ///
    /// # Errors
    /// `Authentication` on an invalid token, `NotFound` without a profile.
    #[instrument(skip_all)]
    pub async fn current_user(&self, token: &str) -> Result<Profile, AuthError> {
        let identity = self.authenticate(token).await?;

        self.profiles
            .get(&identity.user_id)
            .await?
            .ok_or(AuthError::NotFound(AuthError::PROFILE_NOT_FOUND))
    }

    /// Update the display attributes of the token's owner.
    ///
    /// A new alias is also pushed to the provider as the display name; a
    /// failure there is logged and does not fail the update.
    ///
    /// Returns the new profile and the names of the updated fields.
    ///
    /// # Errors
    /// `Validation` if nothing or something malformed is supplied,
    /// `Authentication` on an invalid token, `NotFound` without a profile.
    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        token: &str,
        changes: ProfileChanges,
    ) -> Result<(Profile, Vec<String>), AuthError> {
        let update = profile_update(changes)?;

        let identity = self.authenticate(token).await?;

        let profile = self
            .profiles
            .update(&identity.user_id, &update)
            .await?
            .ok_or(AuthError::NotFound(AuthError::PROFILE_NOT_FOUND))?;

        // the provider copy of the alias is best effort, the profile is authoritative
        if let Some(alias) = &update.alias
            && let Err(err) = self.provider.set_display_name(token, alias).await
        {
            warn!(user_id = %identity.user_id, "Failed to update provider display name: {err}");
        }

        info!(user_id = %identity.user_id, "Profile updated");

        Ok((profile, update.fields()))
    }

    /// Public view of any user's profile.
    ///
    /// # Errors
    /// `NotFound` if there is no profile for `user_id`.
    #[instrument(skip(self))]
    pub async fn public_profile(&self, user_id: &str) -> Result<PublicProfile, AuthError> {
        self.profiles
            .get(user_id)
            .await?
            .map(PublicProfile::from)
            .ok_or(AuthError::NotFound(AuthError::PROFILE_NOT_FOUND))
    }

    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Authentication(AuthError::MISSING_TOKEN));
        }

        Ok(self.provider.lookup(token).await?)
    }
}

fn profile_update(changes: ProfileChanges) -> Result<ProfileUpdate, AuthError> {
    let alias = match changes.alias {
        Some(alias) => {
            let alias = alias.trim().to_string();
            check_alias(&alias)?;
            Some(alias)
        }
        None => None,
    };

    let profile_image = match changes.profile_image {
        Some(image) => Some(check_profile_image(&image)?),
        None => None,
    };

    let update = ProfileUpdate {
        alias,
        profile_image,
    };

    if update.is_empty() {
        return Err(AuthError::Validation(
            "At least one field must be provided".to_string(),
        ));
    }

    Ok(update)
}
