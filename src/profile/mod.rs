//! Profile documents and the store seam.

pub mod memory;
pub mod postgres;

use crate::BoxFuture;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub use memory::MemoryProfileStore;
pub use postgres::PgProfileStore;

/// Profile document keyed by the provider-assigned user id.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    pub alias: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    #[must_use]
    pub fn new(
        user_id: String,
        email: String,
        alias: String,
        profile_image: Option<String>,
    ) -> Self {
        Self {
            user_id,
            email,
            alias,
            is_admin: false,
            profile_image,
            created_at: Utc::now(),
        }
    }

    /// Apply the mutable display attributes, leaving everything else untouched.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(alias) = &update.alias {
            self.alias.clone_from(alias);
        }
        if let Some(profile_image) = &update.profile_image {
            self.profile_image.clone_from(profile_image);
        }
    }
}

/// Profile view without email or admin flag.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PublicProfile {
    pub user_id: String,
    pub alias: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for PublicProfile {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id,
            alias: profile.alias,
            profile_image: profile.profile_image,
            created_at: profile.created_at,
        }
    }
}

/// Changes to the display attributes.
///
/// `profile_image: Some(None)` clears the image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub alias: Option<String>,
    pub profile_image: Option<Option<String>>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alias.is_none() && self.profile_image.is_none()
    }

    /// Names of the fields this update touches.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.alias.is_some() {
            fields.push("alias".to_string());
        }
        if self.profile_image.is_some() {
            fields.push("profile_image".to_string());
        }
        fields
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile store query failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid profile document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

/// Document store holding one profile per user.
pub trait ProfileStore: Send + Sync {
    /// Insert or replace the profile for `profile.user_id`.
    fn put<'a>(&'a self, profile: &'a Profile) -> BoxFuture<'a, Result<(), StoreError>>;

    fn get<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<Profile>, StoreError>>;

    /// Apply `update` and return the new document, or `None` if there is no profile.
    fn update<'a>(
        &'a self,
        user_id: &'a str,
        update: &'a ProfileUpdate,
    ) -> BoxFuture<'a, Result<Option<Profile>, StoreError>>;

    /// Cheap reachability check for `/health`.
    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile::new(
            "uid-1".to_string(),
            "alice@example.com".to_string(),
            "alice".to_string(),
            Some("https://cdn.example.com/a.png".to_string()),
        )
    }

    #[test]
    fn new_profile_is_not_admin() {
        let profile = profile();
        assert!(!profile.is_admin);
        assert_eq!(profile.alias, "alice");
    }

    #[test]
    fn apply_only_touches_display_attributes() {
        let mut profile = profile();
        let created_at = profile.created_at;
        profile.apply(&ProfileUpdate {
            alias: Some("alice_2".to_string()),
            profile_image: Some(None),
        });
        assert_eq!(profile.alias, "alice_2");
        assert_eq!(profile.profile_image, None);
        assert_eq!(profile.email, "alice@example.com");
        assert_eq!(profile.created_at, created_at);
    }

    #[test]
    fn update_fields_lists_touched_fields() {
        let update = ProfileUpdate {
            alias: None,
            profile_image: Some(Some("https://cdn.example.com/b.png".to_string())),
        };
        assert!(!update.is_empty());
        assert_eq!(update.fields(), vec!["profile_image".to_string()]);
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn document_defaults_optional_fields() {
        let doc = serde_json::json!({
            "user_id": "uid-1",
            "email": "alice@example.com",
            "alias": "alice",
            "created_at": "2024-10-13T10:30:00Z"
        });
        let profile: Profile = serde_json::from_value(doc).unwrap_or_else(|e| panic!("{e}"));
        assert!(!profile.is_admin);
        assert_eq!(profile.profile_image, None);
    }

    #[test]
    fn public_profile_drops_private_fields() {
        let public = PublicProfile::from(profile());
        let json = serde_json::to_value(&public).unwrap_or_default();
        assert!(json.get("email").is_none());
        assert!(json.get("is_admin").is_none());
        assert_eq!(json["alias"], "alice");
    }
}
