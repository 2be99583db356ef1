//! Request/response types for auth endpoints.

use crate::credentials::SignedIn;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub alias: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .field("alias", &self.alias)
            .field("profile_image", &self.profile_image)
            .finish()
    }
}

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Returned by both register and login.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub alias: String,
    pub email: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl From<SignedIn> for LoginResponse {
    fn from(signed_in: SignedIn) -> Self {
        Self {
            token: signed_in.session.token,
            user_id: signed_in.profile.user_id,
            alias: signed_in.profile.alias,
            email: signed_in.profile.email,
            is_admin: signed_in.profile.is_admin,
            expires_in: signed_in.session.expires_in,
        }
    }
}

/// Optional body for logout when no `Authorization` header is sent.
#[derive(ToSchema, Deserialize, Default)]
pub struct LogoutRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub message: String,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn register_request_accepts_missing_image() -> Result<()> {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"email":"alice@example.com","password":"secret1","alias":"alice"}"#,
        )?;
        assert_eq!(request.profile_image, None);
        assert!(!format!("{request:?}").contains("secret1"));
        Ok(())
    }

    #[test]
    fn login_response_omits_unknown_expiry() -> Result<()> {
        let response = LoginResponse {
            token: "tok".to_string(),
            user_id: "u1".to_string(),
            alias: "alice".to_string(),
            email: "alice@example.com".to_string(),
            is_admin: false,
            expires_in: None,
        };
        let value = serde_json::to_value(&response)?;
        assert!(value.get("expires_in").is_none());
        assert_eq!(value.get("is_admin"), Some(&serde_json::Value::Bool(false)));
        Ok(())
    }
}
