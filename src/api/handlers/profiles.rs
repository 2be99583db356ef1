//! Profile endpoints.
//!
//! `/me` resolves the bearer token with the identity provider on every call;
//! `/profiles/{user_id}` is public and only exposes display attributes.

use super::{ErrorBody, bad_json, extract_bearer_token};
use crate::{
    credentials::{CredentialFacade, ProfileChanges},
    profile::{Profile, PublicProfile},
};
use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub alias: Option<String>,
    /// An empty string removes the image.
    pub profile_image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user_id: String,
    pub updated_fields: Vec<String>,
    pub profile: Profile,
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile of the token owner", body = Profile),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorBody),
        (status = 404, description = "Profile document missing", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
pub async fn get_me(
    facade: Extension<Arc<CredentialFacade>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = extract_bearer_token(&headers).unwrap_or_default();

    match facade.current_user(&token).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UpdateProfileResponse),
        (status = 400, description = "No fields, malformed alias or image URL", body = ErrorBody),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorBody),
        (status = 404, description = "Profile document missing", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
pub async fn patch_me(
    facade: Extension<Arc<CredentialFacade>>,
    headers: HeaderMap,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_json(&rejection),
    };

    let token = extract_bearer_token(&headers).unwrap_or_default();
    let changes = ProfileChanges {
        alias: request.alias,
        profile_image: request.profile_image,
    };

    match facade.update_profile(&token, changes).await {
        Ok((profile, updated_fields)) => (
            StatusCode::OK,
            Json(UpdateProfileResponse {
                message: "Profile updated".to_string(),
                user_id: profile.user_id.clone(),
                updated_fields,
                profile,
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/profiles/{user_id}",
    params(("user_id" = String, Path, description = "Provider-assigned user id")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 404, description = "No profile for this user", body = ErrorBody),
    ),
    tag = "profile"
)]
pub async fn public_profile(
    facade: Extension<Arc<CredentialFacade>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match facade.public_profile(&user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}
