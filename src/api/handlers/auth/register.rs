use super::types::{LoginResponse, RegisterRequest};
use crate::{
    api::handlers::{ErrorBody, bad_json},
    credentials::{CredentialFacade, ProfileAttributes},
};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = LoginResponse),
        (status = 400, description = "Malformed email, password, alias or body", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
        (status = 502, description = "Identity provider or profile store failed", body = ErrorBody),
    ),
    tag = "auth"
)]
pub async fn register(
    facade: Extension<Arc<CredentialFacade>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_json(&rejection),
    };

    let attributes = ProfileAttributes {
        alias: request.alias,
        profile_image: request.profile_image,
    };

    match facade
        .register(&request.email, &request.password, attributes)
        .await
    {
        Ok(signed_in) => (StatusCode::CREATED, Json(LoginResponse::from(signed_in))).into_response(),
        Err(err) => err.into_response(),
    }
}
