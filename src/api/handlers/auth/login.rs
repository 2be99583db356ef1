use super::types::{LoginRequest, LoginResponse};
use crate::{
    api::handlers::{ErrorBody, bad_json},
    credentials::CredentialFacade,
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
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Malformed email or body", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 404, description = "Profile document missing", body = ErrorBody),
        (status = 502, description = "Identity provider or profile store failed", body = ErrorBody),
    ),
    tag = "auth"
)]
pub async fn login(
    facade: Extension<Arc<CredentialFacade>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_json(&rejection),
    };

    match facade.login(&request.email, &request.password).await {
        Ok(signed_in) => (StatusCode::OK, Json(LoginResponse::from(signed_in))).into_response(),
        Err(err) => err.into_response(),
    }
}
