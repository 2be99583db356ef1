use super::types::{LogoutRequest, LogoutResponse};
use crate::{
    api::handlers::{ErrorBody, extract_bearer_token, invalid_json},
    credentials::CredentialFacade,
};
use axum::{
    Json,
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    post,
    path = "/logout",
    request_body(content = LogoutRequest, description = "Token, when no bearer header is sent"),
    responses(
        (status = 200, description = "Token revoked", body = LogoutResponse),
        (status = 400, description = "Malformed JSON body", body = ErrorBody),
        (status = 401, description = "Missing, invalid or already revoked token", body = ErrorBody),
        (status = 502, description = "Identity provider failed", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn logout(
    facade: Extension<Arc<CredentialFacade>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    // the header wins; the body is only consulted without one
    let token = match extract_bearer_token(&headers) {
        Some(token) => token,
        None => match token_from_body(&body) {
            Ok(token) => token.unwrap_or_default(),
            Err(err) => {
                debug!("Rejected logout body: {err}");
                return invalid_json();
            }
        },
    };

    match facade.logout(&token).await {
        Ok(user_id) => (
            StatusCode::OK,
            Json(LogoutResponse {
                message: "Logged out".to_string(),
                user_id,
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

/// Token from a `{"token": ...}` body. An empty or `null` body carries none.
fn token_from_body(body: &[u8]) -> Result<Option<String>, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let request: Option<LogoutRequest> = serde_json::from_slice(body)?;
    Ok(request.and_then(|request| request.token))
}
