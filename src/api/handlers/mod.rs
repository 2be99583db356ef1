//! API handlers and the shared error response mapping.

pub mod auth;
pub mod health;
pub mod profiles;
pub mod root;

use crate::credentials::AuthError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

/// Body of every error response.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    fn response(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(Self {
                error: message.into(),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Provider(_) | Self::Store(_) => StatusCode::BAD_GATEWAY,
        };

        if self.is_upstream() {
            // keep the detail in the logs, the client only sees the generic message
            match std::error::Error::source(&self) {
                Some(source) => error!("Upstream failure: {source}"),
                None => error!("Upstream failure"),
            }
        }

        ErrorBody::response(status, self.to_string())
    }
}

/// Map a body extractor failure to a 400 with the standard error body.
pub(crate) fn bad_json(rejection: &JsonRejection) -> Response {
    debug!("Rejected request body: {rejection}");
    invalid_json()
}

pub(crate) fn invalid_json() -> Response {
    ErrorBody::response(StatusCode::BAD_REQUEST, "Invalid JSON body")
}

/// Token from `Authorization: Bearer <token>`, if present and non-empty.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
