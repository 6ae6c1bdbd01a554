use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::cache::error::TokenRefreshError;
use crate::utils::constants::NOT_AUTHORIZED_MSG;

/// Caller-visible failures of the route layer.
///
/// Token failures collapse into one "not authorized" answer; the underlying
/// error is only logged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authorized: {0}")]
    NotAuthorized(#[source] TokenRefreshError),

    #[error("invalid {tool} input: {reason}")]
    InvalidInput { tool: &'static str, reason: String },

    #[error("Tool '{0}' not recognized")]
    UnknownTool(String),

    #[error("authorization failed: {0}")]
    AuthorizationDenied(String),

    #[error("authorization code exchange failed: {0}")]
    CodeExchange(#[source] TokenRefreshError),

    #[error("calendar request failed: {0}")]
    Upstream(#[source] anyhow::Error),

    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotAuthorized(e) => {
                warn!(reason = e.reason(), "serving not authorized: {}", e);
                (StatusCode::UNAUTHORIZED, NOT_AUTHORIZED_MSG.to_owned())
            }
            ApiError::InvalidInput { .. } | ApiError::UnknownTool(_) => {
                warn!("{}", self);
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::AuthorizationDenied(_) => {
                warn!("{}", self);
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::CodeExchange(e) => {
                error!(reason = e.reason(), "{}", self);
                (StatusCode::BAD_GATEWAY, "authorization code exchange failed".to_owned())
            }
            ApiError::Upstream(_) => {
                error!("{}", self);
                (StatusCode::BAD_GATEWAY, "calendar request failed".to_owned())
            }
            ApiError::Internal(_) => {
                error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_authorized_hides_provider_body() {
        let err = ApiError::NotAuthorized(TokenRefreshError::MissingAccessToken {
            body: r#"{"error":"invalid_grant"}"#.into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unknown_tool_message() {
        let err = ApiError::UnknownTool("send_email".into());
        assert_eq!(err.to_string(), "Tool 'send_email' not recognized");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
