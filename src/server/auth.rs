use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::server::error::ApiError;
use crate::server::server::AppState;
use crate::sources::oauth2::AuthorizationGrant;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

pub async fn home() -> Json<Value> {
    Json(json!({ "message": "Assistant Calendar Wrapper is live." }))
}

/// Redirect to Google's consent page.
pub async fn authorize(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let url = state.oauth.authorization_url().map_err(ApiError::Internal)?;
    info!("redirecting to consent page");
    Ok(Redirect::temporary(url.as_str()))
}

/// OAuth2 redirect target: trade the code for tokens and hand them to the operator.
///
/// The returned refresh token is what `REFRESH_TOKEN` should be set to; the
/// running process keeps using the refresh token it was started with.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<AuthorizationGrant>, ApiError> {
    if let Some(error) = query.error {
        return Err(ApiError::AuthorizationDenied(error));
    }
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::AuthorizationDenied("missing authorization code".to_owned()))?;

    let grant = state
        .oauth
        .exchange_authorization_code(&code)
        .await
        .map_err(ApiError::CodeExchange)?;
    Ok(Json(grant))
}
