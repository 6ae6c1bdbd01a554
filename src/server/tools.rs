use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use crate::calendar::client::CalendarResponse;
use crate::calendar::event::EventRequest;
use crate::observability::metrics::get_metrics;
use crate::server::error::ApiError;
use crate::server::server::AppState;
use crate::utils::constants::{TOOL_CHECK_AVAILABILITY, TOOL_CREATE_EVENT};

static ENTRYPOINT_TOOLS: &str = "tools";

pub async fn check_availability(State(state): State<AppState>) -> Result<Response, ApiError> {
    run_check_availability(&state, ENTRYPOINT_TOOLS).await
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Response, ApiError> {
    run_create_event(&state, input, ENTRYPOINT_TOOLS).await
}

pub(crate) async fn run_check_availability(state: &AppState, entrypoint: &str) -> Result<Response, ApiError> {
    get_metrics().await.tool_requests.with_label_values(&[TOOL_CHECK_AVAILABILITY, entrypoint]).inc();
    let access_token = access_token(state, TOOL_CHECK_AVAILABILITY).await?;

    let response = state
        .calendar
        .upcoming_events(&access_token, Utc::now())
        .await
        .map_err(ApiError::Upstream)?;
    Ok(pass_through(response))
}

/// The token is checked before the input is validated.
pub(crate) async fn run_create_event(state: &AppState, input: Value, entrypoint: &str) -> Result<Response, ApiError> {
    get_metrics().await.tool_requests.with_label_values(&[TOOL_CREATE_EVENT, entrypoint]).inc();
    let access_token = access_token(state, TOOL_CREATE_EVENT).await?;

    debug!("create_event input: {}", input);
    let request = EventRequest::from_value(input).map_err(|e| ApiError::InvalidInput {
        tool: TOOL_CREATE_EVENT,
        reason: e.to_string(),
    })?;
    let payload = request.to_event_payload();
    info!(
        "creating event '{}' in calendar '{}'",
        payload["summary"].as_str().unwrap_or_default(),
        state.calendar.calendar_id()
    );

    let response = state
        .calendar
        .insert_event(&access_token, &payload)
        .await
        .map_err(ApiError::Upstream)?;
    Ok(pass_through(response))
}

pub(crate) async fn access_token(state: &AppState, tool: &str) -> Result<String, ApiError> {
    match state.token_cache.get_access_token().await {
        Ok(access_token) => Ok(access_token),
        Err(e) => {
            get_metrics().await.unauthorized_responses.with_label_values(&[tool]).inc();
            Err(ApiError::NotAuthorized(e))
        }
    }
}

fn pass_through(response: CalendarResponse) -> Response {
    (response.status, Json(response.body)).into_response()
}
