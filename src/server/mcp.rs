use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};

use crate::server::error::ApiError;
use crate::server::server::AppState;
use crate::server::tools::{access_token, run_check_availability, run_create_event};
use crate::utils::constants::{TOOL_CHECK_AVAILABILITY, TOOL_CREATE_EVENT};

static ENTRYPOINT_MCP: &str = "mcp";
static UNKNOWN_TOOL_LABEL: &str = "unknown";

/// Tool manifest advertised to assistants.
pub fn tool_manifest() -> Value {
    json!({
        "name": "gcal_mcp_wrapper",
        "description": "Assistant tool that can check calendar availability and schedule meetings.",
        "tools": [
            {
                "name": TOOL_CHECK_AVAILABILITY,
                "description": "Returns a list of upcoming events in the calendar for the next 24 hours.",
                "input_schema": {
                    "type": "object",
                    "properties": {},
                    "required": []
                }
            },
            {
                "name": TOOL_CREATE_EVENT,
                "description": "Creates a new calendar event.",
                "input_schema": {
                    "type": "object",
                    "properties": {
                        "summary": {"type": "string"},
                        "start": {"type": "string", "description": "RFC3339 datetime string"},
                        "end": {"type": "string", "description": "RFC3339 datetime string"},
                        "attendees": {
                            "type": "array",
                            "items": {"type": "object"},
                            "description": "List of attendees with optional email and responseStatus"
                        },
                        "timezone": {"type": "string"}
                    },
                    "required": ["summary", "start", "end"]
                }
            }
        ]
    })
}

pub async fn manifest() -> Json<Value> {
    Json(tool_manifest())
}

/// `{"tool": "<name>", "input": {...}}` dispatch.
pub async fn query(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    let tool = payload.get("tool").and_then(Value::as_str).unwrap_or_default();
    let input = payload.get("input").cloned().unwrap_or_else(|| json!({}));

    match tool {
        TOOL_CHECK_AVAILABILITY => run_check_availability(&state, ENTRYPOINT_MCP).await,
        TOOL_CREATE_EVENT => run_create_event(&state, input, ENTRYPOINT_MCP).await,
        other => {
            // unauthorized wins over an unknown tool
            access_token(&state, UNKNOWN_TOOL_LABEL).await?;
            Err(ApiError::UnknownTool(other.to_owned()))
        }
    }
}
