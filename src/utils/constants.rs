//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: i64 = 60;
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

// Google endpoints
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/calendar",
];

// Grant types
pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";

// Tool names
pub const TOOL_CHECK_AVAILABILITY: &str = "check_availability";
pub const TOOL_CREATE_EVENT: &str = "create_event";

pub const NOT_AUTHORIZED_MSG: &str = "Not authorized. Please visit /authorize.";
