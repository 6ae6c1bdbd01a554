use std::fmt;

use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_CALENDAR_ID, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_SCOPES, GOOGLE_AUTH_URL,
    GOOGLE_CALENDAR_API_URL, GOOGLE_TOKEN_URL,
};

/// ================================
/// Google OAuth2 + Calendar
/// ================================
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub redirect_uri: String,
    pub calendar_id: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub token_url: String,
    pub calendar_api_url: String,
    pub request_timeout_ms: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            redirect_uri: String::new(),
            calendar_id: DEFAULT_CALENDAR_ID.to_owned(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            auth_url: GOOGLE_AUTH_URL.to_owned(),
            token_url: GOOGLE_TOKEN_URL.to_owned(),
            calendar_api_url: GOOGLE_CALENDAR_API_URL.to_owned(),
            request_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }
}

// secrets never reach the logs
impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("redirect_uri", &self.redirect_uri)
            .field("calendar_id", &self.calendar_id)
            .field("scopes", &self.scopes)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("calendar_api_url", &self.calendar_api_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}
