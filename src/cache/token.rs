use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::cache::error::TokenRefreshError;

static ACCESS_TOKEN_FIELD: &str = "access_token";
static EXPIRES_IN_FIELD: &str = "expires_in";

/// The single cached bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(value: String, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    /// Build from a provider grant: `issued_at + expires_in - safety_margin`.
    /// A lifetime that does not fit a timestamp is rejected.
    pub fn from_grant(
        grant: TokenGrant,
        issued_at: DateTime<Utc>,
        default_expires_in_secs: i64,
        safety_margin: Duration,
    ) -> Result<Self, TokenRefreshError> {
        let expires_in = grant.expires_in.unwrap_or(default_expires_in_secs);
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .and_then(|at| at.checked_sub_signed(safety_margin))
            .ok_or(TokenRefreshError::LifetimeOutOfRange { expires_in })?;

        Ok(Self { value: grant.access_token, expires_at })
    }

    /// Strict: a token whose expiry equals `now` is already expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && now < self.expires_at
    }
}

/// Successful token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

impl TokenGrant {
    /// Parse a token endpoint body. The HTTP status is not consulted: only the
    /// presence of a non-empty `access_token` decides success.
    ///
    /// `expires_in` is read from an integer or a decimal-integer string.
    /// Anything else, floats included, is treated as absent.
    pub fn parse(body: &str) -> Result<Self, TokenRefreshError> {
        let missing = || TokenRefreshError::MissingAccessToken { body: body.to_owned() };

        let json: Value = serde_json::from_str(body).map_err(|_| missing())?;
        let access_token = json
            .get(ACCESS_TOKEN_FIELD)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(missing)?
            .to_owned();
        let expires_in = json.get(EXPIRES_IN_FIELD).and_then(lifetime_secs);

        Ok(Self { access_token, expires_in })
    }
}

fn lifetime_secs(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
