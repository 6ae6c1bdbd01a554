use thiserror::Error;

/// Failure to obtain a bearer token from the identity provider.
///
/// Neither variant carries the client secret or the refresh token: the body
/// is what the provider sent back, and transport errors only name the URL.
#[derive(Debug, Error)]
pub enum TokenRefreshError {
    #[error("token endpoint response has no access token: {body}")]
    MissingAccessToken { body: String },

    #[error("token endpoint returned an unusable lifetime: expires_in={expires_in}")]
    LifetimeOutOfRange { expires_in: i64 },

    #[error("token endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl TokenRefreshError {
    /// Metric label for the failure reason.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenRefreshError::MissingAccessToken { .. } => "missing_access_token",
            TokenRefreshError::LifetimeOutOfRange { .. } => "lifetime_out_of_range",
            TokenRefreshError::Transport(e) if e.is_timeout() => "timeout",
            TokenRefreshError::Transport(_) => "transport",
        }
    }
}
