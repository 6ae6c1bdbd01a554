use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::error::TokenRefreshError;
use crate::cache::token::TokenGrant;
use crate::config::google::GoogleConfig;
use crate::sources::RefreshTokenExchange;
use crate::utils::constants::{GRANT_AUTHORIZATION_CODE, GRANT_REFRESH_TOKEN};

/// Google OAuth2 client for one fixed identity.
///
/// Deliberately not `Debug`: it holds the client secret and refresh token.
#[derive(Clone)]
pub struct OAuth2Source {
    client: Client,
    auth_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    redirect_uri: String,
    scopes: Vec<String>,
}

/// Result of the authorization-code exchange.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthorizationGrant {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

impl AuthorizationGrant {
    pub fn parse(body: &str) -> Result<Self, TokenRefreshError> {
        let TokenGrant { access_token, expires_in } = TokenGrant::parse(body)?;
        let refresh_token = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| json.get("refresh_token").and_then(Value::as_str).map(str::to_owned));
        Ok(Self { access_token, refresh_token, expires_in })
    }
}

pub fn build_http_client(timeout_ms: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| anyhow!("failed to build HTTP client: {}", e))
}

impl OAuth2Source {
    pub fn new(cfg: &GoogleConfig, client: Client) -> Self {
        Self {
            client,
            auth_url: cfg.auth_url.to_owned(),
            token_url: cfg.token_url.to_owned(),
            client_id: cfg.client_id.to_owned(),
            client_secret: cfg.client_secret.to_owned(),
            refresh_token: cfg.refresh_token.to_owned(),
            redirect_uri: cfg.redirect_uri.to_owned(),
            scopes: cfg.scopes.to_owned(),
        }
    }

    /// Consent page URL requesting offline access, so the callback yields a refresh token.
    pub fn authorization_url(&self) -> Result<Url> {
        let scope = self.scopes.join(" ");
        Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| anyhow!("invalid authorization url '{}': {}", self.auth_url, e))
    }

    pub async fn exchange_authorization_code(
        &self,
        code: &str,
    ) -> Result<AuthorizationGrant, TokenRefreshError> {
        let form = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", GRANT_AUTHORIZATION_CODE),
        ];
        let body = self.post_token_form(&form).await?;
        let grant = AuthorizationGrant::parse(&body)?;
        info!(
            refresh_token_issued = grant.refresh_token.is_some(),
            "authorization code exchanged"
        );
        Ok(grant)
    }

    async fn post_token_form(&self, form: &[(&str, &str)]) -> Result<String, TokenRefreshError> {
        let response = self.client.post(&self.token_url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("token endpoint answered {}", status);
        Ok(body)
    }
}

impl RefreshTokenExchange for OAuth2Source {
    async fn exchange_refresh_token(&self) -> Result<String, TokenRefreshError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", GRANT_REFRESH_TOKEN),
        ];
        self.post_token_form(&form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::google::GoogleConfig;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    fn google_config(token_url: String) -> GoogleConfig {
        GoogleConfig {
            client_id: "client-1".into(),
            client_secret: "s3cret".into(),
            refresh_token: "1//refresh".into(),
            redirect_uri: "http://localhost:8080/callback".into(),
            token_url,
            ..GoogleConfig::default()
        }
    }

    #[test]
    fn authorization_url_requests_offline_consent() {
        let source = OAuth2Source::new(&google_config("http://unused".into()), Client::new());
        let url = source.authorization_url().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(url.as_str().starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(pairs.contains(&("client_id".into(), "client-1".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://localhost:8080/callback".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("prompt".into(), "consent".into())));
        assert!(pairs.contains(&(
            "scope".into(),
            "https://www.googleapis.com/auth/gmail.readonly https://www.googleapis.com/auth/calendar".into()
        )));
    }

    #[tokio::test]
    async fn refresh_grant_posts_form_and_returns_raw_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token")
                    .body_includes("grant_type=refresh_token")
                    .body_includes("client_id=client-1")
                    .body_includes("client_secret=s3cret")
                    .body_includes("refresh_token=1%2F%2Frefresh");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"access_token": "tok1", "expires_in": 3600}));
            })
            .await;

        let source = OAuth2Source::new(&google_config(server.url("/token")), Client::new());
        let body = source.exchange_refresh_token().await.unwrap();

        mock.assert_async().await;
        assert_eq!(TokenGrant::parse(&body).unwrap().access_token, "tok1");
    }

    #[tokio::test]
    async fn authorization_code_exchange_keeps_refresh_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token")
                    .body_includes("grant_type=authorization_code")
                    .body_includes("code=4%2Fcode");
                then.status(200).json_body(json!({
                    "access_token": "tok-from-code",
                    "refresh_token": "1//new-refresh",
                    "expires_in": 3599
                }));
            })
            .await;

        let source = OAuth2Source::new(&google_config(server.url("/token")), Client::new());
        let grant = source.exchange_authorization_code("4/code").await.unwrap();

        mock.assert_async().await;
        assert_eq!(grant.access_token, "tok-from-code");
        assert_eq!(grant.refresh_token.as_deref(), Some("1//new-refresh"));
        assert_eq!(grant.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // nothing listens on port 9 locally
        let source = OAuth2Source::new(&google_config("http://127.0.0.1:9/token".into()), Client::new());
        let err = source.exchange_refresh_token().await.unwrap_err();
        assert!(matches!(err, TokenRefreshError::Transport(_)));
    }
}
