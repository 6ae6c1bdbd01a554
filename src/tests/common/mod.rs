// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::Client;

use crate::cache::error::TokenRefreshError;
use crate::config::google::GoogleConfig;
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;
use crate::server::server::{app, AppState};
use crate::sources::RefreshTokenExchange;

pub const TEST_CLIENT_SECRET: &str = "client-secret-do-not-leak";
pub const TEST_REFRESH_TOKEN: &str = "1//refresh-do-not-leak";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn test_service_config(token_url: String, calendar_api_url: String) -> ServiceConfig {
    let mut cfg = ServiceConfig::default();
    cfg.settings.metrics.is_enabled = true;
    cfg.google = GoogleConfig {
        client_id: "client-1".into(),
        client_secret: TEST_CLIENT_SECRET.into(),
        refresh_token: TEST_REFRESH_TOKEN.into(),
        redirect_uri: "http://localhost:8080/callback".into(),
        token_url,
        calendar_api_url,
        request_timeout_ms: 2000,
        ..GoogleConfig::default()
    };
    cfg
}

/// Gateway router with real Google clients pointed at the given endpoints.
pub async fn spawn_gateway(cfg: &ServiceConfig) -> (JoinHandle<()>, SocketAddr) {
    let state = AppState::new(cfg, get_metrics().await).expect("app state");
    spawn_axum(app(state, &cfg.settings)).await
}

/// Token endpoint stand-in answering with queued bodies, counting calls.
#[derive(Clone, Default)]
pub struct ScriptedExchange {
    responses: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, body: serde_json::Value) -> &Self {
        self.responses.lock().unwrap().push_back(body.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RefreshTokenExchange for ScriptedExchange {
    async fn exchange_refresh_token(&self) -> Result<String, TokenRefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self.responses.lock().unwrap().pop_front();
        body.ok_or_else(|| TokenRefreshError::MissingAccessToken {
            body: "no scripted response left".into(),
        })
    }
}
