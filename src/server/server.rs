use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::cache::token_cache::TokenCache;
use crate::calendar::client::CalendarClient;
use crate::config::settings::SettingsConfig;
use crate::config::types::ServiceConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::{auth, mcp, tools};
use crate::sources::oauth2::{build_http_client, OAuth2Source};

pub type GoogleTokenCache = TokenCache<OAuth2Source>;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub token_cache: Arc<GoogleTokenCache>,
    pub oauth: Arc<OAuth2Source>,
    pub calendar: CalendarClient,
}

impl AppState {
    /// One HTTP client, one OAuth2 identity and one token cache for the whole process.
    pub fn new(service_config: &ServiceConfig, metrics: &Metrics) -> Result<Self> {
        let google = &service_config.google;
        let client = build_http_client(google.request_timeout_ms)?;
        let oauth = OAuth2Source::new(google, client.clone());

        Ok(Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            token_cache: Arc::new(TokenCache::new(oauth.clone())),
            oauth: Arc::new(oauth),
            calendar: CalendarClient::new(google, client),
        })
    }
}

pub fn app(state: AppState, settings_config: &SettingsConfig) -> Router {
    Router::new()
        .route("/", get(auth::home))
        .route("/authorize", get(auth::authorize))
        .route("/callback", get(auth::callback))
        .route("/tools/check_availability", get(tools::check_availability))
        .route("/tools/create_event", post(tools::create_event))
        .route("/mcp/manifest", get(mcp::manifest))
        .route("/mcp/query", post(mcp::query))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Start the gateway and serve until ctrl-c / SIGTERM.
pub async fn start(service_config: &ServiceConfig) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(service_config, metrics)?;
    let app = app(state, &service_config.settings);

    let server = &service_config.settings.server;
    let bind_addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!(
        "listening on {}, calendar '{}'",
        bind_addr,
        service_config.google.calendar_id
    );

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;
    metrics.up.set(0);

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
