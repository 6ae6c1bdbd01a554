use chrono::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::error::TokenRefreshError;
use crate::cache::token::{CachedToken, TokenGrant};
use crate::helpers::time::{get_instant, Clock, SystemClock};
use crate::observability::metrics::get_metrics;
use crate::sources::RefreshTokenExchange;
use crate::utils::constants::{DEFAULT_EXPIRES_IN_SECS, DEFAULT_SAFETY_MARGIN_SECS};

/// Process-wide single-slot bearer token cache.
///
/// Serves the cached token while `now < expires_at` and otherwise runs one
/// refresh exchange. Refreshes are single-flight: callers that queue behind
/// an in-flight refresh re-check the slot and reuse its result. A failed
/// refresh leaves the slot as it was and fails only the current call.
pub struct TokenCache<E, C = SystemClock> {
    exchange: E,
    clock: C,
    slot: RwLock<Option<CachedToken>>,
    refresh_lock: Mutex<()>,
    safety_margin: Duration,
    default_expires_in_secs: i64,
}

impl<E: RefreshTokenExchange> TokenCache<E, SystemClock> {
    pub fn new(exchange: E) -> Self {
        Self::with_clock(exchange, SystemClock)
    }
}

impl<E: RefreshTokenExchange, C: Clock> TokenCache<E, C> {
    pub fn with_clock(exchange: E, clock: C) -> Self {
        Self {
            exchange,
            clock,
            slot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            safety_margin: Duration::seconds(DEFAULT_SAFETY_MARGIN_SECS),
            default_expires_in_secs: DEFAULT_EXPIRES_IN_SECS,
        }
    }

    /// Return a currently valid bearer token, refreshing it if needed.
    pub async fn get_access_token(&self) -> Result<String, TokenRefreshError> {
        let metrics = get_metrics().await;

        if let Some(value) = self.valid_value().await {
            metrics.token_cache_hits.inc();
            return Ok(value);
        }

        let _refreshing = self.refresh_lock.lock().await;

        // refreshed by whoever held the lock before us
        if let Some(value) = self.valid_value().await {
            metrics.token_cache_hits.inc();
            return Ok(value);
        }

        info!("access token absent or expired, refreshing");
        metrics.token_refresh_requests.inc();
        let start = get_instant();

        let grant = self
            .exchange
            .exchange_refresh_token()
            .await
            .and_then(|body| TokenGrant::parse(&body));
        metrics
            .token_refresh_duration
            .observe(start.elapsed().as_secs_f64());

        let token = grant
            .and_then(|grant| {
                CachedToken::from_grant(
                    grant,
                    self.clock.now(),
                    self.default_expires_in_secs,
                    self.safety_margin,
                )
            })
            .inspect_err(|e| {
                warn!(reason = e.reason(), "access token refresh failed: {}", e);
                metrics
                    .token_refresh_failures
                    .with_label_values(&[e.reason()])
                    .inc();
            })?;
        debug!("access token cached until {}", token.expires_at);
        metrics.token_expiry_unix.set(token.expires_at.timestamp());

        let value = token.value.clone();
        *self.slot.write().await = Some(token);
        Ok(value)
    }

    /// Copy of the slot, valid or not.
    pub async fn snapshot(&self) -> Option<CachedToken> {
        self.slot.read().await.clone()
    }

    /// Overwrite the slot directly.
    #[cfg(test)]
    pub(crate) async fn store(&self, token: CachedToken) {
        *self.slot.write().await = Some(token);
    }

    async fn valid_value(&self) -> Option<String> {
        let now = self.clock.now();
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_valid_at(now))
            .map(|token| token.value.clone())
    }
}
