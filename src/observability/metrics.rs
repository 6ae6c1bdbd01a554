use prometheus::core::Collector;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token cache metrics
    pub token_cache_hits: IntCounter,
    pub token_refresh_requests: IntCounter,
    pub token_refresh_failures: IntCounterVec,
    pub token_refresh_duration: Histogram,
    pub token_expiry_unix: IntGauge,

    // Route metrics
    pub tool_requests: IntCounterVec,
    pub unauthorized_responses: IntCounterVec,

    // Calendar API metrics
    pub calendar_requests: IntCounterVec,
    pub calendar_duration: HistogramVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

// metric definitions are static; a failure here is a programming error
fn register<T: Collector + Clone + 'static>(registry: &Registry, collector: T) -> T {
    registry
        .register(Box::new(collector.clone()))
        .expect("metric registered twice");
    collector
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("calendargateway".into()), None)
            .expect("valid registry prefix");

        let metrics = Self {
            // Token cache
            token_cache_hits: register(&registry, IntCounter::new("token_cache_hits_total", "Access token requests served from cache").expect("metric")),
            token_refresh_requests: register(&registry, IntCounter::new("token_refresh_requests_total", "Refresh-token exchanges issued").expect("metric")),
            token_refresh_failures: register(&registry, IntCounterVec::new(Opts::new("token_refresh_failures_total", "Failed refresh-token exchanges by reason"), &["reason"]).expect("metric")),
            token_refresh_duration: register(&registry, Histogram::with_opts(HistogramOpts::new("token_refresh_duration_seconds", "Refresh-token exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])).expect("metric")),
            token_expiry_unix: register(&registry, IntGauge::new("token_expiry_unix_seconds", "Cached access token expiry timestamp").expect("metric")),

            // Routes
            tool_requests: register(&registry, IntCounterVec::new(Opts::new("tool_requests_total", "Tool invocations by tool and entrypoint"), &["tool", "entrypoint"]).expect("metric")),
            unauthorized_responses: register(&registry, IntCounterVec::new(Opts::new("unauthorized_responses_total", "Requests answered with not authorized"), &["tool"]).expect("metric")),

            // Calendar API
            calendar_requests: register(&registry, IntCounterVec::new(Opts::new("calendar_requests_total", "Calendar API requests by operation and status"), &["operation", "status"]).expect("metric")),
            calendar_duration: register(&registry, HistogramVec::new(HistogramOpts::new("calendar_request_duration_seconds", "Calendar API request duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["operation"]).expect("metric")),

            // Config/runtime
            config_validation_errors: register(&registry, IntCounter::new("config_validation_errors_total", "Validation errors during startup").expect("metric")),
            up: register(&registry, IntGauge::new("up", "1 if service is healthy").expect("metric")),

            registry,
        };

        Arc::new(metrics)
    }
}
