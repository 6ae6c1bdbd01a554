//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Google credentials must be present; startup fails otherwise
//! - URLs must parse, server/metrics settings must be usable

use reqwest::Url;
use tracing::{error, info};

use crate::config::google::GoogleConfig;
use crate::config::settings::SettingsConfig;
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_google(&cfg.google, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        let allowed = ["trace", "debug", "info", "warn", "error"];
        if !allowed.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, allowed
            ));
        }
    }
}

/// GOOGLE VALIDATION
fn validate_google(google: &GoogleConfig, errors: &mut Vec<String>) {
    let required = [
        ("google.client_id", &google.client_id, "CLIENT_ID"),
        ("google.client_secret", &google.client_secret, "CLIENT_SECRET"),
        ("google.refresh_token", &google.refresh_token, "REFRESH_TOKEN"),
        ("google.redirect_uri", &google.redirect_uri, "REDIRECT_URI"),
    ];
    for (field, value, env) in required {
        if value.trim().is_empty() {
            errors.push(format!("{} must not be empty (set {})", field, env));
        }
    }

    if google.calendar_id.trim().is_empty() {
        errors.push("google.calendar_id must not be empty".to_string());
    }
    if google.scopes.is_empty() {
        errors.push("google.scopes must contain at least one scope".to_string());
    }
    if google.request_timeout_ms == 0 {
        errors.push("google.request_timeout_ms must be greater than 0".to_string());
    }

    let urls = [
        ("google.auth_url", &google.auth_url),
        ("google.token_url", &google.token_url),
        ("google.calendar_api_url", &google.calendar_api_url),
    ];
    for (field, value) in urls {
        if let Err(e) = Url::parse(value) {
            errors.push(format!("{} '{}' is not a valid url: {}", field, value, e));
        }
    }
    if !google.redirect_uri.is_empty() && Url::parse(&google.redirect_uri).is_err() {
        errors.push(format!(
            "google.redirect_uri '{}' is not a valid url",
            google.redirect_uri
        ));
    }
}
