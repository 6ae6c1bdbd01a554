use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::settings::LoggingConfig;
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;

/// Configuration used when no file is given: everything comes from the environment.
pub const DEFAULT_CONFIG: &str = r#"
settings:
  server:
    host: "${HOST:0.0.0.0}"
    port: "${PORT:8080}"
  metrics:
    path: "/metrics"
    is_enabled: ${METRICS_ENABLED:false}
  logging:
    level: "${LOG_LEVEL:info}"
    format: "${LOG_FORMAT:compact}"
google:
  client_id: "${CLIENT_ID}"
  client_secret: "${CLIENT_SECRET}"
  refresh_token: "${REFRESH_TOKEN}"
  redirect_uri: "${REDIRECT_URI}"
  calendar_id: "${TARGET_CALENDAR_ID:primary}"
"#;

/// Load config from `path`, or from [`DEFAULT_CONFIG`] when no path is given.
pub async fn load(path: Option<&Path>) -> Result<ServiceConfig> {
    match path {
        Some(path) => file_to_config(path).await,
        None => parse_config(expand_env_vars(DEFAULT_CONFIG)?).await,
    }
}

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_validation_errors.inc();
        })
        .map_err(|e| anyhow!("Invalid config format: {}", e))?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }

    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config)
        .await
        .map_err(|errors| {
            anyhow!(
                "config is not valid, total errors:{}, \n{}",
                errors.len(),
                errors.join("\n")
            )
        })?;

    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with values from the environment.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
