use std::path::Path;

use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error, info};

use crate::config::proc_validator;
use crate::config::settings::{LogFormat, LoggingConfig, ServiceConfig};
use crate::utils::constants::{DEFAULT_EXPIRES_IN_SECS, DEFAULT_SAFETY_MARGIN_SECS};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path).await?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded).await
}

/// Same as `file_to_config`, but a missing file yields the defaults.
/// Credentials then have to come from the command line or environment.
pub async fn file_to_config_or_default(path: &Path) -> Result<ServiceConfig> {
    if tokio::fs::try_exists(path).await? {
        return file_to_config(path).await;
    }
    info!(path = %path.display(), "config file not found, using defaults");
    parse_config(String::from("{}")).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging =
            Some(LoggingConfig::new("info".to_owned(), LogFormat::from_env()));
    }
    let api = &mut service_config.settings.api;
    if api.safety_margin_seconds.is_none() {
        api.safety_margin_seconds = Some(DEFAULT_SAFETY_MARGIN_SECS);
    }
    if api.default_expires_in_seconds.is_none() {
        api.default_expires_in_seconds = Some(DEFAULT_EXPIRES_IN_SECS);
    }

    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config).map_err(|errors| {
        anyhow!(
            "config is not valid, total errors:{}, \n{}",
            errors.len(),
            errors.join("\n")
        )
    })?;

    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
/// Unset variables without a default expand to an empty string.
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
