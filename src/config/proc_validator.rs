//! Configuration validation with aggregated errors.
//! Every issue is collected into one Vec<String> so the operator sees all of
//! them at once.

use tracing::{error, info};

use crate::config::settings::{ApiConfig, LoggingConfig, ServiceConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_api(&cfg.settings.api, &mut errors);
    if let Some(logging) = &cfg.settings.logging {
        validate_logging(logging, &mut errors);
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        Err(errors)
    }
}

/// API VALIDATION
fn validate_api(api: &ApiConfig, errors: &mut Vec<String>) {
    validate_url("settings.api.token_url", &api.token_url, errors);
    validate_url("settings.api.base_url", &api.base_url, errors);

    for (field, value) in [
        ("safety_margin_seconds", api.safety_margin_seconds),
        ("default_expires_in_seconds", api.default_expires_in_seconds),
    ] {
        if let Some(seconds) = value.filter(|s| i64::try_from(*s).is_err()) {
            errors.push(format!("settings.api.{} ({}) must not exceed {}", field, seconds, i64::MAX));
        }
    }

    if let (Some(margin), Some(lifetime)) = (api.safety_margin_seconds, api.default_expires_in_seconds) {
        if margin >= lifetime {
            errors.push(format!(
                "settings.api.safety_margin_seconds ({}) must be lower than default_expires_in_seconds ({})",
                margin, lifetime
            ));
        }
    }

    if api.timeout_seconds == Some(0) {
        errors.push("settings.api.timeout_seconds must be greater than 0".to_string());
    }
}

fn validate_url(field: &str, url: &str, errors: &mut Vec<String>) {
    if url.is_empty() {
        errors.push(format!("{} must not be empty", field));
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!("{} '{}' must start with http:// or https://", field, url));
    }
}

/// LOGGING VALIDATION
fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
        errors.push(format!(
            "settings.logging.level '{}' must be one of {:?}",
            logging.level, LOG_LEVELS
        ));
    }
}
