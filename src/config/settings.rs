use serde::Deserialize;

use crate::config::credentials::CredentialsConfig;
use crate::utils::constants::{DEFAULT_API_BASE_URL, DEFAULT_TOKEN_URL};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    #[serde(default)]
    pub api: ApiConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// subtracted from the server-reported lifetime
    pub safety_margin_seconds: Option<u64>,
    /// used when the token response carries no expires_in
    pub default_expires_in_seconds: Option<u64>,
    /// request timeout, transport default when absent
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            base_url: default_base_url(),
            safety_margin_seconds: None,
            default_expires_in_seconds: None,
            timeout_seconds: None,
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "compact".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
