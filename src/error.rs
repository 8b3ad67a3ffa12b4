//! Catalog client error types
//!
//! Construction problems are fatal (`Configuration`). Everything else is a
//! request-level failure that the client returns to its caller instead of
//! panicking.

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("error obtaining access token: {status} - {body}")]
    Authentication { status: StatusCode, body: String },

    #[error("rate limited (more than limit): {body}")]
    RateLimited { body: String },

    #[error("catalog request failed: {status} - {body}")]
    Api { status: StatusCode, body: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CatalogError::Authentication { status, .. } | CatalogError::Api { status, .. } => {
                Some(*status)
            }
            CatalogError::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            CatalogError::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CatalogError::RateLimited { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, CatalogError::Configuration(_))
    }
}
