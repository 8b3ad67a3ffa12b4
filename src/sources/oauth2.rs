use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error};

use crate::cache::token::Token;
use crate::config::credentials::Credentials;
use crate::error::{CatalogError, CatalogResult};
use crate::helpers::time::now;
use crate::observability::events::{ClientEvent, EventSink};
use crate::utils::constants::{DEFAULT_EXPIRES_IN_SECS, DEFAULT_SAFETY_MARGIN_SECS, GRANT_TYPE_CLIENT_CREDENTIALS};

/// Body of a successful token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

/// OAuth2 client-credentials exchange against the token endpoint
#[derive(Clone)]
pub struct TokenAuthenticator {
    client: Client,
    token_url: String,
    credentials: Credentials,
    safety_margin_seconds: i64,
    default_expires_in_seconds: i64,
    events: Arc<dyn EventSink>,
}

impl TokenAuthenticator {
    pub fn new(client: Client, token_url: String, credentials: Credentials, events: Arc<dyn EventSink>) -> Self {
        Self {
            client,
            token_url,
            credentials,
            safety_margin_seconds: DEFAULT_SAFETY_MARGIN_SECS as i64,
            default_expires_in_seconds: DEFAULT_EXPIRES_IN_SECS as i64,
            events,
        }
    }

    pub fn with_safety_margin(mut self, seconds: i64) -> Self {
        self.safety_margin_seconds = seconds;
        self
    }

    pub fn with_default_expires_in(mut self, seconds: i64) -> Self {
        self.default_expires_in_seconds = seconds;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Fetch a fresh token. No retry: a non-200 answer is returned as
    /// `CatalogError::Authentication` with the status and body.
    pub async fn authenticate(&self) -> CatalogResult<Token> {
        let form = [
            ("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret()),
        ];

        debug!(url = %self.token_url, "requesting access token");
        let acquired_at = now();
        let response = self.client.post(&self.token_url).form(&form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            error!(status = %status, "error obtaining access token");
            self.events.on_event(&ClientEvent::AuthenticationFailed { status });
            return Err(CatalogError::Authentication { status, body });
        }

        let token = self.parse_token(&body, acquired_at)?;
        self.events.on_event(&ClientEvent::TokenAcquired {
            acquired_at: token.acquired_at,
            expires_at: token.expires_at,
        });
        Ok(token)
    }

    fn parse_token(&self, body: &str, acquired_at: chrono::DateTime<chrono::Utc>) -> CatalogResult<Token> {
        let parsed: TokenResponse = serde_json::from_str(body)?;
        let access_token = parsed
            .access_token
            .ok_or_else(|| CatalogError::Decode("token response has no access_token".to_owned()))?;
        let expires_in = parsed.expires_in.unwrap_or(self.default_expires_in_seconds);

        Token::from_lifetime(access_token, acquired_at, expires_in, self.safety_margin_seconds)
            .ok_or_else(|| CatalogError::Decode(format!("expires_in out of range: {}", expires_in)))
    }
}
