use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::cache::token::Token;
use crate::cache::token_cache::TokenCache;
use crate::config::credentials::Credentials;
use crate::config::settings::ApiConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::helpers::time::get_instant;
use crate::observability::events::{ClientEvent, EventSink, Operation, TracingEvents};
use crate::parser::extract::extract_hts_codes;
use crate::sources::oauth2::TokenAuthenticator;
use crate::utils::constants::{
    CLIENT_ID_HEADER, DEFAULT_API_BASE_URL, DEFAULT_TOKEN_URL, KEYWORD_SEARCH_PATH, PRODUCT_DETAILS_PATH,
};

static APPLICATION_JSON: &str = "application/json";

/// Client session for the Digi-Key product search API.
///
/// Every query first makes sure a valid token is held, then issues exactly one
/// request. Failures come back as `CatalogError`; nothing is retried.
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    authenticator: TokenAuthenticator,
    token_cache: TokenCache,
    last_result: Arc<RwLock<Option<Value>>>,
    events: Arc<dyn EventSink>,
}

impl CatalogClient {
    /// Client against the production endpoints, logging through `tracing`.
    pub fn new(client_id: &str, client_secret: &str) -> CatalogResult<Self> {
        let credentials = Credentials::new(client_id, client_secret)?;
        Self::builder(credentials).build()
    }

    pub fn builder(credentials: Credentials) -> CatalogClientBuilder {
        CatalogClientBuilder::new(credentials)
    }

    pub fn credentials(&self) -> &Credentials {
        self.authenticator.credentials()
    }

    /// Reuse the held token while valid, authenticate otherwise.
    pub async fn ensure_token(&self) -> CatalogResult<Token> {
        self.token_cache
            .get_or_refresh(|| self.authenticator.authenticate())
            .await
    }

    /// Token as currently held, expired or not
    pub async fn current_token(&self) -> Option<Token> {
        self.token_cache.peek().await
    }

    /// GET product details for one Digi-Key or manufacturer product number
    #[instrument(skip(self))]
    pub async fn search_by_product_number(&self, product_number: &str) -> CatalogResult<Value> {
        if product_number.trim().is_empty() {
            return Err(CatalogError::InvalidInput("product number must not be empty".to_owned()));
        }
        let token = self.ensure_token().await?;

        let url = product_details_url(&self.base_url, product_number);
        let request = self.authorized(self.client.get(&url), &token);

        self.execute(Operation::ProductDetails, request).await
    }

    /// POST a keyword search
    #[instrument(skip(self))]
    pub async fn search_by_keyword(&self, keyword: &str) -> CatalogResult<Value> {
        if keyword.trim().is_empty() {
            return Err(CatalogError::InvalidInput("keyword must not be empty".to_owned()));
        }
        let token = self.ensure_token().await?;

        let url = format!("{}{}", self.base_url, KEYWORD_SEARCH_PATH);
        let request = self
            .authorized(self.client.post(&url), &token)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body(json!({ "Keywords": keyword }).to_string());

        self.execute(Operation::KeywordSearch, request).await
    }

    /// Result of the most recent successful search
    pub async fn last_result(&self) -> Option<Value> {
        self.last_result.read().await.clone()
    }

    /// Tariff codes of the most recent successful search.
    /// `None` before any search, or when that search answered `null`.
    pub async fn extract_hts(&self) -> Option<Vec<String>> {
        self.last_result
            .read()
            .await
            .as_ref()
            .filter(|result| !result.is_null())
            .map(extract_hts_codes)
    }

    fn authorized(&self, request: RequestBuilder, token: &Token) -> RequestBuilder {
        request
            .header(ACCEPT, APPLICATION_JSON)
            .header(CLIENT_ID_HEADER, self.credentials().client_id())
            .header(AUTHORIZATION, token.bearer())
    }

    async fn execute(&self, operation: Operation, request: RequestBuilder) -> CatalogResult<Value> {
        let start = get_instant();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                self.search_failed(operation, None, start.elapsed().as_secs_f64());
                return Err(err.into());
            }
        };
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(operation = operation.as_str(), "Error reading body: {} - {}", status, err);
                self.search_failed(operation, Some(status), start.elapsed().as_secs_f64());
                return Err(err.into());
            }
        };
        let elapsed_secs = start.elapsed().as_secs_f64();

        match status {
            StatusCode::OK => {
                let result: Value = serde_json::from_str(&body)
                    .inspect_err(|_| self.search_failed(operation, Some(status), elapsed_secs))?;
                *self.last_result.write().await = Some(result.clone());
                self.events.on_event(&ClientEvent::SearchSucceeded { operation, elapsed_secs });
                info!(operation = operation.as_str(), "search results found");
                Ok(result)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(operation = operation.as_str(), "Error (MORE THAN LIMIT): {} - {}", status, body);
                self.events.on_event(&ClientEvent::RateLimited { operation, elapsed_secs });
                Err(CatalogError::RateLimited { body })
            }
            _ => {
                warn!(operation = operation.as_str(), "Error: {} - {}", status, body);
                self.search_failed(operation, Some(status), elapsed_secs);
                Err(CatalogError::Api { status, body })
            }
        }
    }

    fn search_failed(&self, operation: Operation, status: Option<StatusCode>, elapsed_secs: f64) {
        self.events.on_event(&ClientEvent::SearchFailed { operation, status, elapsed_secs });
    }
}

/// The product number is percent-encoded so it stays a single path segment.
fn product_details_url(base_url: &str, product_number: &str) -> String {
    let path = PRODUCT_DETAILS_PATH.replace("{product_number}", &urlencoding::encode(product_number));
    format!("{}{}", base_url, path)
}

pub struct CatalogClientBuilder {
    credentials: Credentials,
    token_url: String,
    base_url: String,
    safety_margin_seconds: Option<u64>,
    default_expires_in_seconds: Option<u64>,
    timeout: Option<Duration>,
    events: Arc<dyn EventSink>,
}

impl CatalogClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            token_url: DEFAULT_TOKEN_URL.to_owned(),
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            safety_margin_seconds: None,
            default_expires_in_seconds: None,
            timeout: None,
            events: Arc::new(TracingEvents),
        }
    }

    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn safety_margin_seconds(mut self, seconds: u64) -> Self {
        self.safety_margin_seconds = Some(seconds);
        self
    }

    pub fn default_expires_in_seconds(mut self, seconds: u64) -> Self {
        self.default_expires_in_seconds = Some(seconds);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Apply every endpoint and token setting from the config file
    pub fn api_config(mut self, api: &ApiConfig) -> Self {
        self = self.token_url(api.token_url.clone()).base_url(api.base_url.clone());
        if let Some(seconds) = api.safety_margin_seconds {
            self = self.safety_margin_seconds(seconds);
        }
        if let Some(seconds) = api.default_expires_in_seconds {
            self = self.default_expires_in_seconds(seconds);
        }
        if let Some(seconds) = api.timeout_seconds {
            self = self.timeout(Duration::from_secs(seconds));
        }
        self
    }

    pub fn build(self) -> CatalogResult<CatalogClient> {
        let safety_margin_seconds = self.safety_margin_seconds.map(seconds_setting).transpose()?;
        let default_expires_in_seconds = self.default_expires_in_seconds.map(seconds_setting).transpose()?;

        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let client = http
            .build()
            .map_err(|e| CatalogError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        let mut authenticator =
            TokenAuthenticator::new(client.clone(), self.token_url, self.credentials, self.events.clone());
        if let Some(seconds) = safety_margin_seconds {
            authenticator = authenticator.with_safety_margin(seconds);
        }
        if let Some(seconds) = default_expires_in_seconds {
            authenticator = authenticator.with_default_expires_in(seconds);
        }

        debug!(base_url = %self.base_url, "catalog client ready");
        Ok(CatalogClient {
            client,
            base_url: self.base_url,
            authenticator,
            token_cache: TokenCache::new(),
            last_result: Arc::new(RwLock::new(None)),
            events: self.events,
        })
    }
}

fn seconds_setting(seconds: u64) -> CatalogResult<i64> {
    i64::try_from(seconds)
        .map_err(|_| CatalogError::Configuration(format!("{} seconds is out of range", seconds)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_requires_credentials() {
        assert!(matches!(CatalogClient::new("", "secret"), Err(CatalogError::Configuration(_))));
        assert!(matches!(CatalogClient::new("id", ""), Err(CatalogError::Configuration(_))));
        assert!(CatalogClient::new("id", "secret").is_ok());
    }

    #[test]
    fn oversized_token_settings_are_rejected() {
        let credentials = Credentials::new("id", "secret").unwrap();
        let result = CatalogClient::builder(credentials.clone()).safety_margin_seconds(u64::MAX).build();
        assert!(matches!(result, Err(CatalogError::Configuration(_))));

        let result = CatalogClient::builder(credentials.clone())
            .default_expires_in_seconds(i64::MAX as u64 + 1)
            .build();
        assert!(matches!(result, Err(CatalogError::Configuration(_))));

        let result = CatalogClient::builder(credentials)
            .safety_margin_seconds(i64::MAX as u64)
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn product_number_stays_one_path_segment() {
        assert_eq!(
            product_details_url("https://api.digikey.com", "296-1395-5-ND"),
            "https://api.digikey.com/products/v4/search/296-1395-5-ND/productdetails"
        );
        assert_eq!(
            product_details_url("http://localhost:8080", "ABC/123 X"),
            "http://localhost:8080/products/v4/search/ABC%2F123%20X/productdetails"
        );
    }

    #[tokio::test]
    async fn extract_before_search_is_none() {
        let client = CatalogClient::new("id", "secret").unwrap();
        assert!(client.last_result().await.is_none());
        assert!(client.extract_hts().await.is_none());
    }

    #[tokio::test]
    async fn empty_inputs_are_rejected_before_any_request() {
        let client = CatalogClient::builder(Credentials::new("id", "secret").unwrap())
            .token_url("http://127.0.0.1:1/token")
            .build()
            .unwrap();

        let err = client.search_by_product_number("  ").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
        let err = client.search_by_keyword("").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
    }
}
