// tests/common/mod.rs
pub use serde_json::json;

use std::sync::Arc;

use httpmock::Method::POST;
use httpmock::{Mock, MockServer};

use crate::catalog::CatalogClient;
use crate::config::credentials::Credentials;
use crate::observability::events::RecordingEvents;

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const TOKEN_PATH: &str = "/v1/oauth2/token";

/// Catalog client pointed at the mock server, recording its events
pub fn client_for(server: &MockServer) -> (CatalogClient, Arc<RecordingEvents>) {
    let events = Arc::new(RecordingEvents::new());
    let client = CatalogClient::builder(Credentials::new(CLIENT_ID, CLIENT_SECRET).expect("credentials"))
        .token_url(server.url(TOKEN_PATH))
        .base_url(server.base_url())
        .events(events.clone())
        .build()
        .expect("client");
    (client, events)
}

/// Token endpoint answering with the given access token and lifetime
pub async fn mock_token<'a>(server: &'a MockServer, access_token: &str, expires_in: Option<i64>) -> Mock<'a> {
    let body = match expires_in {
        Some(expires_in) => json!({"access_token": access_token, "expires_in": expires_in, "token_type": "Bearer"}),
        None => json!({"access_token": access_token, "token_type": "Bearer"}),
    };
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(TOKEN_PATH)
                .header("content-type", "application/x-www-form-urlencoded")
                .form_urlencoded_tuple("grant_type", "client_credentials")
                .form_urlencoded_tuple("client_id", CLIENT_ID)
                .form_urlencoded_tuple("client_secret", CLIENT_SECRET);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(body);
        })
        .await
}

/// Trimmed keyword search response with tariff codes spread over products
pub fn keyword_response() -> serde_json::Value {
    json!({
        "ProductsCount": 3,
        "Products": [
            {
                "ManufacturerProductNumber": "1N4148W-7-F",
                "Classifications": {"HtsusCode": "8541.10.0050", "ExportControlClassNumber": "EAR99"}
            },
            {
                "ManufacturerProductNumber": "1N4148WS-7-F",
                "Classifications": {"HtsusCode": "8541.10.0050", "ExportControlClassNumber": "EAR99"}
            },
            {
                "ManufacturerProductNumber": "LM358DR",
                "Classifications": {"HtsusCode": "8542.39.0001", "ExportControlClassNumber": "EAR99"}
            }
        ],
        "ExactMatches": []
    })
}
