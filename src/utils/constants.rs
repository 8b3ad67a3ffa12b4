//! Shared constants and invariants

pub const DEFAULT_TOKEN_URL: &str = "https://api.digikey.com/v1/oauth2/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.digikey.com";

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 20;
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

pub const PRODUCT_DETAILS_PATH: &str = "/products/v4/search/{product_number}/productdetails";
pub const KEYWORD_SEARCH_PATH: &str = "/products/v4/search/keyword";

pub const CLIENT_ID_HEADER: &str = "X-DIGIKEY-Client-Id";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

/// Field holding the customs tariff code in product records
pub const HTS_CODE_KEY: &str = "HtsusCode";
