use std::fmt;

use serde::Deserialize;

use crate::error::{CatalogError, CatalogResult};

/// Client id / secret pair issued by the Digi-Key developer portal.
///
/// Both values are required and non-empty. The secret never shows up in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> CatalogResult<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(CatalogError::Configuration(
                "client_id and client_secret must be provided".to_owned(),
            ));
        }
        Ok(Self { client_id, client_secret })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Credentials as they appear in the config file, possibly incomplete
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CredentialsConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl CredentialsConfig {
    /// Explicit overrides (CLI flags, env) win over the file values.
    pub fn resolve(
        &self,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> CatalogResult<Credentials> {
        let client_id = client_id
            .or_else(|| self.client_id.clone())
            .unwrap_or_default();
        let client_secret = client_secret
            .or_else(|| self.client_secret.clone())
            .unwrap_or_default();
        Credentials::new(client_id, client_secret)
    }
}
