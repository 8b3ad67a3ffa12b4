//! # Digi-Key Catalog Client
//!
//! Talks to the Digi-Key product search API on behalf of one application:
//! acquires an OAuth2 client-credentials token, renews it shortly before it
//! expires, runs product-number and keyword searches, and pulls tariff
//! (`HtsusCode`) values out of the returned JSON.
//!
//! Modules:
//! - `config`: credentials, settings and YAML loading
//! - `cache`: token and single-token cache
//! - `sources`: OAuth2 client-credentials authenticator
//! - `catalog`: search client
//! - `parser`: key extraction over search results
//! - `observability`: client events, tracing and Prometheus sinks

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod parser;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::catalog::{CatalogClient, CatalogClientBuilder};
pub use crate::config::credentials::Credentials;
pub use crate::config::settings::ServiceConfig;
pub use crate::error::{CatalogError, CatalogResult};
pub use crate::parser::extract::{extract_hts_codes, find_values_by_key};
