pub mod client;

pub use client::{CatalogClient, CatalogClientBuilder};
