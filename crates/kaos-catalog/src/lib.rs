//! Chaos hub catalog client.
//!
//! Talks to the hub's GraphQL `/api/query` endpoint to fetch experiment
//! documents and project listings.
//!
//! ```rust,ignore
//! use kaos_catalog::{CatalogClient, CatalogEndpoint, HttpCatalogClient};
//!
//! let client = HttpCatalogClient::new(reqwest::Client::new(), CatalogEndpoint::new(url, token));
//! let clusters = client.fetch_cluster_list("project-id").await?;
//! ```

pub mod client;
pub mod error;
pub mod query;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
mod test_utils;

pub use client::{CatalogClient, HttpCatalogClient};
pub use error::{CatalogError, Result};
pub use types::*;

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::StaticCatalog;
