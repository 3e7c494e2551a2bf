//! Catalog component configuration
//!
//! Where the chaos hub lives and how to authenticate against it.

use serde::{Deserialize, Serialize};

/// Remote catalog connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the catalog server; queries go to `{endpoint}/api/query`
    pub endpoint: String,
    /// Value sent verbatim in the `Authorization` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Project that owns the hubs and clusters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Hub the experiment documents are read from
    pub hub_name: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9091".to_string(),
            token: None,
            project_id: None,
            hub_name: "Litmus ChaosHub".to_string(),
            timeout_secs: 30,
        }
    }
}
