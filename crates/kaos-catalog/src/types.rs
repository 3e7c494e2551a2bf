//! Catalog data types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A hub chart and the experiments selected from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentPackage {
    /// Chart (catalog) the experiments belong to
    pub catalog_name: String,
    /// Experiment identifiers, in the order they should run
    #[serde(alias = "experimentIdentifiers")]
    pub experiments: Vec<String>,
}

impl ExperimentPackage {
    pub fn new<I, S>(catalog_name: impl Into<String>, experiments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            catalog_name: catalog_name.into(),
            experiments: experiments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Which document of an experiment to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    /// The ChaosExperiment custom resource
    Definition,
    /// The ChaosEngine that runs the experiment
    EngineConfig,
}

impl DocumentKind {
    /// `fileType` value understood by the hub
    pub fn file_type(self) -> &'static str {
        match self {
            Self::Definition => "experiment",
            Self::EngineConfig => "engine",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definition => write!(f, "definition"),
            Self::EngineConfig => write!(f, "engineConfig"),
        }
    }
}

/// Raw YAML text fetched from the hub.
///
/// An empty document and a failed fetch under best-effort look the same.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteDocument {
    pub content: String,
}

impl RemoteDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Identifies one document in the hub
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRequest {
    pub project_id: String,
    pub hub_name: String,
    pub catalog_name: String,
    pub experiment_id: String,
    pub kind: DocumentKind,
}

/// A cluster registered with the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub cluster_id: String,
    pub cluster_name: String,
}

/// Health record of a chaos hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStatusRecord {
    pub id: String,
    #[serde(rename = "HubName")]
    pub hub_name: String,
}

/// A chart in the hub and the experiments it ships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageListing {
    #[serde(rename = "chartName")]
    pub chart_name: String,
    #[serde(rename = "Experiments", default)]
    pub experiments: Vec<String>,
}

impl From<PackageListing> for ExperimentPackage {
    fn from(listing: PackageListing) -> Self {
        Self {
            catalog_name: listing.chart_name,
            experiments: listing.experiments,
        }
    }
}

/// Where the catalog lives and the credential to present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoint {
    pub base_url: String,
    pub token: String,
}

impl CatalogEndpoint {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// `{base_url}/api/query`
    pub fn query_url(&self) -> String {
        format!("{}/api/query", self.base_url.trim_end_matches('/'))
    }
}
