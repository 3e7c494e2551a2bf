//! In-memory catalog for tests

use crate::client::CatalogClient;
use crate::error::{CatalogError, Result};
use crate::types::{
    ClusterRecord, DocumentKind, DocumentRequest, HubStatusRecord, PackageListing, RemoteDocument,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Serves canned documents keyed by `(experiment, kind)`.
///
/// Unknown documents answer HTTP 404. Every document request is recorded.
#[derive(Default)]
pub struct StaticCatalog {
    documents: HashMap<(String, DocumentKind), String>,
    failures: HashSet<(String, DocumentKind)>,
    delays: HashMap<String, Duration>,
    clusters: Vec<ClusterRecord>,
    hubs: Vec<HubStatusRecord>,
    packages: Vec<PackageListing>,
    hub_status_failure: bool,
    requests: Mutex<Vec<DocumentRequest>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both documents of an experiment with recognisable content
    pub fn with_experiment(self, experiment: &str) -> Self {
        self.with_document(
            experiment,
            DocumentKind::Definition,
            format!("kind: ChaosExperiment\nname: {}\n", experiment),
        )
        .with_document(
            experiment,
            DocumentKind::EngineConfig,
            format!("kind: ChaosEngine\nname: {}\n", experiment),
        )
    }

    pub fn with_document(
        mut self,
        experiment: &str,
        kind: DocumentKind,
        content: impl Into<String>,
    ) -> Self {
        self.documents
            .insert((experiment.to_string(), kind), content.into());
        self
    }

    /// Make one document fail with HTTP 500
    pub fn with_failure(mut self, experiment: &str, kind: DocumentKind) -> Self {
        self.failures.insert((experiment.to_string(), kind));
        self
    }

    /// Delay every fetch for an experiment
    pub fn with_delay(mut self, experiment: &str, delay: Duration) -> Self {
        self.delays.insert(experiment.to_string(), delay);
        self
    }

    pub fn with_clusters(mut self, clusters: Vec<ClusterRecord>) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn with_hubs(mut self, hubs: Vec<HubStatusRecord>) -> Self {
        self.hubs = hubs;
        self
    }

    pub fn with_packages(mut self, packages: Vec<PackageListing>) -> Self {
        self.packages = packages;
        self
    }

    pub fn with_hub_status_failure(mut self) -> Self {
        self.hub_status_failure = true;
        self
    }

    /// Document requests received so far, in call order
    pub fn requests(&self) -> Vec<DocumentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CatalogClient for StaticCatalog {
    async fn fetch_document(&self, request: &DocumentRequest) -> Result<RemoteDocument> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        if let Some(delay) = self.delays.get(&request.experiment_id) {
            tokio::time::sleep(*delay).await;
        }

        let key = (request.experiment_id.clone(), request.kind);
        if self.failures.contains(&key) {
            return Err(CatalogError::Status {
                status: 500,
                body: "injected failure".to_string(),
            });
        }

        self.documents
            .get(&key)
            .map(|content| RemoteDocument::new(content.clone()))
            .ok_or_else(|| CatalogError::Status {
                status: 404,
                body: format!("no {} for {}", request.kind, request.experiment_id),
            })
    }

    async fn fetch_cluster_list(&self, _project_id: &str) -> Result<Vec<ClusterRecord>> {
        Ok(self.clusters.clone())
    }

    async fn fetch_hub_status(&self, _project_id: &str) -> Result<Vec<HubStatusRecord>> {
        if self.hub_status_failure {
            return Err(CatalogError::Status {
                status: 503,
                body: "hub unavailable".to_string(),
            });
        }
        Ok(self.hubs.clone())
    }

    async fn fetch_package_catalog(
        &self,
        _project_id: &str,
        _hub_name: &str,
    ) -> Result<Vec<PackageListing>> {
        Ok(self.packages.clone())
    }
}
