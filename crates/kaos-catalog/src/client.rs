//! Catalog client trait and its HTTP implementation

use crate::error::{CatalogError, Result};
use crate::query::{self, ClusterData, GraphQlRequest, HubStatusData, PackageData, YamlData};
use crate::types::{
    CatalogEndpoint, ClusterRecord, DocumentRequest, HubStatusRecord, PackageListing,
    RemoteDocument,
};
use async_trait::async_trait;
use kaos_config::CatalogConfig;
use reqwest::header::{ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Read access to the chaos hub catalog
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one experiment document (definition or engine)
    async fn fetch_document(&self, request: &DocumentRequest) -> Result<RemoteDocument>;

    /// Clusters registered with a project
    async fn fetch_cluster_list(&self, project_id: &str) -> Result<Vec<ClusterRecord>>;

    /// Health of every hub in a project
    async fn fetch_hub_status(&self, project_id: &str) -> Result<Vec<HubStatusRecord>>;

    /// Charts in a hub with the experiments each one ships
    async fn fetch_package_catalog(
        &self,
        project_id: &str,
        hub_name: &str,
    ) -> Result<Vec<PackageListing>>;
}

/// [`CatalogClient`] over HTTP.
///
/// Holds one `reqwest::Client` for its whole life so connections are pooled
/// across fetches.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
    endpoint: CatalogEndpoint,
}

impl HttpCatalogClient {
    pub fn new(client: Client, endpoint: CatalogEndpoint) -> Self {
        Self { client, endpoint }
    }

    /// Client with reqwest defaults
    pub fn connect(endpoint: CatalogEndpoint) -> Result<Self> {
        Ok(Self::new(Client::builder().build()?, endpoint))
    }

    /// Build a client with the configured request timeout
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = CatalogEndpoint::new(
            config.endpoint.clone(),
            config.token.clone().unwrap_or_default(),
        );
        Ok(Self::new(client, endpoint))
    }

    async fn execute<T: DeserializeOwned>(&self, request: &GraphQlRequest) -> Result<T> {
        let url = self.endpoint.query_url();
        debug!(url = %url, query = request.query, "Sending catalog query");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, &self.endpoint.token)
            .header(ACCEPT_ENCODING, "gzip, deflate, br")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        query::decode(&body)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_document(&self, request: &DocumentRequest) -> Result<RemoteDocument> {
        let data: YamlData = self.execute(&GraphQlRequest::yaml_data(request)).await?;
        Ok(RemoteDocument::new(data.yaml.unwrap_or_default()))
    }

    async fn fetch_cluster_list(&self, project_id: &str) -> Result<Vec<ClusterRecord>> {
        let data: ClusterData = self
            .execute(&GraphQlRequest::cluster_list(project_id))
            .await?;
        Ok(data.clusters)
    }

    async fn fetch_hub_status(&self, project_id: &str) -> Result<Vec<HubStatusRecord>> {
        let data: HubStatusData = self.execute(&GraphQlRequest::hub_status(project_id)).await?;
        Ok(data.hubs)
    }

    async fn fetch_package_catalog(
        &self,
        project_id: &str,
        hub_name: &str,
    ) -> Result<Vec<PackageListing>> {
        let data: PackageData = self
            .execute(&GraphQlRequest::package_catalog(project_id, hub_name))
            .await?;
        Ok(data.packages)
    }
}
