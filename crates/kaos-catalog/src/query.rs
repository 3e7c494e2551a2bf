//! GraphQL request bodies for the catalog's `/api/query` endpoint.
//!
//! Query documents are static; every identifier travels in `variables`, so
//! names containing quotes or braces cannot change the query's structure.

use crate::error::{CatalogError, Result};
use crate::types::{ClusterRecord, DocumentRequest, HubStatusRecord, PackageListing};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const GET_YAML_DATA: &str = "query getYAMLData($experimentInput: ExperimentInput!) { getYAMLData(experimentInput: $experimentInput) }";

const GET_CLUSTER: &str = "query getCluster($projectID: String!) { getCluster(project_id: $projectID) { cluster_id cluster_name } }";

const GET_HUB_STATUS: &str =
    "query getHubStatus($projectID: String!) { getHubStatus(projectID: $projectID) { id HubName } }";

const LIST_HUB_PKG_DATA: &str = "query ListHubPkgData($projectID: String!, $hubName: String!) { ListHubPkgData(projectID: $projectID, hubName: $hubName) { Experiments chartName } }";

/// `{"query": ..., "variables": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: Value,
}

impl GraphQlRequest {
    pub fn yaml_data(request: &DocumentRequest) -> Self {
        Self {
            query: GET_YAML_DATA,
            variables: json!({
                "experimentInput": {
                    "ProjectID": request.project_id,
                    "HubName": request.hub_name,
                    "ChartName": request.catalog_name,
                    "ExperimentName": request.experiment_id,
                    "FileType": request.kind.file_type(),
                }
            }),
        }
    }

    pub fn cluster_list(project_id: &str) -> Self {
        Self {
            query: GET_CLUSTER,
            variables: json!({ "projectID": project_id }),
        }
    }

    pub fn hub_status(project_id: &str) -> Self {
        Self {
            query: GET_HUB_STATUS,
            variables: json!({ "projectID": project_id }),
        }
    }

    pub fn package_catalog(project_id: &str, hub_name: &str) -> Self {
        Self {
            query: LIST_HUB_PKG_DATA,
            variables: json!({ "projectID": project_id, "hubName": hub_name }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Decode a response body, surfacing GraphQL errors and missing `data`
/// as [`CatalogError::Protocol`].
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let response: GraphQlResponse<T> = serde_json::from_str(body)
        .map_err(|e| CatalogError::Protocol(format!("malformed response body: {}", e)))?;

    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(CatalogError::Protocol(messages.join("; ")));
    }

    response
        .data
        .ok_or_else(|| CatalogError::Protocol("response has no data".to_string()))
}

#[derive(Debug, Deserialize)]
pub(crate) struct YamlData {
    #[serde(rename = "getYAMLData")]
    pub yaml: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClusterData {
    #[serde(rename = "getCluster")]
    pub clusters: Vec<ClusterRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HubStatusData {
    #[serde(rename = "getHubStatus")]
    pub hubs: Vec<HubStatusRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PackageData {
    #[serde(rename = "ListHubPkgData")]
    pub packages: Vec<PackageListing>,
}
