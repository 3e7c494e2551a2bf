//! HttpCatalogClient against a mock catalog server

use kaos_catalog::{
    CatalogClient, CatalogEndpoint, CatalogError, DocumentKind, DocumentRequest, HttpCatalogClient,
};
use kaos_config::CatalogConfig;
use serde_json::json;
use test_case::test_case;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpCatalogClient {
    HttpCatalogClient::new(
        reqwest::Client::new(),
        CatalogEndpoint::new(server.uri(), "test-token"),
    )
}

/// reqwest adds its own `Accept-Encoding` when compression features are on, so
/// match the exact value the client sets
fn accept_encoding_is(expected: &'static str) -> impl Fn(&Request) -> bool + Send + Sync {
    move |request: &Request| {
        request
            .headers
            .get("accept-encoding")
            .and_then(|value| value.to_str().ok())
            == Some(expected)
    }
}

fn declares_experiment_input(request: &Request) -> bool {
    serde_json::from_slice::<serde_json::Value>(&request.body)
        .ok()
        .and_then(|body| body["query"].as_str().map(str::to_owned))
        .is_some_and(|query| {
            query.contains("$experimentInput: ExperimentInput!")
                && query.contains("getYAMLData(experimentInput: $experimentInput)")
        })
}

fn document_request(experiment: &str, kind: DocumentKind) -> DocumentRequest {
    DocumentRequest {
        project_id: "proj-1".to_string(),
        hub_name: "Litmus ChaosHub".to_string(),
        catalog_name: "generic".to_string(),
        experiment_id: experiment.to_string(),
        kind,
    }
}

#[tokio::test]
async fn test_fetch_document_sends_headers_and_variables() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .and(header("Authorization", "test-token"))
        .and(header("Content-Type", "application/json"))
        .and(accept_encoding_is("gzip, deflate, br"))
        .and(declares_experiment_input)
        .and(body_partial_json(json!({
            "variables": {
                "experimentInput": {
                    "ProjectID": "proj-1",
                    "HubName": "Litmus ChaosHub",
                    "ChartName": "generic",
                    "ExperimentName": "pod-delete",
                    "FileType": "experiment"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "getYAMLData": "kind: ChaosExperiment\n" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let doc = client_for(&server)
        .fetch_document(&document_request("pod-delete", DocumentKind::Definition))
        .await
        .unwrap();

    assert_eq!(doc.content, "kind: ChaosExperiment\n");
}

#[tokio::test]
async fn test_fetch_document_null_data_is_empty_document() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "getYAMLData": null } })),
        )
        .mount(&server)
        .await;

    let doc = client_for(&server)
        .fetch_document(&document_request("pod-delete", DocumentKind::EngineConfig))
        .await
        .unwrap();

    assert!(doc.is_empty());
}

#[test_case(401 ; "unauthorized")]
#[test_case(500 ; "server error")]
#[test_case(502 ; "bad gateway")]
#[tokio::test]
async fn test_non_success_status_is_reported(status: u16) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_document(&document_request("pod-delete", DocumentKind::Definition))
        .await
        .unwrap_err();

    match err {
        CatalogError::Status { status: got, body } => {
            assert_eq!(got, status);
            assert_eq!(body, "nope");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_graphql_errors_are_protocol_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "chart not found" }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_document(&document_request("pod-delete", DocumentKind::Definition))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Protocol(ref msg) if msg.contains("chart not found")));
}

#[tokio::test]
async fn test_quotes_in_identifiers_are_escaped() {
    let server = MockServer::start().await;
    let hostile = r#"pod"-delete"#;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .and(body_partial_json(json!({
            "variables": { "experimentInput": { "ExperimentName": hostile } }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "getYAMLData": "ok" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let doc = client_for(&server)
        .fetch_document(&document_request(hostile, DocumentKind::Definition))
        .await
        .unwrap();
    assert_eq!(doc.content, "ok");
}

#[tokio::test]
async fn test_fetch_cluster_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .and(body_partial_json(json!({ "variables": { "projectID": "proj-1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "getCluster": [
                { "cluster_id": "c-1", "cluster_name": "self-agent" },
                { "cluster_id": "c-2", "cluster_name": "staging" }
            ]}
        })))
        .mount(&server)
        .await;

    let clusters = client_for(&server).fetch_cluster_list("proj-1").await.unwrap();
    let names: Vec<_> = clusters.iter().map(|c| c.cluster_name.as_str()).collect();
    assert_eq!(names, ["self-agent", "staging"]);
    assert_eq!(clusters[0].cluster_id, "c-1");
}

#[tokio::test]
async fn test_fetch_hub_status_propagates_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_hub_status("proj-1").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_fetch_hub_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "getHubStatus": [ { "id": "h-1", "HubName": "Litmus ChaosHub" } ] }
        })))
        .mount(&server)
        .await;

    let hubs = client_for(&server).fetch_hub_status("proj-1").await.unwrap();
    assert_eq!(hubs.len(), 1);
    assert_eq!(hubs[0].hub_name, "Litmus ChaosHub");
}

#[tokio::test]
async fn test_fetch_package_catalog() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .and(body_partial_json(json!({
            "variables": { "projectID": "proj-1", "hubName": "Litmus ChaosHub" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "ListHubPkgData": [
                { "chartName": "generic", "Experiments": ["pod-delete", "node-drain"] }
            ]}
        })))
        .mount(&server)
        .await;

    let packages = client_for(&server)
        .fetch_package_catalog("proj-1", "Litmus ChaosHub")
        .await
        .unwrap();
    assert_eq!(packages[0].chart_name, "generic");
    assert_eq!(packages[0].experiments, ["pod-delete", "node-drain"]);
}

#[tokio::test]
async fn test_client_reused_across_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "getYAMLData": "x" } })),
        )
        .expect(3)
        .mount(&server)
        .await;

    let config = CatalogConfig {
        endpoint: format!("{}/", server.uri()),
        token: Some("test-token".to_string()),
        ..Default::default()
    };
    let client = HttpCatalogClient::from_config(&config).unwrap();
    for experiment in ["a", "b", "c"] {
        let doc = client
            .fetch_document(&document_request(experiment, DocumentKind::Definition))
            .await
            .unwrap();
        assert_eq!(doc.content, "x");
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = HttpCatalogClient::new(reqwest::Client::new(), CatalogEndpoint::new(uri, "t"));
    let err = client.fetch_cluster_list("proj-1").await.unwrap_err();
    assert!(matches!(err, CatalogError::Transport(_)));
}
