//! Command-level tests against an in-memory catalog

use kaos_catalog::{
    CatalogClient, ClusterRecord, DocumentKind, HubStatusRecord, PackageListing, StaticCatalog,
};
use kaos_cli::cli::{CompileArgs, OutputFormat};
use kaos_cli::commands;
use kaos_config::KaosConfig;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

fn config() -> KaosConfig {
    let mut config = KaosConfig::default();
    config.catalog.project_id = Some("proj-1".to_string());
    config
}

fn selection_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn compile_args(selection: PathBuf) -> CompileArgs {
    CompileArgs {
        selection,
        name: "chaos-wf".to_string(),
        namespace: "litmus".to_string(),
        cluster_id: "cluster-1".to_string(),
        output: None,
        format: OutputFormat::Yaml,
        strict: false,
    }
}

const SELECTION: &str = "packages:\n  - catalogName: generic\n    experiments: [pod-delete, node-drain]\n";

#[tokio::test]
async fn test_compile_renders_manifest_from_selection() {
    let file = selection_file(SELECTION);
    let catalog = Arc::new(
        StaticCatalog::new()
            .with_experiment("pod-delete")
            .with_experiment("node-drain"),
    );

    let bytes = commands::compile::render(
        &config(),
        catalog.clone(),
        &compile_args(file.path().to_path_buf()),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let doc: serde_yaml::Value = serde_yaml::from_slice(&bytes).unwrap();
    assert_eq!(doc["kind"].as_str(), Some("Workflow"));
    assert_eq!(doc["spec"]["templates"].as_sequence().unwrap().len(), 5);
    assert!(catalog.requests().iter().all(|r| r.project_id == "proj-1"));
}

#[tokio::test]
async fn test_compile_writes_json_to_output_file() {
    let file = selection_file(SELECTION);
    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("workflow.json");

    let mut args = compile_args(file.path().to_path_buf());
    args.format = OutputFormat::Json;
    args.output = Some(out_path.clone());

    let catalog = StaticCatalog::new()
        .with_experiment("pod-delete")
        .with_experiment("node-drain");
    commands::compile::execute(&config(), Arc::new(catalog), args, &CancellationToken::new())
        .await
        .unwrap();

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert!(written.trim_start().starts_with('{'));
    assert!(written.contains("\"apiVersion\": \"argoproj.io/v1alpha1\""));
}

#[tokio::test]
async fn test_strict_flag_turns_fetch_failure_into_error() {
    let file = selection_file(SELECTION);
    let catalog = StaticCatalog::new()
        .with_experiment("pod-delete")
        .with_experiment("node-drain")
        .with_failure("node-drain", DocumentKind::Definition);

    let mut args = compile_args(file.path().to_path_buf());
    args.strict = true;

    let err = commands::compile::render(
        &config(),
        Arc::new(catalog),
        &args,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(format!("{err:#}").contains("node-drain"));
}

#[tokio::test]
async fn test_compile_requires_project_id() {
    let file = selection_file(SELECTION);

    let err = commands::compile::render(
        &KaosConfig::default(),
        Arc::new(StaticCatalog::new()),
        &compile_args(file.path().to_path_buf()),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("project id"));
}

#[tokio::test]
async fn test_compile_reports_missing_selection_file() {
    let err = commands::compile::render(
        &config(),
        Arc::new(StaticCatalog::new()),
        &compile_args(PathBuf::from("/nonexistent/selection.yaml")),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("selection file"));
}

#[tokio::test]
async fn test_clusters_prints_table() {
    let catalog = StaticCatalog::new().with_clusters(vec![ClusterRecord {
        cluster_id: "c-1".to_string(),
        cluster_name: "staging".to_string(),
    }]);

    let mut out = Vec::new();
    commands::clusters::execute(&config(), &catalog, &mut out)
        .await
        .unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("c-1"));
    assert!(printed.contains("staging"));
}

#[tokio::test]
async fn test_hubs_propagates_status_failure() {
    let catalog = StaticCatalog::new()
        .with_hubs(vec![HubStatusRecord {
            id: "h1".to_string(),
            hub_name: "Litmus ChaosHub".to_string(),
        }])
        .with_hub_status_failure();

    let mut out = Vec::new();
    let err = commands::hubs::execute(&config(), &catalog, &mut out)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("hub status"));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_packages_lists_hub_contents() {
    let catalog = StaticCatalog::new().with_packages(vec![PackageListing {
        chart_name: "generic".to_string(),
        experiments: vec!["pod-delete".to_string()],
    }]);

    let mut out = Vec::new();
    commands::packages::execute(&config(), &catalog, Some("Private Hub".to_string()), &mut out)
        .await
        .unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("generic"));
    assert!(printed.contains("pod-delete"));
}

#[tokio::test]
async fn test_packages_reports_empty_hub() {
    let catalog: &dyn CatalogClient = &StaticCatalog::new();

    let mut out = Vec::new();
    commands::packages::execute(&config(), catalog, None, &mut out)
        .await
        .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Hub 'Litmus ChaosHub' has no packages\n"
    );
}
