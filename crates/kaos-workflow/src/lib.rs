//! Chaos Workflow Compiler
//!
//! Turns a selection of chaos experiments into an Argo `Workflow` manifest.
//!
//! ## Architecture
//!
//! 1. **Select**: flatten packages into experiments, rejecting duplicate or unusable names
//! 2. **Fetch**: pull each experiment's definition and engine documents from the catalog
//! 3. **Assemble**: build the install / run-each / revert pipeline in memory
//! 4. **Serialize**: encode the pipeline as a YAML or JSON manifest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kaos_workflow::{ManifestSerializer, PipelineCompiler, CompilerOptions, WorkflowTarget};
//!
//! let compiler = PipelineCompiler::new(catalog, CompilerOptions::default());
//! let pipeline = compiler.compile(&packages, &target, &cancel).await?;
//! let bytes = ManifestSerializer::default().serialize(&pipeline)?;
//! ```

pub mod command;
pub mod compiler;
pub mod error;
pub mod manifest;
pub mod model;

pub use command::ShellScript;
pub use compiler::{CompilerOptions, PipelineCompiler, WorkflowTarget};
pub use error::{CompileError, InvariantViolation, Result, SerializationError};
pub use manifest::{ManifestFormat, ManifestSerializer};
pub use model::*;

use kaos_catalog::{CatalogEndpoint, ExperimentPackage, HttpCatalogClient};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Compile and serialize in one call with default options.
///
/// Builds an HTTP catalog client for `base_url`, compiles best-effort, and
/// returns the YAML manifest bytes.
pub async fn compile_manifest(
    packages: &[ExperimentPackage],
    work_name: &str,
    work_namespace: &str,
    cluster_id: &str,
    project_id: &str,
    token: &str,
    base_url: &str,
) -> Result<Vec<u8>> {
    let catalog = HttpCatalogClient::connect(CatalogEndpoint::new(base_url, token))
        .map_err(CompileError::ClientSetup)?;
    let compiler = PipelineCompiler::new(Arc::new(catalog), CompilerOptions::default());
    let target = WorkflowTarget {
        name: work_name.to_string(),
        namespace: work_namespace.to_string(),
        cluster_id: cluster_id.to_string(),
        project_id: project_id.to_string(),
    };

    let pipeline = compiler
        .compile(packages, &target, &CancellationToken::new())
        .await?;
    Ok(ManifestSerializer::default().serialize(&pipeline)?)
}
