//! `kaosctl compile`

use crate::cli::CompileArgs;
use crate::config::require_project_id;
use crate::selection::SelectionFile;
use anyhow::{Context, Result};
use kaos_catalog::CatalogClient;
use kaos_config::{FetchPolicy, KaosConfig};
use kaos_workflow::{CompilerOptions, ManifestSerializer, PipelineCompiler, WorkflowTarget};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Compile the selection and write the manifest to `--output` or stdout
pub async fn execute(
    config: &KaosConfig,
    catalog: Arc<dyn CatalogClient>,
    args: CompileArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let manifest = render(config, catalog, &args, cancel).await?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &manifest)
                .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
            info!(path = %path.display(), bytes = manifest.len(), "Manifest written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&manifest)
                .and_then(|_| stdout.flush())
                .context("Failed to write manifest to stdout")?;
        }
    }

    Ok(())
}

/// Manifest bytes for a compile invocation
pub async fn render(
    config: &KaosConfig,
    catalog: Arc<dyn CatalogClient>,
    args: &CompileArgs,
    cancel: &CancellationToken,
) -> Result<Vec<u8>> {
    let selection = SelectionFile::load(&args.selection)?;
    let target = WorkflowTarget {
        name: args.name.clone(),
        namespace: args.namespace.clone(),
        cluster_id: args.cluster_id.clone(),
        project_id: require_project_id(config)?.to_string(),
    };

    let mut options = CompilerOptions::from_config(config);
    if args.strict {
        options.fetch_policy = FetchPolicy::Strict;
    }

    info!(
        experiments = selection.experiment_count(),
        selection = %args.selection.display(),
        "Compiling selection"
    );

    let pipeline = PipelineCompiler::new(catalog, options)
        .compile(&selection.packages, &target, cancel)
        .await
        .context("Failed to compile workflow")?;

    ManifestSerializer::new(args.format.into())
        .serialize(&pipeline)
        .context("Failed to serialize workflow manifest")
}
