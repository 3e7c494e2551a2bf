//! Experiment selections to workflow compiler
//!
//! ## Workflow shape
//!
//! ```text
//! custom-chaos (step group)
//!   ├─> [install-chaos-experiments]   apply every ChaosExperiment, then sleep 30
//!   ├─> [<experiment 1>]              checker applies the experiment's ChaosEngine
//!   ├─> ...
//!   ├─> [<experiment N>]
//!   └─> [revert-chaos]                delete every ChaosEngine in one call
//! ```
//!
//! All definitions are installed before any engine runs, and every engine is
//! removed in a single terminal phase. Install and revert are one container
//! each, whatever the number of experiments.

use crate::command::ShellScript;
use crate::error::{CompileError, Result};
use crate::model::{
    Artifact, ContainerTask, Parameter, Pipeline, SecurityContext, Step, StepGroup, Task,
    Template, CLUSTER_ID_LABEL, ENTRYPOINT_TEMPLATE, INSTALL_TEMPLATE, NAMESPACE_PARAMETER,
    NAMESPACE_PLACEHOLDER, REVERT_TEMPLATE,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use kaos_catalog::{
    CatalogClient, DocumentKind, DocumentRequest, ExperimentPackage, RemoteDocument,
};
use kaos_config::{FetchPolicy, KaosConfig};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Knobs for a [`PipelineCompiler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub install_image: String,
    pub checker_image: String,
    pub service_account: String,
    pub run_as_user: i64,
    pub hub_name: String,
    pub fetch_policy: FetchPolicy,
    /// Catalog fetches in flight at once; values below 1 are treated as 1
    pub fetch_concurrency: usize,
    pub deadline: Option<Duration>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self::from_config(&KaosConfig::default())
    }
}

impl CompilerOptions {
    pub fn from_config(config: &KaosConfig) -> Self {
        let compiler = &config.compiler;
        Self {
            install_image: compiler.install_image.clone(),
            checker_image: compiler.checker_image.clone(),
            service_account: compiler.service_account.clone(),
            run_as_user: compiler.run_as_user,
            hub_name: config.catalog.hub_name.clone(),
            fetch_policy: compiler.fetch_policy,
            fetch_concurrency: compiler.fetch_concurrency,
            deadline: compiler.deadline_secs.map(Duration::from_secs),
        }
    }
}

/// Where and as what the compiled workflow will run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTarget {
    pub name: String,
    pub namespace: String,
    pub cluster_id: String,
    pub project_id: String,
}

/// One experiment picked out of a package, in selection order
#[derive(Debug, Clone, Copy)]
struct Selection<'a> {
    catalog_name: &'a str,
    experiment_id: &'a str,
}

#[derive(Debug)]
struct ExperimentDocuments {
    definition: RemoteDocument,
    engine: RemoteDocument,
}

/// Builds [`Pipeline`]s from experiment packages, pulling documents from a catalog
pub struct PipelineCompiler {
    catalog: Arc<dyn CatalogClient>,
    options: CompilerOptions,
}

impl PipelineCompiler {
    pub fn new(catalog: Arc<dyn CatalogClient>, options: CompilerOptions) -> Self {
        Self { catalog, options }
    }

    /// Compile `packages` into a workflow for `target`.
    ///
    /// Experiment names are checked before anything is fetched. Fetch failures
    /// follow the configured [`FetchPolicy`]; cancellation and the deadline
    /// always abort.
    pub async fn compile(
        &self,
        packages: &[ExperimentPackage],
        target: &WorkflowTarget,
        cancel: &CancellationToken,
    ) -> Result<Pipeline> {
        let selections = select_experiments(packages)?;
        info!(
            workflow = %target.name,
            namespace = %target.namespace,
            experiments = selections.len(),
            "Compiling chaos workflow"
        );

        let documents = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CompileError::Cancelled),
            result = self.fetch_with_deadline(&selections, target) => result?,
        };

        let pipeline = self.assemble(target, &selections, documents);
        pipeline.validate()?;

        debug!(templates = pipeline.templates.len(), "Workflow compiled");
        Ok(pipeline)
    }

    async fn fetch_with_deadline(
        &self,
        selections: &[Selection<'_>],
        target: &WorkflowTarget,
    ) -> Result<Vec<ExperimentDocuments>> {
        match self.options.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.fetch_all(selections, target))
                .await
                .map_err(|_| CompileError::DeadlineExceeded(deadline))?,
            None => self.fetch_all(selections, target).await,
        }
    }

    /// Fetch every experiment's documents with bounded concurrency.
    ///
    /// The first error drops every fetch still in flight. Results are put back
    /// in selection order by index, not arrival order.
    async fn fetch_all(
        &self,
        selections: &[Selection<'_>],
        target: &WorkflowTarget,
    ) -> Result<Vec<ExperimentDocuments>> {
        let concurrency = self.options.fetch_concurrency.max(1);

        let mut fetched: Vec<(usize, ExperimentDocuments)> =
            stream::iter(selections.iter().enumerate())
                .map(|(index, selection)| async move {
                    let documents = self.fetch_experiment(selection, target).await?;
                    Ok::<_, CompileError>((index, documents))
                })
                .buffer_unordered(concurrency)
                .try_collect()
                .await?;

        fetched.sort_by_key(|(index, _)| *index);
        Ok(fetched.into_iter().map(|(_, documents)| documents).collect())
    }

    async fn fetch_experiment(
        &self,
        selection: &Selection<'_>,
        target: &WorkflowTarget,
    ) -> Result<ExperimentDocuments> {
        let definition = self
            .fetch_document(selection, target, DocumentKind::Definition)
            .await?;
        let engine = self
            .fetch_document(selection, target, DocumentKind::EngineConfig)
            .await?;
        Ok(ExperimentDocuments { definition, engine })
    }

    async fn fetch_document(
        &self,
        selection: &Selection<'_>,
        target: &WorkflowTarget,
        kind: DocumentKind,
    ) -> Result<RemoteDocument> {
        let request = DocumentRequest {
            project_id: target.project_id.clone(),
            hub_name: self.options.hub_name.clone(),
            catalog_name: selection.catalog_name.to_string(),
            experiment_id: selection.experiment_id.to_string(),
            kind,
        };

        debug!(experiment = selection.experiment_id, %kind, "Fetching experiment document");
        match self.catalog.fetch_document(&request).await {
            Ok(document) => Ok(document),
            Err(source) => match self.options.fetch_policy {
                FetchPolicy::BestEffort => {
                    warn!(
                        experiment = selection.experiment_id,
                        %kind,
                        error = %source,
                        "Catalog fetch failed, embedding empty document"
                    );
                    Ok(RemoteDocument::empty())
                }
                FetchPolicy::Strict => Err(CompileError::Fetch {
                    experiment: selection.experiment_id.to_string(),
                    kind,
                    source,
                }),
            },
        }
    }

    fn assemble(
        &self,
        target: &WorkflowTarget,
        selections: &[Selection<'_>],
        documents: Vec<ExperimentDocuments>,
    ) -> Pipeline {
        let mut entrypoint = StepGroup::new();
        entrypoint.push_step(Step::named(INSTALL_TEMPLATE));

        let mut install_script = ShellScript::new(" | ", "sleep 30");
        let mut revert_script = ShellScript::new(" ", format!("-n {}", NAMESPACE_PLACEHOLDER))
            .with_head("kubectl delete chaosengine");
        let mut install_artifacts = Vec::with_capacity(selections.len());
        let mut engine_templates = Vec::with_capacity(selections.len());

        for (selection, docs) in selections.iter().zip(documents) {
            let id = selection.experiment_id;

            entrypoint.push_step(Step::named(id));

            let definition_path = format!("/tmp/{}.yaml", id);
            install_script.push(format!(
                "kubectl apply -f {} -n {}",
                definition_path, NAMESPACE_PLACEHOLDER
            ));
            install_artifacts.push(Artifact::new(id, definition_path, docs.definition.content));

            revert_script.push(id);

            engine_templates.push(Template::new(
                id,
                Task::Container(self.engine_task(id, docs.engine)),
            ));
        }

        entrypoint.push_step(Step::named(REVERT_TEMPLATE));

        let mut install = ContainerTask::shell(&self.options.install_image, install_script);
        install.input_artifacts = install_artifacts;
        let revert = ContainerTask::shell(&self.options.install_image, revert_script);

        let mut templates = Vec::with_capacity(engine_templates.len() + 3);
        templates.push(Template::new(ENTRYPOINT_TEMPLATE, Task::StepGroup(entrypoint)));
        templates.push(Template::new(INSTALL_TEMPLATE, Task::Container(install)));
        templates.extend(engine_templates);
        templates.push(Template::new(REVERT_TEMPLATE, Task::Container(revert)));

        Pipeline {
            name: target.name.clone(),
            namespace: target.namespace.clone(),
            labels: BTreeMap::from([(CLUSTER_ID_LABEL.to_string(), target.cluster_id.clone())]),
            entrypoint: ENTRYPOINT_TEMPLATE.to_string(),
            parameters: vec![Parameter {
                name: NAMESPACE_PARAMETER.to_string(),
                value: target.namespace.clone(),
            }],
            service_account: self.options.service_account.clone(),
            security_context: SecurityContext::non_root(self.options.run_as_user),
            templates,
        }
    }

    fn engine_task(&self, experiment_id: &str, engine: RemoteDocument) -> ContainerTask {
        let engine_path = format!("/tmp/chaosengine-{}.yaml", experiment_id);
        let mut task = ContainerTask::with_args(
            &self.options.checker_image,
            [
                format!("-file={}", engine_path),
                "-saveName=/tmp/engine-name".to_string(),
            ],
        );
        task.input_artifacts
            .push(Artifact::new(experiment_id, engine_path, engine.content));
        task
    }
}

/// Flatten packages into selections, rejecting names that would break the workflow
fn select_experiments(packages: &[ExperimentPackage]) -> Result<Vec<Selection<'_>>> {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    let mut selections = Vec::new();

    for package in packages {
        for experiment in &package.experiments {
            check_experiment_name(experiment)?;

            match owners.entry(experiment.as_str()) {
                Entry::Occupied(first) => {
                    return Err(CompileError::DuplicateExperiment {
                        experiment: experiment.clone(),
                        first_catalog: first.get().to_string(),
                        second_catalog: package.catalog_name.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(package.catalog_name.as_str());
                }
            }

            selections.push(Selection {
                catalog_name: &package.catalog_name,
                experiment_id: experiment,
            });
        }
    }

    Ok(selections)
}

// Names end up as Argo template names (`[a-zA-Z0-9][-a-zA-Z0-9]*`), file names
// under /tmp, and arguments to kubectl, where a leading '-' reads as a flag.
fn check_experiment_name(name: &str) -> Result<()> {
    let invalid = |reason: String| CompileError::InvalidExperimentName {
        name: name.to_string(),
        reason,
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("name is empty".to_string())),
        Some(first) if !first.is_ascii_alphanumeric() => {
            return Err(invalid(format!("must start with a letter or digit, not {:?}", first)))
        }
        Some(_) => {}
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
        return Err(invalid(format!("character {:?} is not allowed", bad)));
    }
    if [ENTRYPOINT_TEMPLATE, INSTALL_TEMPLATE, REVERT_TEMPLATE].contains(&name) {
        return Err(CompileError::ReservedName(name.to_string()));
    }
    Ok(())
}
