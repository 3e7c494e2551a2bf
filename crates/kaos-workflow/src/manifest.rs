//! Argo `Workflow` manifest encoding

use crate::error::SerializationError;
use crate::model::{Artifact, ContainerTask, Pipeline, StepGroup, Task, Template};
use serde::Serialize;
use std::collections::BTreeMap;

pub const API_VERSION: &str = "argoproj.io/v1alpha1";
pub const KIND: &str = "Workflow";

/// Wire encoding of the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    #[default]
    Yaml,
    Json,
}

/// Turns a [`Pipeline`] into manifest bytes.
///
/// Output depends only on the pipeline, so equal pipelines give identical bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestSerializer {
    format: ManifestFormat,
}

impl ManifestSerializer {
    pub fn new(format: ManifestFormat) -> Self {
        Self { format }
    }

    /// Validate then encode; an invalid pipeline produces no bytes
    pub fn serialize(&self, pipeline: &Pipeline) -> Result<Vec<u8>, SerializationError> {
        pipeline.validate()?;
        let manifest = WorkflowManifest::from(pipeline);

        match self.format {
            ManifestFormat::Yaml => Ok(serde_yaml::to_string(&manifest)?.into_bytes()),
            ManifestFormat::Json => {
                let mut bytes = serde_json::to_vec_pretty(&manifest)?;
                bytes.push(b'\n');
                Ok(bytes)
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowManifest<'a> {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata<'a>,
    spec: WorkflowSpec<'a>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    name: &'a str,
    namespace: &'a str,
    labels: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowSpec<'a> {
    arguments: Arguments<'a>,
    entrypoint: &'a str,
    service_account_name: &'a str,
    security_context: SecurityContextSpec,
    templates: Vec<TemplateSpec<'a>>,
}

#[derive(Serialize)]
struct Arguments<'a> {
    parameters: Vec<ParameterSpec<'a>>,
}

#[derive(Serialize)]
struct ParameterSpec<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SecurityContextSpec {
    run_as_user: i64,
    run_as_non_root: bool,
}

#[derive(Serialize)]
struct TemplateSpec<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<Vec<StepSpec<'a>>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inputs: Option<Inputs<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container: Option<ContainerSpec<'a>>,
}

#[derive(Serialize)]
struct StepSpec<'a> {
    name: &'a str,
    template: &'a str,
}

#[derive(Serialize)]
struct Inputs<'a> {
    artifacts: Vec<ArtifactSpec<'a>>,
}

#[derive(Serialize)]
struct ArtifactSpec<'a> {
    name: &'a str,
    path: &'a str,
    raw: RawArtifact<'a>,
}

#[derive(Serialize)]
struct RawArtifact<'a> {
    data: &'a str,
}

#[derive(Serialize)]
struct ContainerSpec<'a> {
    image: &'a str,
    #[serde(skip_serializing_if = "no_command")]
    command: &'a [String],
    args: Vec<String>,
}

impl<'a> From<&'a Pipeline> for WorkflowManifest<'a> {
    fn from(pipeline: &'a Pipeline) -> Self {
        Self {
            api_version: API_VERSION,
            kind: KIND,
            metadata: Metadata {
                name: &pipeline.name,
                namespace: &pipeline.namespace,
                labels: &pipeline.labels,
            },
            spec: WorkflowSpec {
                arguments: Arguments {
                    parameters: pipeline
                        .parameters
                        .iter()
                        .map(|p| ParameterSpec {
                            name: &p.name,
                            value: &p.value,
                        })
                        .collect(),
                },
                entrypoint: &pipeline.entrypoint,
                service_account_name: &pipeline.service_account,
                security_context: SecurityContextSpec {
                    run_as_user: pipeline.security_context.run_as_user,
                    run_as_non_root: pipeline.security_context.run_as_non_root,
                },
                templates: pipeline.templates.iter().map(TemplateSpec::from).collect(),
            },
        }
    }
}

impl<'a> From<&'a Template> for TemplateSpec<'a> {
    fn from(template: &'a Template) -> Self {
        match &template.task {
            Task::StepGroup(group) => Self {
                name: &template.name,
                steps: Some(step_sets(group)),
                inputs: None,
                container: None,
            },
            Task::Container(task) => Self {
                name: &template.name,
                steps: None,
                inputs: inputs(&task.input_artifacts),
                container: Some(container(task)),
            },
        }
    }
}

fn step_sets(group: &StepGroup) -> Vec<Vec<StepSpec<'_>>> {
    group
        .step_sets()
        .iter()
        .map(|set| {
            set.iter()
                .map(|step| StepSpec {
                    name: &step.name,
                    template: &step.template,
                })
                .collect()
        })
        .collect()
}

fn inputs(artifacts: &[Artifact]) -> Option<Inputs<'_>> {
    if artifacts.is_empty() {
        return None;
    }
    Some(Inputs {
        artifacts: artifacts
            .iter()
            .map(|a| ArtifactSpec {
                name: &a.name,
                path: &a.destination_path,
                raw: RawArtifact {
                    data: &a.inline_content,
                },
            })
            .collect(),
    })
}

fn no_command(command: &&[String]) -> bool {
    command.is_empty()
}

fn container(task: &ContainerTask) -> ContainerSpec<'_> {
    ContainerSpec {
        image: &task.image,
        command: &task.command,
        args: task.args.render(),
    }
}
