//! Error types for compiling and serializing workflows

use kaos_catalog::{CatalogError, DocumentKind};
use std::time::Duration;
use thiserror::Error;

/// A pipeline that breaks the cross-reference rules of a workflow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("template '{0}' is defined more than once")]
    DuplicateTemplate(String),

    #[error("step '{step}' references undefined template '{template}'")]
    MissingTemplate { step: String, template: String },

    #[error("entrypoint template '{0}' is not defined")]
    EntrypointMissing(String),

    #[error("entrypoint template '{0}' is not a step group")]
    EntrypointNotStepGroup(String),
}

/// Failure encoding a pipeline into a manifest
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Pipeline is invalid: {0}")]
    Invalid(#[from] InvariantViolation),

    #[error("YAML encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure compiling experiment selections into a pipeline
#[derive(Debug, Error)]
pub enum CompileError {
    /// Two packages selected the same experiment; template names would collide
    #[error("Experiment '{experiment}' is selected by both '{first_catalog}' and '{second_catalog}'")]
    DuplicateExperiment {
        experiment: String,
        first_catalog: String,
        second_catalog: String,
    },

    /// Experiment name would collide with a fixed workflow template
    #[error("Experiment name '{0}' is reserved for a workflow template")]
    ReservedName(String),

    /// Experiment name is unusable as a template name, file name, or shell word
    #[error("Invalid experiment name '{name}': {reason}")]
    InvalidExperimentName { name: String, reason: String },

    /// Catalog fetch failed under the strict fetch policy
    #[error("Failed to fetch {kind} for experiment '{experiment}': {source}")]
    Fetch {
        experiment: String,
        kind: DocumentKind,
        #[source]
        source: CatalogError,
    },

    #[error("Catalog client could not be created: {0}")]
    ClientSetup(#[source] CatalogError),

    #[error("Compilation was cancelled")]
    Cancelled,

    #[error("Compilation exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Compiled pipeline is invalid: {0}")]
    Invalid(#[from] InvariantViolation),

    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

/// Result alias for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
