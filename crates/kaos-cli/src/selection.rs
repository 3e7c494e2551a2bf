//! Experiment selection files
//!
//! ```yaml
//! packages:
//!   - catalogName: generic
//!     experiments: [pod-delete, node-drain]
//! ```

use anyhow::{Context, Result};
use kaos_catalog::ExperimentPackage;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SelectionFile {
    #[serde(default)]
    pub packages: Vec<ExperimentPackage>,
}

impl SelectionFile {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).context("Malformed selection file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read selection file {}", path.display()))?;
        Self::from_yaml_str(&contents)
            .with_context(|| format!("Failed to parse selection file {}", path.display()))
    }

    pub fn experiment_count(&self) -> usize {
        self.packages.iter().map(|p| p.experiments.len()).sum()
    }
}
