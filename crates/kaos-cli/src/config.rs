//! Configuration assembly for the CLI
//!
//! Precedence, lowest first: built-in defaults, config file, `KAOS_*`
//! environment variables, command-line flags.

use anyhow::{Context, Result};
use kaos_config::KaosConfig;
use std::path::Path;

/// Command-line values that override the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub project_id: Option<String>,
}

impl CliOverrides {
    pub fn apply(self, config: &mut KaosConfig) {
        if let Some(endpoint) = self.endpoint {
            config.catalog.endpoint = endpoint;
        }
        if let Some(project_id) = self.project_id {
            config.catalog.project_id = Some(project_id);
        }
    }
}

/// Load every layer, then validate once so a flag can replace a bad file or env value
pub fn load(config_file: Option<&Path>, overrides: CliOverrides) -> Result<KaosConfig> {
    let mut config =
        KaosConfig::load_unvalidated(config_file).context("Failed to load configuration")?;
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Project id for catalog queries, or an error telling the user how to set one
pub fn require_project_id(config: &KaosConfig) -> Result<&str> {
    config
        .catalog
        .project_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .context("No project id configured; pass --project-id or set KAOS_PROJECT_ID")
}
