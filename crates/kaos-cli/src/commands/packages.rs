//! `kaosctl packages`

use crate::config::require_project_id;
use crate::output::packages_table;
use anyhow::{Context, Result};
use kaos_catalog::CatalogClient;
use kaos_config::KaosConfig;
use std::io::Write;
use tracing::debug;

pub async fn execute(
    config: &KaosConfig,
    catalog: &dyn CatalogClient,
    hub: Option<String>,
    out: &mut dyn Write,
) -> Result<()> {
    let project_id = require_project_id(config)?;
    let hub = hub.unwrap_or_else(|| config.catalog.hub_name.clone());
    debug!(hub = %hub, "Listing hub packages");

    let packages = catalog
        .fetch_package_catalog(project_id, &hub)
        .await
        .with_context(|| format!("Failed to fetch packages from hub '{}'", hub))?;

    if packages.is_empty() {
        writeln!(out, "Hub '{}' has no packages", hub)?;
        return Ok(());
    }
    writeln!(out, "{}", packages_table(&packages))?;
    Ok(())
}
