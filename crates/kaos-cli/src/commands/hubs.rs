//! `kaosctl hubs`

use crate::config::require_project_id;
use crate::output::hubs_table;
use anyhow::{Context, Result};
use kaos_catalog::CatalogClient;
use kaos_config::KaosConfig;
use std::io::Write;

pub async fn execute(
    config: &KaosConfig,
    catalog: &dyn CatalogClient,
    out: &mut dyn Write,
) -> Result<()> {
    let project_id = require_project_id(config)?;
    let hubs = catalog
        .fetch_hub_status(project_id)
        .await
        .context("Failed to fetch hub status")?;

    writeln!(out, "{}", hubs_table(&hubs))?;
    Ok(())
}
