//! `kaosctl clusters`

use crate::config::require_project_id;
use crate::output::clusters_table;
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
    let clusters = catalog
        .fetch_cluster_list(project_id)
        .await
        .context("Failed to fetch cluster list")?;

    if clusters.is_empty() {
        writeln!(out, "No clusters registered in project {}", project_id)?;
        return Ok(());
    }
    writeln!(out, "{}", clusters_table(&clusters))?;
    Ok(())
}
