use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use kaos_catalog::{CatalogClient, HttpCatalogClient};
use kaos_cli::{
    cli::{Cli, Commands},
    commands,
    config::{self, CliOverrides},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so a manifest on stdout stays clean
    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let overrides = CliOverrides {
        endpoint: cli.endpoint,
        project_id: cli.project_id,
    };
    let config = config::load(cli.config.as_deref(), overrides)?;
    debug!(endpoint = %config.catalog.endpoint, "Configuration loaded");

    let catalog: Arc<dyn CatalogClient> = Arc::new(
        HttpCatalogClient::from_config(&config.catalog)
            .context("Failed to build catalog client")?,
    );

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            ctrl_c.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    match cli.command {
        Commands::Compile(args) => {
            commands::compile::execute(&config, catalog, args, &cancel).await?
        }
        Commands::Clusters => {
            commands::clusters::execute(&config, catalog.as_ref(), &mut stdout).await?
        }
        Commands::Hubs => commands::hubs::execute(&config, catalog.as_ref(), &mut stdout).await?,
        Commands::Packages { hub } => {
            commands::packages::execute(&config, catalog.as_ref(), hub, &mut stdout).await?
        }
    }

    Ok(())
}
