use clap::{Args, Parser, Subcommand, ValueEnum};
use kaos_workflow::ManifestFormat;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Manifest encoding accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl From<OutputFormat> for ManifestFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => ManifestFormat::Yaml,
            OutputFormat::Json => ManifestFormat::Json,
        }
    }
}

#[derive(Parser)]
#[command(name = "kaosctl")]
#[command(about = "kaosctl - compile chaos experiment selections into Argo workflows")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, defaults to 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/kaos/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Chaos hub endpoint (overrides config file and KAOS_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Project to query (overrides config file and KAOS_PROJECT_ID)
    #[arg(long, global = true)]
    pub project_id: Option<String>,
}

impl Cli {
    /// Effective log level: explicit level, then --verbose, then warn
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::WARN,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile an experiment selection into a workflow manifest
    Compile(CompileArgs),

    /// List clusters registered with the project
    Clusters,

    /// Show the status of every chaos hub in the project
    Hubs,

    /// List charts and experiments available in a hub
    Packages {
        /// Hub to list (defaults to the configured hub)
        #[arg(long)]
        hub: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// YAML file listing the selected packages
    #[arg(short, long)]
    pub selection: PathBuf,

    /// Workflow name
    #[arg(long)]
    pub name: String,

    /// Namespace the workflow runs in
    #[arg(long)]
    pub namespace: String,

    /// Cluster the workflow targets
    #[arg(long)]
    pub cluster_id: String,

    /// Write the manifest here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Manifest encoding
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Fail when any catalog document cannot be fetched
    #[arg(long)]
    pub strict: bool,
}
