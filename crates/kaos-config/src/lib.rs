//! # Kaos Configuration
//!
//! Layered configuration for the workflow compiler and its catalog client.
//!
//! Precedence is `defaults < config file < environment < command-line flags`.
//! The last layer belongs to the caller; this crate handles the first three.
//!
//! ```toml
//! # ~/.config/kaos/config.toml
//! [catalog]
//! endpoint = "https://chaos.example.com"
//! project_id = "4bd4c3ad"
//!
//! [compiler]
//! fetch_policy = "strict"
//! fetch_concurrency = 4
//! ```

#![warn(missing_docs)]

pub mod components;

pub use components::{CatalogConfig, CompilerConfig, FetchPolicy};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable overriding [`CatalogConfig::endpoint`]
pub const ENV_ENDPOINT: &str = "KAOS_ENDPOINT";
/// Environment variable overriding [`CatalogConfig::token`]
pub const ENV_TOKEN: &str = "KAOS_TOKEN";
/// Environment variable overriding [`CatalogConfig::project_id`]
pub const ENV_PROJECT_ID: &str = "KAOS_PROJECT_ID";
/// Environment variable overriding [`CatalogConfig::hub_name`]
pub const ENV_HUB_NAME: &str = "KAOS_HUB_NAME";
/// Environment variable overriding [`CatalogConfig::timeout_secs`]
pub const ENV_TIMEOUT_SECS: &str = "KAOS_TIMEOUT_SECS";
/// Environment variable overriding [`CompilerConfig::fetch_policy`]
pub const ENV_FETCH_POLICY: &str = "KAOS_FETCH_POLICY";
/// Environment variable overriding [`CompilerConfig::fetch_concurrency`]
pub const ENV_FETCH_CONCURRENCY: &str = "KAOS_FETCH_CONCURRENCY";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`KaosConfig`]
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },

    /// An override carried a value of the wrong type
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue {
        /// Setting or environment variable name
        key: String,
        /// Offending value
        value: String,
    },

    /// Settings are individually valid but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KaosConfig {
    /// Catalog connection settings
    pub catalog: CatalogConfig,
    /// Workflow generation settings
    pub compiler: CompilerConfig,
}

impl KaosConfig {
    /// Load configuration: file (explicit path, else the default location if it
    /// exists, else built-in defaults), then environment overrides, then validation.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let config = Self::load_unvalidated(config_file)?;
        config.validate()?;
        Ok(config)
    }

    /// File and environment layers without [`validate`](Self::validate), for
    /// callers that layer further overrides on top before validating once.
    pub fn load_unvalidated(config_file: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_file_or_default(config_file)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Default config location (`<config dir>/kaos/config.toml`)
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kaos").join("config.toml"))
    }

    fn from_file_or_default(config_file: Option<&Path>) -> Result<Self> {
        let path = match config_file {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        let Some(path) = path else {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        };

        debug!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Apply `KAOS_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.catalog.endpoint = endpoint;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.catalog.token = Some(token);
        }
        if let Some(project_id) = lookup(ENV_PROJECT_ID) {
            self.catalog.project_id = Some(project_id);
        }
        if let Some(hub_name) = lookup(ENV_HUB_NAME) {
            self.catalog.hub_name = hub_name;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            self.catalog.timeout_secs = parse_value(ENV_TIMEOUT_SECS, &timeout)?;
        }
        if let Some(policy) = lookup(ENV_FETCH_POLICY) {
            self.compiler.fetch_policy = policy.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_FETCH_POLICY.to_string(),
                value: policy.clone(),
            })?;
        }
        if let Some(concurrency) = lookup(ENV_FETCH_CONCURRENCY) {
            self.compiler.fetch_concurrency = parse_value(ENV_FETCH_CONCURRENCY, &concurrency)?;
        }
        Ok(())
    }

    /// Reject settings the compiler cannot work with
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.catalog.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "catalog endpoint must be an http(s) URL, got '{}'",
                self.catalog.endpoint
            )));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "catalog timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.compiler.fetch_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "compiler fetch_concurrency must be at least 1".to_string(),
            ));
        }
        if self.compiler.run_as_user <= 0 {
            return Err(ConfigError::Invalid(format!(
                "compiler run_as_user must be a non-root UID, got {}",
                self.compiler.run_as_user
            )));
        }
        if self.compiler.install_image.trim().is_empty()
            || self.compiler.checker_image.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "compiler images must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
