//! Configuration Loader
//!
//! Merges defaults, an optional configuration file, and environment
//! overrides into a [`DispatchConfig`].

use super::error::{ConfigResult, ConfigurationError};
use super::DispatchConfig;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "COURIER_CONFIG_PATH";

/// Default prefix for environment overrides (`COURIER__<FIELD>`)
pub const DEFAULT_ENV_PREFIX: &str = "COURIER";

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader reading the file named by `COURIER_CONFIG_PATH`, if set
    pub fn from_env() -> Self {
        let file = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
        Self {
            file,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Merge all sources and deserialize.
    ///
    /// A configured file that does not exist is an error; no file at all
    /// means defaults plus environment.
    pub fn load(&self) -> ConfigResult<DispatchConfig> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            if !path.is_file() {
                return Err(ConfigurationError::config_file_not_found(path.clone()));
            }
            debug!(path = %path.display(), "Adding configuration file source");
            builder = builder.add_source(File::from(path.as_path()));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let merged = builder.build().map_err(|e| {
            let source_name = self
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "environment".to_string());
            ConfigurationError::load_error(source_name, e)
        })?;

        let config: DispatchConfig = merged
            .try_deserialize()
            .map_err(ConfigurationError::deserialization_error)?;

        info!(
            chain_reset = ?config.chain_reset,
            validate_factories_on_startup = config.validate_factories_on_startup,
            log_dispatch_actions = config.log_dispatch_actions,
            "Dispatch configuration loaded"
        );
        Ok(config)
    }
}
