//! ConfigLoader: composes configuration sources and deserializes TaxonomyConfig.

use super::{xdg, TaxonomyConfig};
use crate::error::TaxonomyError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use std::path::Path;

/// Workspace-local configuration file name
pub const WORKSPACE_CONFIG_FILE: &str = "taxonomy.toml";

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence: defaults (lowest) -> global file -> workspace file -> environment (highest).
    pub fn load(workspace_root: &Path) -> Result<TaxonomyConfig, TaxonomyError> {
        let mut builder = Config::builder();
        if let Ok(global) = xdg::global_config_path() {
            builder = builder.add_source(File::from(global).required(false));
        }
        builder = builder
            .add_source(File::from(workspace_root.join(WORKSPACE_CONFIG_FILE)).required(false));
        let builder = Self::add_environment(builder);

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<TaxonomyConfig, TaxonomyError> {
        if !path.exists() {
            return Err(TaxonomyError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = Config::builder().add_source(File::from(path));
        let builder = Self::add_environment(builder);

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Environment overlay: TAXONOMY__ prefix, __ separates nested keys.
    fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix("TAXONOMY")
                .separator("__")
                .try_parsing(true),
        )
    }
}
