//! Configuration
//!
//! Layered configuration for the taxonomy repository. Every field has a default
//! so an empty source set yields a usable configuration.

pub mod loader;
pub mod xdg;

pub use loader::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// Artifact tree root, relative paths resolve against the workspace
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub templates: TemplateConfig,

    #[serde(default)]
    pub mutation: MutationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from("artifacts")
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            cache: CacheConfig::default(),
            query: QueryConfig::default(),
            loader: LoaderConfig::default(),
            templates: TemplateConfig::default(),
            mutation: MutationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TaxonomyConfig {
    /// Configuration rooted at an explicit artifact directory
    pub fn with_artifact_path(path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: path.into(),
            ..Default::default()
        }
    }

    /// Absolute artifact root for a workspace
    pub fn resolve_artifact_path(&self, workspace_root: &Path) -> PathBuf {
        if self.artifact_path.is_absolute() {
            self.artifact_path.clone()
        } else {
            workspace_root.join(&self.artifact_path)
        }
    }
}

/// Snapshot cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a snapshot entry in hours
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
}

fn default_ttl_hours() -> i64 {
    24
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page size used when a query asks for zero items
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

fn default_page_size() -> usize {
    50
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

/// File classification used by the artifact loader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_descriptor_extension")]
    pub descriptor_extension: String,
    /// Extensions classified as Control (schema) files
    #[serde(default = "default_control_extensions")]
    pub control_extensions: Vec<String>,
    /// Extensions classified as Uml (markdown) files
    #[serde(default = "default_uml_extensions")]
    pub uml_extensions: Vec<String>,
}

fn default_descriptor_extension() -> String {
    "json".to_string()
}

fn default_control_extensions() -> Vec<String> {
    vec!["proto".to_string()]
}

fn default_uml_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            descriptor_extension: default_descriptor_extension(),
            control_extensions: default_control_extensions(),
            uml_extensions: default_uml_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Maximum depth of a template tree traversal
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    16
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Reload the taxonomy from disk after a successful persist
    #[serde(default = "default_true")]
    pub refresh_after_persist: bool,
    /// Attempts before the collision-free suffix is widened
    #[serde(default = "default_max_unique_attempts")]
    pub max_unique_attempts: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_unique_attempts() -> usize {
    64
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            refresh_after_persist: default_true(),
            max_unique_attempts: default_max_unique_attempts(),
        }
    }
}
