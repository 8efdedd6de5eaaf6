//! Configuration management.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the catalog root.
const ENV_CATALOG_ROOT: &str = "WAYFINDER_CATALOG_ROOT";

/// Environment variable overriding the cache directory.
const ENV_CACHE_DIR: &str = "WAYFINDER_CACHE_DIR";

/// Main configuration for wayfinder.
#[derive(Debug, Clone)]
pub struct WayfinderConfig {
    /// Root of the context catalog hierarchy.
    pub catalog_root: PathBuf,
    /// Directory holding the cache documents.
    pub cache_dir: PathBuf,
    /// Maximum suggestions returned by ranking queries.
    pub max_suggestions: usize,
    /// Default combo recommendation depth.
    pub combo_depth: usize,
}

impl WayfinderConfig {
    /// Loads configuration from a TOML file, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config".to_string(),
            cause: e.to_string(),
        })?;

        let file: ConfigFile = toml::from_str(&content).map_err(|e| Error::OperationFailed {
            operation: "parse_config".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::default().merged(file).with_env_overrides())
    }

    /// Applies environment overrides to this configuration.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = std::env::var(ENV_CATALOG_ROOT) {
            self.catalog_root = PathBuf::from(root);
        }
        if let Ok(dir) = std::env::var(ENV_CACHE_DIR) {
            self.cache_dir = PathBuf::from(dir);
        }
        self
    }

    /// Merges optional file values over the defaults.
    fn merged(mut self, file: ConfigFile) -> Self {
        if let Some(root) = file.catalog_root {
            self.catalog_root = PathBuf::from(root);
        }
        if let Some(dir) = file.cache_dir {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(max) = file.max_suggestions {
            self.max_suggestions = max;
        }
        if let Some(depth) = file.combo_depth {
            self.combo_depth = depth;
        }
        self
    }
}

impl Default for WayfinderConfig {
    fn default() -> Self {
        Self {
            catalog_root: PathBuf::from("contexts"),
            cache_dir: default_cache_dir(),
            max_suggestions: 5,
            combo_depth: 3,
        }
    }
}

/// Resolves the platform cache directory, falling back to a local
/// `.wayfinder` directory.
fn default_cache_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "zircote", "wayfinder").map_or_else(
        || PathBuf::from(".wayfinder"),
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Catalog root path.
    pub catalog_root: Option<String>,
    /// Cache directory.
    pub cache_dir: Option<String>,
    /// Max suggestions.
    pub max_suggestions: Option<usize>,
    /// Default combo depth.
    pub combo_depth: Option<usize>,
}
