//! Configuration management for imtag.
//!
//! Configuration is loaded from the platform config directory (falling back
//! to `~/.imtag/config.toml`) with sensible defaults for every field.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for imtag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Word vector store
    pub vectors: VectorsConfig,

    /// Lexical hierarchy (WordNet)
    pub hierarchy: HierarchyConfig,

    /// Image classifier
    pub classifier: ClassifierConfig,

    /// Nearest-label tagging
    pub tagging: TaggingConfig,

    /// Label registry
    pub registry: RegistryConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.imtag.imtag/config.toml
    /// - Linux: ~/.config/imtag/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\imtag\config\config.toml
    ///
    /// Falls back to ~/.imtag/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "imtag", "imtag")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".imtag").join("config.toml")
            })
    }

    /// Get the resolved data directory path (with ~ expansion).
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Resolve a configured path: `~` is expanded and relative paths are
    /// joined onto the data directory.
    pub fn resolve_data_path(&self, path: &Path) -> PathBuf {
        let expanded = expand_tilde(path);
        if expanded.is_absolute() {
            expanded
        } else {
            self.data_dir().join(expanded)
        }
    }

    /// Word vector store directory.
    pub fn vectors_dir(&self) -> PathBuf {
        self.resolve_data_path(&self.vectors.path)
    }

    /// WordNet `dict/` directory.
    pub fn wordnet_dir(&self) -> PathBuf {
        self.resolve_data_path(&self.hierarchy.dict_dir)
    }

    /// Label registry file.
    pub fn registry_path(&self) -> PathBuf {
        self.resolve_data_path(&self.registry.path)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
