//! Configuration schema for depcache
//!
//! Configuration is stored at `~/.config/depcache/config.toml`, with an
//! optional project-local `.depcache.toml` layered on top.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Per-manager overrides, keyed by CLI name
    pub managers: BTreeMap<String, ManagerSettings>,
}

impl Config {
    /// Overrides for a manager, if configured
    pub fn manager(&self, name: &str) -> Option<&ManagerSettings> {
        self.managers.get(name)
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root (default: platform cache dir + `/depcache`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Always reinstall, ignoring cached archives
    pub force_refresh: bool,

    /// Age in days after which `cache gc` removes archives (0 = disabled)
    pub gc_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: None,
            force_refresh: false,
            gc_days: 30,
        }
    }
}

/// Overrides for one package manager's registry defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerSettings {
    /// Install invocation, e.g. `npm ci`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_options: Option<String>,

    /// Relative to the project directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_directory: Option<PathBuf>,

    /// Relative to the project directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Shell command run after a fresh install; empty disables the default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_install: Option<String>,
}
