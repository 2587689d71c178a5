use crate::error::{PlumbError, Result};
use crate::matcher::DEFAULT_EMERGENCY_CAPABILITY;
use crate::paths;
use crate::translate::is_known_capability;
use crate::types::CapabilityCode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3150;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

fn default_catalog_path() -> String {
    paths::DEFAULT_CATALOG_FILE.to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Absent `path` means the built-in tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_emergency_capability")]
    pub emergency_capability: String,
}

fn default_emergency_capability() -> String {
    DEFAULT_EMERGENCY_CAPABILITY.to_string()
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            emergency_capability: default_emergency_capability(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            catalog: CatalogConfig::default(),
            tree: TreeConfig::default(),
            matching: MatchingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(PlumbError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.catalog.path)
    }

    pub fn tree_path(&self, root: &Path) -> Option<PathBuf> {
        self.tree.path.as_deref().map(|p| paths::resolve(root, p))
    }

    pub fn emergency_capability(&self) -> CapabilityCode {
        CapabilityCode::new(self.matching.emergency_capability.trim())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Problems worth surfacing before serving. Relative paths are checked
    /// against `root`.
    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let cap = self.matching.emergency_capability.trim();
        if cap.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "matching.emergency_capability is empty; emergency requests can never match"
                    .to_string(),
            });
        } else if !is_known_capability(cap) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "matching.emergency_capability '{cap}' is not a known capability code"
                ),
            });
        }

        if let Some(tree) = self.tree_path(root) {
            if !tree.exists() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("tree.path '{}' does not exist", tree.display()),
                });
            }
        }

        if !self.catalog_path(root).exists() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "catalog.path '{}' does not exist; matching will fail until it is created",
                    self.catalog.path
                ),
            });
        }

        if self.server.port == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "server.port is 0; an ephemeral port will be chosen".to_string(),
            });
        }

        for w in &warnings {
            tracing::warn!(level = ?w.level, "{}", w.message);
        }

        warnings
    }
}
