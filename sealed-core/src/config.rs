//! Compiler configuration
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. Command line flags
//! 2. `--config <file>` or `sealed.yaml` in the working directory
//! 3. Built-in defaults
//!
//! ```yaml
//! contents_dir: data/contents
//! catalog_path: AllPrintings.json
//! catalog_root: data
//! output_dir: outputs
//! status_file: status.txt
//! cache:
//!   enabled: true
//!   ttl_minutes: 1440
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::DEFAULT_CACHE_TTL_MINUTES;

/// Default project config file name
pub const CONFIG_FILE: &str = "sealed.yaml";

/// Top-level compiler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Directory of per-set content YAML files
    #[serde(default = "default_contents_dir")]
    pub contents_dir: PathBuf,

    /// Master catalog JSON document
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Key the sets live under in the catalog; `null` for a bare set map
    #[serde(default = "default_catalog_root")]
    pub catalog_root: Option<String>,

    /// Where contents.json and deck_map.json are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Diagnostics log
    #[serde(default = "default_status_file")]
    pub status_file: PathBuf,

    /// Index cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Catalog index cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u64,

    /// Override the platform cache directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_contents_dir() -> PathBuf {
    PathBuf::from("data/contents")
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("AllPrintings.json")
}

fn default_catalog_root() -> Option<String> {
    Some("data".to_string())
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_status_file() -> PathBuf {
    PathBuf::from("status.txt")
}

fn default_true() -> bool {
    true
}

fn default_ttl_minutes() -> u64 {
    DEFAULT_CACHE_TTL_MINUTES
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            dir: None,
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            contents_dir: default_contents_dir(),
            catalog_path: default_catalog_path(),
            catalog_root: default_catalog_root(),
            output_dir: default_output_dir(),
            status_file: default_status_file(),
            cache: CacheConfig::default(),
        }
    }
}

impl CompilerConfig {
    /// Load from an explicit path, or `sealed.yaml` if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from_path(default_path)
                } else {
                    debug!("No {} found, using defaults", CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(content)?)
    }

    pub fn contents_output(&self) -> PathBuf {
        self.output_dir.join("contents.json")
    }

    pub fn deck_map_output(&self) -> PathBuf {
        self.output_dir.join("deck_map.json")
    }

    pub fn card_map_output(&self) -> PathBuf {
        self.output_dir.join("card_map.json")
    }
}
