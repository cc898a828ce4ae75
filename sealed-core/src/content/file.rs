//! Per-set content files (`data/contents/<SET>.yaml`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Hand-authored contents for every product of one set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentFile {
    /// Set code
    pub code: String,

    /// Product name to raw content record
    #[serde(default)]
    pub products: BTreeMap<String, Value>,
}

impl ContentFile {
    /// Parse a content file from YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml_ng::from_str(content).context("Failed to parse content file YAML")
    }

    /// Load a content file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read content file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid content file: {}", path.display()))
    }
}

/// Load every `.yaml`/`.yml` file in a directory, sorted by file name
pub fn load_content_dir(dir: &Path) -> Result<Vec<ContentFile>> {
    let paths: Vec<_> = WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();

    if paths.is_empty() && !dir.exists() {
        anyhow::bail!("Contents directory does not exist: {}", dir.display());
    }

    let files = paths
        .iter()
        .map(|path| ContentFile::load(path))
        .collect::<Result<Vec<_>>>()?;

    debug!("Loaded {} content files from {}", files.len(), dir.display());
    Ok(files)
}
