//! On-disk cache for built catalog indexes
//!
//! Parsing the full master catalog takes a while, so the resulting index is
//! stored as JSON next to a timestamp. A cached index is reused while it is
//! younger than the TTL and newer than the catalog file it came from.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::CatalogIndex;
use crate::diagnostics::Diagnostic;

/// Default cache TTL (one day)
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 24 * 60;

/// Cached index with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedIndex {
    /// When the index was cached
    pub cached_at: DateTime<Utc>,

    /// Catalog file the index was built from
    pub source: String,

    /// Root key the sets were read from
    #[serde(default)]
    pub root: Option<String>,

    /// The cached catalog index
    pub index: CatalogIndex,

    /// Catalog anomalies reported while building the index
    #[serde(default)]
    pub anomalies: Vec<Diagnostic>,
}

/// Cache of catalog indexes, one file per catalog path and root key
#[derive(Debug, Clone)]
pub struct IndexCache {
    dir: PathBuf,
    ttl: Duration,
}

impl IndexCache {
    pub fn new(dir: impl Into<PathBuf>, ttl_minutes: u64) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::minutes(
                i64::try_from(ttl_minutes)
                    .unwrap_or(i64::MAX)
                    .min(i64::MAX / 60_000),
            ),
        }
    }

    /// Cache in the platform cache directory
    pub fn in_default_dir(ttl_minutes: u64) -> Result<Self> {
        Ok(Self::new(Self::default_dir()?, ttl_minutes))
    }

    /// Get the platform cache directory
    pub fn default_dir() -> Result<PathBuf> {
        directories::ProjectDirs::from("org", "sealed", "sealed")
            .map(|dirs| dirs.cache_dir().join("index"))
            .context("Could not determine cache directory")
    }

    /// Get cache file path for a catalog file read under `root`
    fn cache_path(&self, catalog: &Path, root: Option<&str>) -> PathBuf {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        (catalog, root).hash(&mut hasher);
        let hash = hasher.finish();

        self.dir.join(format!("index_{hash:016x}.json"))
    }

    /// Load a cached index if it is still valid
    pub fn load(&self, catalog: &Path, root: Option<&str>) -> Result<Option<CachedIndex>> {
        let cache_path = self.cache_path(catalog, root);

        if !cache_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&cache_path)
            .with_context(|| format!("Failed to read cache: {}", cache_path.display()))?;

        let cached: CachedIndex = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cache: {}", cache_path.display()))?;

        if Utc::now() - cached.cached_at > self.ttl {
            debug!("Cached index expired: {}", cache_path.display());
            return Ok(None);
        }

        // A catalog replaced after caching invalidates the entry
        if let Ok(modified) = std::fs::metadata(catalog).and_then(|m| m.modified()) {
            if DateTime::<Utc>::from(modified) > cached.cached_at {
                debug!("Catalog changed since index was cached: {}", catalog.display());
                return Ok(None);
            }
        }

        if cached.root.as_deref() != root {
            debug!("Cached index was read under a different root: {}", cache_path.display());
            return Ok(None);
        }

        debug!("Using cached index: {}", cache_path.display());
        Ok(Some(cached))
    }

    /// Store an index for a catalog file along with the anomalies its build reported
    pub fn store(
        &self,
        catalog: &Path,
        root: Option<&str>,
        index: &CatalogIndex,
        anomalies: &[Diagnostic],
    ) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create cache directory: {}", self.dir.display())
        })?;

        let cached = CachedIndex {
            cached_at: Utc::now(),
            source: catalog.display().to_string(),
            root: root.map(str::to_string),
            index: index.clone(),
            anomalies: anomalies.to_vec(),
        };

        let cache_path = self.cache_path(catalog, root);
        let content = serde_json::to_string(&cached)?;
        std::fs::write(&cache_path, content)
            .with_context(|| format!("Failed to write cache: {}", cache_path.display()))?;

        Ok(())
    }
}
