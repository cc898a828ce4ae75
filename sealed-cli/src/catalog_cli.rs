//! Catalog index commands
//!
//! Loads the catalog index from the cache when it is fresh, otherwise
//! streams the catalog document and refreshes the cache.

use anyhow::{Context, Result};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::{debug, info, warn};

use sealed_core::catalog::{build_index_from_path, CatalogIndex, IndexCache};
use sealed_core::config::CompilerConfig;
use sealed_core::diagnostics::Diagnostics;

/// Cache for the configured catalog, if caching is enabled
fn index_cache(config: &CompilerConfig) -> Result<Option<IndexCache>> {
    if !config.cache.enabled {
        return Ok(None);
    }
    let cache = match &config.cache.dir {
        Some(dir) => IndexCache::new(dir, config.cache.ttl_minutes),
        None => IndexCache::in_default_dir(config.cache.ttl_minutes)?,
    };
    Ok(Some(cache))
}

/// Get the catalog index, building it when the cache is stale or `refresh` is set.
///
/// Anomalies found while building are appended to `diagnostics`. A cached index
/// replays the anomalies recorded when it was built.
pub fn load_index(
    config: &CompilerConfig,
    refresh: bool,
    diagnostics: &mut Diagnostics,
) -> Result<CatalogIndex> {
    let cache = match index_cache(config) {
        Ok(cache) => cache,
        Err(e) => {
            warn!("Index cache unavailable: {e:#}");
            None
        }
    };

    let root = config.catalog_root.as_deref();

    match &cache {
        Some(cache) if !refresh => match cache.load(&config.catalog_path, root) {
            Ok(Some(cached)) => {
                info!("Using cached catalog index");
                for anomaly in cached.anomalies {
                    diagnostics.record(anomaly);
                }
                return Ok(cached.index);
            }
            Ok(None) => debug!("No fresh cached index"),
            Err(e) => warn!("Failed to read cached index: {e:#}"),
        },
        _ => {}
    }

    let mut anomalies = Diagnostics::new();
    let index = build_index_from_path(&config.catalog_path, root, &mut anomalies).with_context(
        || {
            format!(
                "Failed to build catalog index from {}",
                config.catalog_path.display()
            )
        },
    )?;

    if let Some(cache) = &cache {
        if let Err(e) = cache.store(&config.catalog_path, root, &index, anomalies.entries()) {
            warn!("Failed to cache catalog index: {e:#}");
        }
    }

    diagnostics.extend(anomalies);
    Ok(index)
}

#[derive(Tabled)]
struct ContainerRow {
    #[tabled(rename = "Set")]
    code: String,
    #[tabled(rename = "Boosters")]
    boosters: usize,
    #[tabled(rename = "Decks")]
    decks: usize,
    #[tabled(rename = "Sealed")]
    sealed: usize,
    #[tabled(rename = "Cards")]
    cards: usize,
}

/// `sealed index`
pub fn index_command(config: &CompilerConfig, refresh: bool) -> Result<()> {
    let mut diagnostics = Diagnostics::new();
    let index = load_index(config, refresh, &mut diagnostics)?;

    let rows: Vec<ContainerRow> = index
        .containers()
        .map(|(code, container)| ContainerRow {
            code: code.to_string(),
            boosters: container.booster_codes.len(),
            decks: container.deck_names.len(),
            sealed: container.sealed_product_ids.len(),
            cards: container.card_ids.len(),
        })
        .collect();

    if rows.is_empty() {
        println!("Catalog index is empty.");
    } else {
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();
        println!("{table}");
    }

    println!(
        "\n{} sets indexed, {} catalog anomalies",
        index.container_count(),
        diagnostics.len()
    );
    Ok(())
}
