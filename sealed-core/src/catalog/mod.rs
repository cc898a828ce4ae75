//! Master catalog indexing
//!
//! Turns the master card catalog (one large JSON object keyed by set code)
//! into compact per-set lookup tables used for identifier resolution.
//!
//! # Architecture
//!
//! ```text
//! AllPrintings.json (bytes)
//!     │
//!     ▼
//! events::walk_reader   ← serde visitor, no intermediate tree
//!     │  (path, event)
//!     ▼
//! builder::IndexBuilder ← set / section / pending record state
//!     │
//!     ▼
//! CatalogIndex          ← frozen, shared read-only by every compile
//!     │
//!     ▼
//! cache::IndexCache     ← optional on-disk reuse
//! ```

mod builder;
mod cache;
pub mod events;
mod index;

pub use builder::{build_index_from_path, CatalogError, IndexBuilder};
pub use cache::{CachedIndex, IndexCache, DEFAULT_CACHE_TTL_MINUTES};
pub use index::{CardRef, CatalogIndex, ContainerIndex, Finish};
