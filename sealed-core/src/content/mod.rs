//! Sealed product content model
//!
//! A product's contents are a recursive description: cards, booster packs,
//! decks, nested sealed products, opaque "other" components, and `variable`
//! branches for products whose contents differ from copy to copy.
//!
//! Source records are hand-authored YAML, loaded as loosely typed
//! `serde_json::Value` trees:
//!
//! ```yaml
//! Draft Booster Box:
//!   pack:
//!     - set: abc
//!       code: draft
//!   card_count: 540
//!   variable_mode:
//!     count: 1
//!     replacement: false
//!   variable:
//!     - card: [{set: abc, number: "301", name: Box Topper}]
//!     - other: [{name: Promo card unknown}]
//! ```

mod file;
mod leaf;
mod preprocess;
mod product;
mod serialize;


pub use file::{load_content_dir, ContentFile};
pub use leaf::{Card, Component, Deck, Other, Pack, SealedRef};
pub use preprocess::{copy_target, expand_copies, is_empty_record};
pub use product::{Product, VariableMode};

use thiserror::Error;

/// Keys recognized in a product record
pub const CONTENT_KEYS: &[&str] = &[
    "card",
    "pack",
    "deck",
    "sealed",
    "other",
    "variable",
    "variable_mode",
    "card_count",
    "chance",
    "weight",
    "variable_config",
    "copy",
];

/// Structural errors that reject a single product
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("Self-referential product {0}")]
    SelfReference(String),

    #[error("Weight incorrectly assigned: variable_mode weight is {expected} but branch chances sum to {actual}")]
    WeightMismatch { expected: u64, actual: u64 },

    #[error("Malformed `{field}`: {reason}")]
    Malformed { field: String, reason: String },

    #[error("Product record must be a map, found {0}")]
    NotAMap(&'static str),

    #[error("Copy target {0} does not exist")]
    MissingCopyTarget(String),

    #[error("Copy chain starting at {0} loops back on itself")]
    CopyCycle(String),
}

impl ContentError {
    pub(crate) fn malformed(field: &str, reason: impl ToString) -> Self {
        ContentError::Malformed {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Name of a JSON value's type, for error messages
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a map",
    }
}
