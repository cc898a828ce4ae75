//! Sealed product content compiler
//!
//! Builds a lookup index from the master card catalog in one streaming pass,
//! compiles hand-authored product contents against it and emits the contents,
//! deck backlink and card backlink artifacts.

pub mod card_links;
pub mod catalog;
pub mod compiler;
pub mod config;
pub mod content;
pub mod deck_links;
pub mod diagnostics;
pub mod resolve;
pub mod validator;

pub use card_links::CardLinks;
pub use catalog::{build_index_from_path, CatalogIndex, IndexCache};
pub use compiler::{CompileOutput, ContainerOutput, ContentCompiler};
pub use config::CompilerConfig;
pub use content::{ContentError, ContentFile, Product};
pub use deck_links::DeckLinks;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
