//! Compile orchestration
//!
//! Runs every content file through copy expansion, product construction and
//! identifier resolution against a frozen [`CatalogIndex`], then reduces the
//! per-container results into the output artifacts and one diagnostics log.
//! Card backlinks need every container at once, so they are built after the
//! reduction.
//!
//! Containers are independent of one another, so with the `parallel` feature
//! they are compiled on the rayon pool. The reduction always happens in input
//! order, so output is the same either way.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::card_links::CardLinks;
use crate::catalog::CatalogIndex;
use crate::content::{expand_copies, is_empty_record, ContentFile, Product};
use crate::deck_links::DeckLinks;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::resolve::resolve_product;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Compiled products of a single content file
#[derive(Debug, Clone, Default)]
pub struct ContainerOutput {
    pub code: String,
    /// Resolved products by name; rejected and empty records are absent
    pub products: BTreeMap<String, Product>,
    pub deck_links: DeckLinks,
    pub diagnostics: Diagnostics,
}

/// Result of a full compile run
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub contents: BTreeMap<String, BTreeMap<String, Product>>,
    pub deck_links: DeckLinks,
    pub card_links: CardLinks,
    pub diagnostics: Diagnostics,
}

impl CompileOutput {
    pub fn product_count(&self) -> usize {
        self.contents.values().map(BTreeMap::len).sum()
    }

    /// `set -> product name -> record`, leaving out empty products and sets
    pub fn contents_artifact(&self) -> serde_json::Result<Value> {
        let mut artifact = Map::new();

        for (code, products) in &self.contents {
            let mut records = Map::new();
            for (name, product) in products {
                if product.is_empty() {
                    continue;
                }
                records.insert(name.clone(), product.to_record()?);
            }
            if !records.is_empty() {
                artifact.insert(code.clone(), Value::Object(records));
            }
        }

        Ok(Value::Object(artifact))
    }

    pub fn deck_links_artifact(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.deck_links)
    }

    pub fn card_links_artifact(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.card_links)
    }
}

/// Compiles content files against a built catalog index
pub struct ContentCompiler<'a> {
    index: &'a CatalogIndex,
}

impl<'a> ContentCompiler<'a> {
    pub fn new(index: &'a CatalogIndex) -> Self {
        Self { index }
    }

    /// Compile every product of one set.
    ///
    /// A product that fails construction is dropped with a structural
    /// diagnostic; its siblings are unaffected.
    pub fn compile_container(&self, file: &ContentFile) -> ContainerOutput {
        let code = file.code.clone();
        let mut diagnostics = Diagnostics::new();
        let mut products = BTreeMap::new();

        for (name, expanded) in expand_copies(&file.products) {
            let record = match expanded {
                Ok(record) => record,
                Err(e) => {
                    diagnostics.structural(&code, &name, e.to_string());
                    continue;
                }
            };

            if is_empty_record(&record) {
                diagnostics.push(
                    DiagnosticKind::MissingContents,
                    code.as_str(),
                    Some(&name),
                    "missing contents",
                );
                continue;
            }

            let mut product = match Product::from_record(&record, &code, &name) {
                Ok(product) => product,
                Err(e) => {
                    diagnostics.structural(&code, &name, e.to_string());
                    continue;
                }
            };

            resolve_product(&mut product, self.index, &mut diagnostics);
            products.insert(name, product);
        }

        let deck_links = DeckLinks::from_products(products.values());
        debug!(
            "Compiled {} of {} products for {}",
            products.len(),
            file.products.len(),
            code
        );

        ContainerOutput {
            code,
            products,
            deck_links,
            diagnostics,
        }
    }

    /// Compile all files and merge the results in file order
    pub fn compile_all(&self, files: &[ContentFile]) -> CompileOutput {
        #[cfg(feature = "parallel")]
        let outputs: Vec<ContainerOutput> = files
            .par_iter()
            .map(|file| self.compile_container(file))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let outputs: Vec<ContainerOutput> = files
            .iter()
            .map(|file| self.compile_container(file))
            .collect();

        let mut output = CompileOutput::default();
        for container in outputs {
            output
                .contents
                .entry(container.code)
                .or_default()
                .extend(container.products);
            output.deck_links.merge(container.deck_links);
            output.diagnostics.extend(container.diagnostics);
        }
        output.card_links = CardLinks::from_compiled(&output.contents, self.index);

        info!(
            "Compiled {} products across {} sets ({} diagnostics)",
            output.product_count(),
            output.contents.len(),
            output.diagnostics.len()
        );
        output
    }
}
