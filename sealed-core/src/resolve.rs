//! Identifier resolution
//!
//! Walks a product tree and attaches catalog ids from the frozen
//! [`CatalogIndex`]. Misses never fail: every unresolved reference becomes a
//! diagnostic and the walk carries on.

use crate::catalog::CatalogIndex;
use crate::content::{Card, Deck, Pack, Product, SealedRef};
use crate::diagnostics::Diagnostics;

/// Resolution state for one top-level product
pub struct Resolver<'a> {
    index: &'a CatalogIndex,
    diagnostics: &'a mut Diagnostics,
    container: String,
    product: Option<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        index: &'a CatalogIndex,
        diagnostics: &'a mut Diagnostics,
        container: &str,
        product: Option<&str>,
    ) -> Self {
        Self {
            index,
            diagnostics,
            container: container.to_string(),
            product: product.map(str::to_string),
        }
    }

    fn miss(&mut self, message: String) {
        self.diagnostics
            .resolution_miss(&self.container, self.product.as_deref(), message);
    }
}

/// Something that can look up its catalog identifiers
pub trait Resolve {
    fn resolve(&mut self, resolver: &mut Resolver<'_>);
}

/// A DFC is listed as "Front // Back"; authored content may name either face
fn names_match(authored: &str, catalog: &str) -> bool {
    authored == catalog || catalog.split(" // ").any(|face| face == authored)
}

impl Resolve for Card {
    fn resolve(&mut self, resolver: &mut Resolver<'_>) {
        self.uuid = None;
        let index = resolver.index;

        let Some(id) = index.card_id(&self.set_code, &self.number) else {
            resolver.miss(format!(
                "Card number {} not found in set {}",
                self.number, self.set_code
            ));
            return;
        };

        match index.card_name(&self.set_code, &id) {
            Some(catalog_name) if !names_match(&self.name, catalog_name) => {
                resolver.miss(format!(
                    "Card number {} in set {} is {} in the catalog, not {}",
                    self.number, self.set_code, catalog_name, self.name
                ));
            }
            _ => self.uuid = Some(id),
        }
    }
}

impl Resolve for Pack {
    fn resolve(&mut self, resolver: &mut Resolver<'_>) {
        if !resolver.index.has_booster(&self.set_code, &self.code) {
            resolver.miss(format!(
                "Booster code {} not found in set {}",
                self.code, self.set_code
            ));
        }
    }
}

impl Resolve for Deck {
    fn resolve(&mut self, resolver: &mut Resolver<'_>) {
        if !resolver.index.has_deck(&self.set_code, &self.name) {
            resolver.miss(format!(
                "Deck named {} not found in set {}",
                self.name, self.set_code
            ));
        }
    }
}

impl Resolve for SealedRef {
    fn resolve(&mut self, resolver: &mut Resolver<'_>) {
        self.uuid = resolver.index.sealed_product_id(&self.set_code, &self.name);
        if self.uuid.is_none() {
            resolver.miss(format!(
                "Product name {} not found in set {}",
                self.name, self.set_code
            ));
        }
    }
}

impl Resolve for Product {
    fn resolve(&mut self, resolver: &mut Resolver<'_>) {
        self.uuid = match (&self.name, &self.set_code) {
            (Some(name), Some(set_code)) => {
                let id = resolver.index.sealed_product_id(set_code, name);
                if id.is_none() {
                    resolver.miss(format!("Product name {name} not found in set {set_code}"));
                }
                id
            }
            _ => None,
        };

        for card in &mut self.cards {
            card.resolve(resolver);
        }
        for pack in &mut self.packs {
            pack.resolve(resolver);
        }
        for deck in &mut self.decks {
            deck.resolve(resolver);
        }
        for sealed in &mut self.sealed {
            sealed.resolve(resolver);
        }
        for branch in &mut self.variable {
            branch.resolve(resolver);
        }
    }
}

/// Resolve a top-level product, recording misses under its set and name
pub fn resolve_product(product: &mut Product, index: &CatalogIndex, diagnostics: &mut Diagnostics) {
    let container = product.set_code.clone().unwrap_or_default();
    let name = product.name.clone();
    let mut resolver = Resolver::new(index, diagnostics, &container, name.as_deref());
    product.resolve(&mut resolver);
}
