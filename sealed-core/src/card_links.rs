//! Card backlinks
//!
//! Reverse index from a card printing and finish to every top-level product
//! that can contain it. Loose cards link directly. Packs and decks link the
//! cards the catalog lists for them, and nested sealed products contribute
//! whatever their own compiled contents reach.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::catalog::{CardRef, CatalogIndex, Finish};
use crate::content::{Component, Product};

/// `card id -> finish -> product ids`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardLinks {
    links: BTreeMap<Uuid, BTreeMap<Finish, BTreeSet<Uuid>>>,
}

impl CardLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect from the compiled `set -> name -> product` forest.
    ///
    /// Sealed references are followed through the compiled product carrying
    /// the referenced id, so a bundle links every card its boosters can hold.
    pub fn from_compiled(
        contents: &BTreeMap<String, BTreeMap<String, Product>>,
        index: &CatalogIndex,
    ) -> Self {
        let mut by_id: BTreeMap<Uuid, &Product> = BTreeMap::new();
        for product in contents.values().flat_map(BTreeMap::values) {
            if let Some(id) = product.uuid {
                by_id.entry(id).or_insert(product);
            }
        }

        let mut links = Self::new();
        for product in contents.values().flat_map(BTreeMap::values) {
            links.add_product(product, index, &by_id);
        }
        links
    }

    /// Link every card reachable from `product` to its id.
    ///
    /// Returns whether the product was used; unresolved products are skipped.
    pub fn add_product(
        &mut self,
        product: &Product,
        index: &CatalogIndex,
        by_id: &BTreeMap<Uuid, &Product>,
    ) -> bool {
        let Some(id) = product.uuid else {
            return false;
        };

        let mut visited = BTreeSet::from([id]);
        let mut cards = BTreeSet::new();
        collect_cards(product, index, by_id, &mut visited, &mut cards);

        for card in cards {
            self.add(card, id);
        }
        true
    }

    pub fn add(&mut self, card: CardRef, id: Uuid) {
        self.links
            .entry(card.uuid)
            .or_default()
            .entry(card.finish)
            .or_default()
            .insert(id);
    }

    /// Set union with another link map
    pub fn merge(&mut self, other: CardLinks) {
        for (card, finishes) in other.links {
            let target = self.links.entry(card).or_default();
            for (finish, ids) in finishes {
                target.entry(finish).or_default().extend(ids);
            }
        }
    }

    pub fn products_for(&self, card: &Uuid, finish: Finish) -> Option<&BTreeSet<Uuid>> {
        self.links.get(card)?.get(&finish)
    }

    /// Number of distinct card printings linked
    pub fn card_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

fn collect_cards(
    product: &Product,
    index: &CatalogIndex,
    by_id: &BTreeMap<Uuid, &Product>,
    visited: &mut BTreeSet<Uuid>,
    cards: &mut BTreeSet<CardRef>,
) {
    let mut nested = Vec::new();

    product.walk(&mut |component| match component {
        Component::Card(card) => {
            if let Some(uuid) = card.uuid {
                cards.insert(CardRef {
                    uuid,
                    finish: Finish::from_flags(card.foil, card.etched),
                });
            }
        }
        Component::Pack(pack) => {
            if let Some(listed) = index.booster_cards(&pack.set_code, &pack.code) {
                cards.extend(listed.iter().copied());
            }
        }
        Component::Deck(deck) => {
            if let Some(listed) = index.deck_cards(&deck.set_code, &deck.name) {
                cards.extend(listed.iter().copied());
            }
        }
        Component::Sealed(sealed) => nested.extend(sealed.uuid),
        Component::Other(_) => {}
    });

    for id in nested {
        // Guards against products that contain each other
        if !visited.insert(id) {
            continue;
        }
        if let Some(inner) = by_id.get(&id) {
            collect_cards(inner, index, by_id, visited, cards);
        }
    }
}
