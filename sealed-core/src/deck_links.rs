//! Deck backlinks
//!
//! Reverse index from `(set, deck name)` to the ids of every top-level
//! product that contains the deck, directly or inside any variable branch.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::content::{Component, Product};

/// `set -> deck name -> product ids`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckLinks {
    links: BTreeMap<String, BTreeMap<String, BTreeSet<Uuid>>>,
}

impl DeckLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect from a forest of resolved products
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut links = Self::new();
        for product in products {
            links.add_product(product);
        }
        links
    }

    /// Link every deck in `product` to its id.
    ///
    /// Products without a resolved id have nothing to link and are skipped;
    /// returns whether the product was used.
    pub fn add_product(&mut self, product: &Product) -> bool {
        let Some(id) = product.uuid else {
            return false;
        };

        product.walk(&mut |component| {
            if let Component::Deck(deck) = component {
                self.add(&deck.set_code, &deck.name, id);
            }
        });
        true
    }

    pub fn add(&mut self, set_code: &str, deck_name: &str, id: Uuid) {
        self.links
            .entry(set_code.to_string())
            .or_default()
            .entry(deck_name.to_string())
            .or_default()
            .insert(id);
    }

    /// Set union with another link map
    pub fn merge(&mut self, other: DeckLinks) {
        for (set_code, decks) in other.links {
            let target = self.links.entry(set_code).or_default();
            for (deck_name, ids) in decks {
                target.entry(deck_name).or_default().extend(ids);
            }
        }
    }

    pub fn products_for(&self, set_code: &str, deck_name: &str) -> Option<&BTreeSet<Uuid>> {
        self.links.get(set_code)?.get(deck_name)
    }

    /// Number of distinct decks linked
    pub fn deck_count(&self) -> usize {
        self.links.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn product(uuid: u128, record: serde_json::Value) -> Product {
        let mut product = Product::from_branch(&record).unwrap();
        product.uuid = Some(Uuid::from_u128(uuid));
        product
    }

    #[test]
    fn test_branch_decks_link_to_top_level_product() {
        let product = product(
            1,
            json!({
                "deck": [{"set": "abc", "name": "Top"}],
                "variable": [
                    {"deck": [{"set": "abc", "name": "Left"}]},
                    {"deck": [{"set": "abc", "name": "Right"}]},
                ],
            }),
        );

        let links = DeckLinks::from_products([&product]);
        for deck in ["Top", "Left", "Right"] {
            assert_eq!(
                links.products_for("abc", deck).unwrap().iter().collect::<Vec<_>>(),
                vec![&Uuid::from_u128(1)],
                "{deck}"
            );
        }
        assert_eq!(links.deck_count(), 3);
    }

    #[test]
    fn test_unresolved_products_are_skipped() {
        let mut unresolved = product(1, json!({"deck": [{"set": "abc", "name": "Top"}]}));
        unresolved.uuid = None;

        let mut links = DeckLinks::new();
        assert!(!links.add_product(&unresolved));
        assert!(links.is_empty());
    }

    #[test]
    fn test_merge_is_order_independent_and_idempotent() {
        let a = product(1, json!({"deck": [{"set": "abc", "name": "Shared"}]}));
        let b = product(2, json!({"deck": [{"set": "abc", "name": "Shared"}]}));
        let c = product(3, json!({"deck": [{"set": "xyz", "name": "Solo"}]}));

        let first = DeckLinks::from_products([&a]);
        let second = DeckLinks::from_products([&b, &c]);

        let mut forward = first.clone();
        forward.merge(second.clone());
        let mut backward = second.clone();
        backward.merge(first.clone());
        assert_eq!(forward, backward);

        let mut twice = forward.clone();
        twice.merge(forward.clone());
        assert_eq!(twice, forward);

        assert_eq!(forward.products_for("abc", "Shared").unwrap().len(), 2);
    }

    #[test]
    fn test_serializes_as_sorted_lists() {
        let mut links = DeckLinks::new();
        links.add("abc", "Deck", Uuid::from_u128(2));
        links.add("abc", "Deck", Uuid::from_u128(1));

        assert_eq!(
            serde_json::to_value(&links).unwrap(),
            json!({"abc": {"Deck": [
                "00000000-0000-0000-0000-000000000001",
                "00000000-0000-0000-0000-000000000002"
            ]}})
        );
    }
}
