//! Catalog index lookup tables
//!
//! One `ContainerIndex` per set code, holding what identifier resolution
//! and card linking need: booster codes, deck names, sealed product ids,
//! card ids and the cards each booster and deck can hold. Set codes are
//! stored lowercased; lookups lowercase their input.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Printing finish of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    Nonfoil,
    Foil,
    Etched,
}

impl Finish {
    /// Etched takes precedence over foil
    pub fn from_flags(foil: bool, etched: bool) -> Self {
        match (foil, etched) {
            (_, true) => Finish::Etched,
            (true, false) => Finish::Foil,
            (false, false) => Finish::Nonfoil,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "nonfoil" => Some(Finish::Nonfoil),
            "foil" => Some(Finish::Foil),
            "etched" => Some(Finish::Etched),
            _ => None,
        }
    }
}

/// A card printing in a specific finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardRef {
    pub uuid: Uuid,
    pub finish: Finish,
}

/// Lookup tables for a single container (set)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerIndex {
    /// Valid booster codes
    #[serde(default)]
    pub booster_codes: BTreeSet<String>,

    /// Valid deck names
    #[serde(default)]
    pub deck_names: BTreeSet<String>,

    /// Sealed product name to id
    #[serde(default)]
    pub sealed_product_ids: BTreeMap<String, Uuid>,

    /// Card collector number to id
    #[serde(default)]
    pub card_ids: BTreeMap<String, Uuid>,

    /// Card id to the name the catalog gives it
    #[serde(default)]
    pub card_names: BTreeMap<Uuid, String>,

    /// Cards on the sheets each booster code draws from
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub booster_cards: BTreeMap<String, BTreeSet<CardRef>>,

    /// Cards in each deck
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deck_cards: BTreeMap<String, BTreeSet<CardRef>>,
}

impl ContainerIndex {
    /// Record a card; a later printing with the same collector number replaces
    /// the earlier one
    pub fn add_card(&mut self, number: String, id: Uuid, name: Option<String>) {
        self.card_ids.insert(number, id);
        if let Some(name) = name {
            self.card_names.insert(id, name);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.booster_codes.is_empty()
            && self.deck_names.is_empty()
            && self.sealed_product_ids.is_empty()
            && self.card_ids.is_empty()
    }
}

/// The frozen catalog index, keyed by lowercased set code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogIndex {
    containers: BTreeMap<String, ContainerIndex>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a complete container entry, replacing any previous one
    pub fn insert(&mut self, code: &str, container: ContainerIndex) {
        self.containers.insert(code.to_lowercase(), container);
    }

    /// Get the tables for a set code (case-insensitive)
    pub fn container(&self, code: &str) -> Option<&ContainerIndex> {
        self.containers.get(&code.to_lowercase())
    }

    pub fn containers(&self) -> impl Iterator<Item = (&str, &ContainerIndex)> {
        self.containers.iter().map(|(code, c)| (code.as_str(), c))
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn has_booster(&self, code: &str, booster: &str) -> bool {
        self.container(code)
            .is_some_and(|c| c.booster_codes.contains(booster))
    }

    pub fn has_deck(&self, code: &str, deck: &str) -> bool {
        self.container(code)
            .is_some_and(|c| c.deck_names.contains(deck))
    }

    pub fn sealed_product_id(&self, code: &str, name: &str) -> Option<Uuid> {
        self.container(code)?.sealed_product_ids.get(name).copied()
    }

    pub fn card_id(&self, code: &str, number: &str) -> Option<Uuid> {
        self.container(code)?.card_ids.get(number).copied()
    }

    pub fn card_name(&self, code: &str, id: &Uuid) -> Option<&str> {
        self.container(code)?.card_names.get(id).map(String::as_str)
    }

    pub fn booster_cards(&self, code: &str, booster: &str) -> Option<&BTreeSet<CardRef>> {
        self.container(code)?.booster_cards.get(booster)
    }

    pub fn deck_cards(&self, code: &str, deck: &str) -> Option<&BTreeSet<CardRef>> {
        self.container(code)?.deck_cards.get(deck)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse from JSON produced by [`CatalogIndex::to_json`]
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}
