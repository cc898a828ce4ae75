//! Record output for products
//!
//! The inverse of construction, except that empty lists and zero counts are
//! left out, and `variable` is wrapped as `[{configs: [...]}]`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::Product;

#[derive(serde::Serialize)]
struct VariableConfigs<'a> {
    configs: &'a [Product],
}

#[derive(serde::Serialize)]
struct VariableConfig {
    chance: u64,
    weight: u64,
}

impl Serialize for Product {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        if !self.cards.is_empty() {
            map.serialize_entry("card", &self.cards)?;
        }
        if !self.packs.is_empty() {
            map.serialize_entry("pack", &self.packs)?;
        }
        if !self.decks.is_empty() {
            map.serialize_entry("deck", &self.decks)?;
        }
        if !self.sealed.is_empty() {
            map.serialize_entry("sealed", &self.sealed)?;
        }
        if !self.others.is_empty() {
            map.serialize_entry("other", &self.others)?;
        }
        if !self.variable.is_empty() {
            map.serialize_entry(
                "variable",
                &[VariableConfigs {
                    configs: &self.variable,
                }],
            )?;
        }
        if self.card_count != 0 {
            map.serialize_entry("card_count", &self.card_count)?;
        }
        if self.weight != 0 {
            map.serialize_entry(
                "variable_config",
                &[VariableConfig {
                    chance: self.chance,
                    weight: self.weight,
                }],
            )?;
        }

        map.end()
    }
}

impl Product {
    /// Serialize into a record value
    pub fn to_record(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
