//! Leaf components of a product
//!
//! Each leaf deserializes from and serializes back to the record shape used
//! in content files. Optional fields are omitted when unset.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Collector numbers are strings, but hand-written YAML often has bare ints
fn number_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Text(String),
        Int(i64),
    }

    Ok(match Number::deserialize(deserializer)? {
        Number::Text(text) => text,
        Number::Int(n) => n.to_string(),
    })
}

/// A specific card printing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    #[serde(rename = "set")]
    pub set_code: String,
    #[serde(deserialize_with = "number_as_string")]
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub foil: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub etched: bool,
}

/// A booster pack of a given booster code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pack {
    #[serde(rename = "set")]
    pub set_code: String,
    pub code: String,
}

/// A preconstructed deck
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deck {
    #[serde(rename = "set")]
    pub set_code: String,
    pub name: String,
}

/// Another catalog sealed product contained in this one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedRef {
    #[serde(rename = "set")]
    pub set_code: String,
    pub count: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
}

/// Opaque component with no catalog counterpart
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Other {
    pub name: String,
}

/// Borrowed view of any leaf, for walking a product tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Component<'a> {
    Card(&'a Card),
    Pack(&'a Pack),
    Deck(&'a Deck),
    Sealed(&'a SealedRef),
    Other(&'a Other),
}

impl Component<'_> {
    /// Record key this leaf lives under
    pub fn kind(&self) -> &'static str {
        match self {
            Component::Card(_) => "card",
            Component::Pack(_) => "pack",
            Component::Deck(_) => "deck",
            Component::Sealed(_) => "sealed",
            Component::Other(_) => "other",
        }
    }

    /// Identifier attached during resolution, for leaves that carry one
    pub fn uuid(&self) -> Option<Uuid> {
        match self {
            Component::Card(card) => card.uuid,
            Component::Sealed(sealed) => sealed.uuid,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_card_number_accepts_integers() {
        let card: Card =
            serde_json::from_value(json!({"name": "Forest", "set": "abc", "number": 264})).unwrap();
        assert_eq!(card.number, "264");
        assert!(!card.foil);
    }

    #[test]
    fn test_card_omits_unset_fields() {
        let card = Card {
            name: "Forest".to_string(),
            set_code: "abc".to_string(),
            number: "264".to_string(),
            uuid: None,
            foil: true,
            etched: false,
        };
        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            json!({"name": "Forest", "set": "abc", "number": "264", "foil": true})
        );
    }

    #[test]
    fn test_sealed_requires_count() {
        let result: Result<SealedRef, _> =
            serde_json::from_value(json!({"set": "abc", "name": "Booster Pack"}));
        assert!(result.is_err());
    }
}
