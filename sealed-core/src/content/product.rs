//! Product construction, merge and variable expansion

use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::leaf::{Card, Component, Deck, Other, Pack, SealedRef};
use super::{value_kind, ContentError};

/// How `variable` branches are combined into configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct VariableMode {
    /// Choose with repetition (multiset combinations)
    #[serde(default)]
    pub replacement: bool,

    /// Number of branches per configuration
    #[serde(default = "default_count")]
    pub count: usize,

    /// Expected sum of configuration chances
    #[serde(default)]
    pub weight: Option<u64>,
}

fn default_count() -> usize {
    1
}

/// Explicit chance/weight as written back by the serializer
#[derive(Debug, Clone, Copy, Deserialize)]
struct VariableConfig {
    #[serde(default)]
    chance: Option<u64>,
    #[serde(default)]
    weight: Option<u64>,
}

/// A product's contents
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Catalog name, set for top-level products only
    pub name: Option<String>,
    pub set_code: Option<String>,
    pub uuid: Option<Uuid>,
    pub cards: Vec<Card>,
    pub packs: Vec<Pack>,
    pub decks: Vec<Deck>,
    pub sealed: Vec<SealedRef>,
    pub others: Vec<Other>,
    pub card_count: u64,
    /// Alternative configurations; empty means the contents are fixed
    pub variable: Vec<Product>,
    pub chance: u64,
    pub weight: u64,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            name: None,
            set_code: None,
            uuid: None,
            cards: Vec::new(),
            packs: Vec::new(),
            decks: Vec::new(),
            sealed: Vec::new(),
            others: Vec::new(),
            card_count: 0,
            variable: Vec::new(),
            chance: 1,
            weight: 0,
        }
    }
}

impl Product {
    /// Empty product with chance 1 and no weight
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a top-level product from its source record
    pub fn from_record(record: &Value, set_code: &str, name: &str) -> Result<Self, ContentError> {
        let mut product = Self::build(record, Some(name))?;
        product.name = Some(name.to_string());
        product.set_code = Some(set_code.to_string());
        Ok(product)
    }

    /// Build an anonymous product (a branch or a standalone record)
    pub fn from_branch(record: &Value) -> Result<Self, ContentError> {
        Self::build(record, None)
    }

    /// `enclosing` is the top-level product name, used to reject self references
    fn build(record: &Value, enclosing: Option<&str>) -> Result<Self, ContentError> {
        let map = match record {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            other => return Err(ContentError::NotAMap(value_kind(other))),
        };

        let mut product = Self {
            cards: leaves(map, "card")?,
            packs: leaves(map, "pack")?,
            decks: leaves(map, "deck")?,
            sealed: leaves(map, "sealed")?,
            others: leaves(map, "other")?,
            card_count: optional_u64(map, "card_count")?.unwrap_or(0),
            ..Self::new()
        };

        if let Some(enclosing) = enclosing {
            if product.sealed.iter().any(|s| s.name == enclosing) {
                return Err(ContentError::SelfReference(enclosing.to_string()));
            }
        }

        if let Some(config) = variable_config(map)? {
            product.chance = config.chance.unwrap_or(1);
            product.weight = config.weight.unwrap_or(0);
        }
        if let Some(chance) = optional_u64(map, "chance")? {
            product.chance = chance;
        }
        if let Some(weight) = optional_u64(map, "weight")? {
            product.weight = weight;
        }

        let branches = variable_records(map)?;
        product.variable = match map.get("variable_mode") {
            Some(mode) => {
                let mode = VariableMode::deserialize(mode)
                    .map_err(|e| ContentError::malformed("variable_mode", e))?;
                Self::expand(&branches, mode, enclosing)?
            }
            None => branches
                .into_iter()
                .map(|branch| Self::build(branch, enclosing))
                .collect::<Result<_, _>>()?,
        };

        Ok(product)
    }

    /// Combine branch records into every `count`-sized configuration
    fn expand(
        records: &[&Value],
        mode: VariableMode,
        enclosing: Option<&str>,
    ) -> Result<Vec<Product>, ContentError> {
        let branches = records
            .iter()
            .map(|record| Self::build(record, enclosing))
            .collect::<Result<Vec<_>, _>>()?;

        let combos: Vec<Vec<&Product>> = if mode.replacement {
            branches
                .iter()
                .combinations_with_replacement(mode.count)
                .collect()
        } else {
            branches.iter().combinations(mode.count).collect()
        };

        let mut configs: Vec<Product> = combos
            .into_iter()
            .map(|combo| {
                let mut merged = Product::new();
                for branch in combo {
                    merged.merge(branch.clone());
                }
                merged
            })
            .collect();

        let total: u64 = configs.iter().map(|c| c.chance).sum();
        let weight = match mode.weight {
            Some(expected) if expected != total => {
                return Err(ContentError::WeightMismatch {
                    expected,
                    actual: total,
                })
            }
            Some(expected) => expected,
            None => total,
        };

        for config in &mut configs {
            config.weight = weight;
        }

        Ok(configs)
    }

    /// Append another product's contents to this one.
    ///
    /// Lists concatenate, card counts add and chances multiply.
    pub fn merge(&mut self, other: Product) {
        self.cards.extend(other.cards);
        self.packs.extend(other.packs);
        self.decks.extend(other.decks);
        self.sealed.extend(other.sealed);
        self.others.extend(other.others);
        self.variable.extend(other.variable);
        self.card_count += other.card_count;
        self.chance = self.chance.saturating_mul(other.chance);
    }

    /// True when the product would serialize to an empty record
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
            && self.packs.is_empty()
            && self.decks.is_empty()
            && self.sealed.is_empty()
            && self.others.is_empty()
            && self.variable.is_empty()
            && self.card_count == 0
            && self.weight == 0
    }

    /// Leaves directly in this product, excluding variable branches
    pub fn components(&self) -> impl Iterator<Item = Component<'_>> {
        self.cards
            .iter()
            .map(Component::Card)
            .chain(self.packs.iter().map(Component::Pack))
            .chain(self.decks.iter().map(Component::Deck))
            .chain(self.sealed.iter().map(Component::Sealed))
            .chain(self.others.iter().map(Component::Other))
    }

    /// Visit every leaf, descending into variable branches
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(Component<'a>)) {
        for component in self.components() {
            visit(component);
        }
        for branch in &self.variable {
            branch.walk(visit);
        }
    }
}

fn leaves<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Result<Vec<T>, ContentError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| T::deserialize(item).map_err(|e| ContentError::malformed(key, e)))
            .collect(),
        Some(other) => Err(ContentError::malformed(
            key,
            format!("expected a list, found {}", value_kind(other)),
        )),
    }
}

fn optional_u64(map: &Map<String, Value>, key: &str) -> Result<Option<u64>, ContentError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            ContentError::malformed(key, format!("expected a non-negative integer, found {value}"))
        }),
    }
}

fn variable_config(map: &Map<String, Value>) -> Result<Option<VariableConfig>, ContentError> {
    match map.get("variable_config") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let configs = Vec::<VariableConfig>::deserialize(value)
                .map_err(|e| ContentError::malformed("variable_config", e))?;
            Ok(configs.into_iter().next())
        }
    }
}

/// Branch records, flattening the `{configs: [...]}` wrapper used on output
fn variable_records(map: &Map<String, Value>) -> Result<Vec<&Value>, ContentError> {
    let items = match map.get("variable") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ContentError::malformed(
                "variable",
                format!("expected a list, found {}", value_kind(other)),
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match item.as_object().and_then(|obj| match obj.len() {
            1 => obj.get("configs").and_then(Value::as_array),
            _ => None,
        }) {
            Some(configs) => records.extend(configs.iter()),
            None => records.push(item),
        }
    }

    Ok(records)
}
