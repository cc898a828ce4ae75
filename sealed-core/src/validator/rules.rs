//! Validation rules for product records

use serde_json::{Map, Value};

use super::{ContentRule, ProductRecord, Severity, ValidationIssue};
use crate::content::{is_empty_record, Product, CONTENT_KEYS};

/// Expanded record as a map, if it is one
fn record_map<'a>(record: &'a ProductRecord<'_>) -> Option<&'a Map<String, Value>> {
    record.expanded.as_ref().ok()?.as_object()
}

/// Rule: a product record must be a map
pub struct RecordShapeRule;

impl ContentRule for RecordShapeRule {
    fn rule_id(&self) -> &'static str {
        "record-shape"
    }

    fn description(&self) -> &'static str {
        "Product record must be a map of content keys"
    }

    fn check(&self, record: &ProductRecord<'_>) -> Vec<ValidationIssue> {
        let Ok(expanded) = &record.expanded else {
            return Vec::new();
        };
        if is_empty_record(expanded) || expanded.is_object() {
            return Vec::new();
        }

        let message = match expanded {
            Value::Array(_) => "Product record is a list; wrap its entries under a content key such as `card` or `sealed`".to_string(),
            other => format!("Product record must be a map, found {other}"),
        };
        vec![record.issue(Severity::Error, self.rule_id(), message)]
    }
}

/// Rule: only known content keys, at any depth of `variable`
pub struct UnknownKeyRule;

impl UnknownKeyRule {
    fn collect(&self, map: &Map<String, Value>, path: &str, found: &mut Vec<String>) {
        for (key, value) in map {
            if !CONTENT_KEYS.contains(&key.as_str()) {
                found.push(format!("{path}{key}"));
                continue;
            }
            if key != "variable" {
                continue;
            }
            let Some(branches) = value.as_array() else {
                continue;
            };
            for (i, branch) in branches.iter().enumerate() {
                if let Some(branch) = branch.as_object() {
                    self.collect(branch, &format!("{path}variable[{i}]."), found);
                }
            }
        }
    }
}

impl ContentRule for UnknownKeyRule {
    fn rule_id(&self) -> &'static str {
        "unknown-key"
    }

    fn description(&self) -> &'static str {
        "Product records may only use recognized content keys"
    }

    fn check(&self, record: &ProductRecord<'_>) -> Vec<ValidationIssue> {
        let Some(map) = record_map(record) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        self.collect(map, "", &mut found);

        found
            .into_iter()
            .map(|key| {
                record.issue(
                    Severity::Error,
                    self.rule_id(),
                    format!("Unknown content key `{key}`"),
                )
            })
            .collect()
    }
}

/// Rule: products with packs or decks should declare a card count
pub struct CardCountRule;

impl ContentRule for CardCountRule {
    fn rule_id(&self) -> &'static str {
        "card-count"
    }

    fn description(&self) -> &'static str {
        "Products containing packs or decks should set card_count"
    }

    fn check(&self, record: &ProductRecord<'_>) -> Vec<ValidationIssue> {
        let Some(map) = record_map(record) else {
            return Vec::new();
        };

        let has_packs_or_decks = ["pack", "deck"]
            .iter()
            .any(|key| map.get(*key).and_then(Value::as_array).is_some_and(|v| !v.is_empty()));

        if has_packs_or_decks && !map.contains_key("card_count") {
            vec![record.issue(
                Severity::Warning,
                self.rule_id(),
                "Contains packs or decks but has no card_count",
            )]
        } else {
            Vec::new()
        }
    }
}

/// Rule: note products whose contents are not written yet
pub struct EmptyRecordRule;

impl ContentRule for EmptyRecordRule {
    fn rule_id(&self) -> &'static str {
        "empty-record"
    }

    fn description(&self) -> &'static str {
        "Product has no contents and will be skipped"
    }

    fn check(&self, record: &ProductRecord<'_>) -> Vec<ValidationIssue> {
        match &record.expanded {
            Ok(expanded) if is_empty_record(expanded) => vec![record.issue(
                Severity::Info,
                self.rule_id(),
                "No contents yet; product will be skipped",
            )],
            _ => Vec::new(),
        }
    }
}

/// Rule: the record must build into a product
pub struct ConstructionRule;

impl ContentRule for ConstructionRule {
    fn rule_id(&self) -> &'static str {
        "construction"
    }

    fn description(&self) -> &'static str {
        "Record must construct (no self references, weight mismatches or malformed fields)"
    }

    fn check(&self, record: &ProductRecord<'_>) -> Vec<ValidationIssue> {
        let error = match &record.expanded {
            Err(e) => Some(e.to_string()),
            Ok(expanded) if expanded.is_object() && !is_empty_record(expanded) => {
                Product::from_record(expanded, record.container, record.name)
                    .err()
                    .map(|e| e.to_string())
            }
            // Shape problems belong to record-shape
            Ok(_) => None,
        };

        error
            .map(|message| vec![record.issue(Severity::Error, self.rule_id(), message)])
            .unwrap_or_default()
    }
}
