//! Raw record preprocessing
//!
//! Runs over a set's product map before any product is constructed. A record
//! of the form `{copy: Other Product}` stands for the contents of a sibling
//! product and is replaced by that sibling's record here.

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use super::ContentError;

/// The sibling a copy record points at, if `record` is one
pub fn copy_target(record: &Value) -> Option<&str> {
    let map = record.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get("copy")?.as_str()
}

/// Null, empty map and empty list all mean "contents not written yet"
pub fn is_empty_record(record: &Value) -> bool {
    match record {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Follow copy references starting at `name` until a real record is found
fn resolve_copy<'a>(
    name: &str,
    record: &'a Value,
    products: &'a BTreeMap<String, Value>,
) -> Result<&'a Value, ContentError> {
    let mut seen = HashSet::from([name]);
    let mut current = record;

    while let Some(target) = copy_target(current) {
        if !seen.insert(target) {
            return Err(ContentError::CopyCycle(name.to_string()));
        }
        current = products
            .get(target)
            .ok_or_else(|| ContentError::MissingCopyTarget(target.to_string()))?;
    }

    Ok(current)
}

/// Substitute every copy record with the record it refers to
pub fn expand_copies(
    products: &BTreeMap<String, Value>,
) -> BTreeMap<String, Result<Value, ContentError>> {
    products
        .iter()
        .map(|(name, record)| {
            let expanded = resolve_copy(name, record, products).cloned();
            (name.clone(), expanded)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn products(value: Value) -> BTreeMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_copy_is_replaced_by_sibling() {
        let products = products(json!({
            "Bundle": {"pack": [{"set": "abc", "code": "set"}], "card_count": 10},
            "Bundle Gift Edition": {"copy": "Bundle"},
        }));

        let expanded = expand_copies(&products);
        assert_eq!(
            expanded["Bundle Gift Edition"].as_ref().unwrap(),
            &products["Bundle"]
        );
    }

    #[test]
    fn test_copy_chains_are_followed() {
        let products = products(json!({
            "A": {"card_count": 1},
            "B": {"copy": "A"},
            "C": {"copy": "B"},
        }));

        let expanded = expand_copies(&products);
        assert_eq!(expanded["C"].as_ref().unwrap(), &json!({"card_count": 1}));
    }

    #[test]
    fn test_missing_target_and_cycle() {
        let products = products(json!({
            "A": {"copy": "Nowhere"},
            "B": {"copy": "C"},
            "C": {"copy": "B"},
            "D": {"copy": "D"},
        }));

        let expanded = expand_copies(&products);
        assert_eq!(
            expanded["A"],
            Err(ContentError::MissingCopyTarget("Nowhere".to_string()))
        );
        assert_eq!(expanded["B"], Err(ContentError::CopyCycle("B".to_string())));
        assert_eq!(expanded["D"], Err(ContentError::CopyCycle("D".to_string())));
    }

    #[test]
    fn test_copy_with_other_keys_is_not_a_copy() {
        let record = json!({"copy": "A", "card_count": 3});
        assert_eq!(copy_target(&record), None);
    }

    #[test]
    fn test_empty_records() {
        assert!(is_empty_record(&Value::Null));
        assert!(is_empty_record(&json!({})));
        assert!(is_empty_record(&json!([])));
        assert!(!is_empty_record(&json!({"card_count": 0})));
    }
}
