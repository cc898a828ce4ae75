//! Test helper functions for integration tests
//!
//! Shared across test files using the tests/common/ pattern.

#![allow(dead_code)]

use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use uuid::Uuid;

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Deterministic id for fixture records
pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub const FOREST: &str = "00000000-0000-0000-0000-00000000000a";
pub const DELVER: &str = "00000000-0000-0000-0000-00000000000b";
pub const TOPPER: &str = "00000000-0000-0000-0000-00000000000c";

/// A two-set catalog in the shape of the master catalog document
pub fn fixture_catalog() -> Value {
    json!({
        "meta": {"date": "2024-01-01", "version": "5.2.2"},
        "data": {
            "ABC": {
                "name": "Alpha Beta Core",
                "booster": {
                    "draft": {
                        "boosters": [{"contents": {"common": 10, "foil": 1}, "weight": 1}],
                        "sheets": {
                            "common": {"cards": {FOREST: 4, DELVER: 1}},
                            "foil": {"foil": true, "cards": {FOREST: 1}},
                            "unused": {"cards": {TOPPER: 1}}
                        }
                    },
                    "collector": {"boosters": []}
                },
                "decks": [
                    {"name": "Starter Deck", "sourceSetCodes": ["ABC"], "mainBoard": [{"name": "Forest", "uuid": FOREST}], "tokens": [{"name": "Soldier", "uuid": id(30).to_string()}]},
                    {"name": "Commander Deck", "sourceSetCodes": ["ABC"]}
                ],
                "sealedProduct": [
                    {"name": "ABC Draft Booster Pack", "uuid": id(1).to_string()},
                    {"name": "ABC Draft Booster Box", "uuid": id(2).to_string()},
                    {"name": "ABC Starter Kit", "uuid": id(3).to_string()},
                    {"name": "ABC Bundle", "uuid": id(4).to_string()},
                    {"name": "Broken Product"}
                ],
                "cards": [
                    {"name": "Forest", "number": "1", "uuid": id(10).to_string(), "finishes": ["nonfoil", "foil"]},
                    {"name": "Delver of Secrets // Insectile Aberration", "number": "2", "uuid": id(11).to_string()},
                    {"name": "Box Topper", "number": "301", "uuid": id(12).to_string(), "finishes": ["foil"]}
                ]
            },
            "XYZ": {
                "booster": {"default": {}},
                "cards": [{"name": "Island", "number": "5", "uuid": id(20).to_string()}]
            }
        }
    })
}

pub fn write_catalog(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("AllPrintings.json");
    fs::write(&path, serde_json::to_string_pretty(&fixture_catalog())?)?;
    Ok(path)
}

/// Write one YAML content file per `(file name, body)` pair
pub fn write_contents(dir: &Path, files: &[(&str, &str)]) -> Result<PathBuf> {
    let contents = dir.join("contents");
    fs::create_dir_all(&contents)?;
    for (name, body) in files {
        fs::write(contents.join(name), body)?;
    }
    Ok(contents)
}

pub const ABC_CONTENTS: &str = r#"
code: abc
products:
  ABC Draft Booster Pack:
    pack:
      - set: abc
        code: draft
    card_count: 15
  ABC Draft Booster Box:
    sealed:
      - set: abc
        count: 36
        name: ABC Draft Booster Pack
    variable_mode:
      count: 1
      replacement: false
    variable:
      - card:
          - set: abc
            number: "301"
            name: Box Topper
            foil: true
      - {}
  ABC Starter Kit:
    deck:
      - set: abc
        name: Starter Deck
    card_count: 60
  ABC Bundle:
    sealed:
      - set: abc
        count: 10
        name: ABC Draft Booster Pack
    other:
      - name: Oversized spindown die
  ABC Bundle Gift Edition:
    copy: ABC Bundle
  ABC Prerelease Pack:
"#;
