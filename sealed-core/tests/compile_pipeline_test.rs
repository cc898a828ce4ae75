//! End-to-end tests: catalog file + content files -> artifacts + status log

mod common;

use pretty_assertions::assert_eq;
use sealed_core::catalog::{build_index_from_path, CatalogIndex, Finish};
use sealed_core::compiler::ContentCompiler;
use sealed_core::content::{load_content_dir, ContentFile, Product};
use sealed_core::diagnostics::{DiagnosticKind, Diagnostics};
use serde_json::json;
use std::path::Path;

use common::{id, init_test_logging, write_catalog, write_contents, ABC_CONTENTS};

const XYZ_CONTENTS: &str = r#"
code: xyz
products:
  XYZ Booster:
    pack:
      - set: xyz
        code: default
    card_count: 14
  XYZ Self Box:
    sealed:
      - set: xyz
        count: 1
        name: XYZ Self Box
  XYZ Promo Pack:
    card:
      - set: xyz
        number: 5
        name: Forest
    deck:
      - set: abc
        name: Starter Deck
"#;

fn setup(dir: &Path) -> (CatalogIndex, Vec<ContentFile>) {
    init_test_logging();
    let catalog = write_catalog(dir).unwrap();
    let contents = write_contents(
        dir,
        &[("ABC.yaml", ABC_CONTENTS), ("XYZ.yaml", XYZ_CONTENTS)],
    )
    .unwrap();

    let mut diagnostics = Diagnostics::new();
    let index = build_index_from_path(&catalog, Some("data"), &mut diagnostics).unwrap();
    let files = load_content_dir(&contents).unwrap();
    (index, files)
}

#[test]
fn test_full_compile_run() {
    let dir = tempfile::tempdir().unwrap();
    let (index, files) = setup(dir.path());

    let output = ContentCompiler::new(&index).compile_all(&files);

    let abc = &output.contents["abc"];
    assert_eq!(
        abc.keys().map(String::as_str).collect::<Vec<_>>(),
        vec![
            "ABC Bundle",
            "ABC Bundle Gift Edition",
            "ABC Draft Booster Box",
            "ABC Draft Booster Pack",
            "ABC Starter Kit",
        ]
    );
    assert_eq!(abc["ABC Draft Booster Box"].uuid, Some(id(2)));
    assert_eq!(abc["ABC Bundle Gift Edition"].uuid, None);
    assert_eq!(
        abc["ABC Bundle Gift Edition"].sealed,
        abc["ABC Bundle"].sealed
    );

    let xyz = &output.contents["xyz"];
    assert!(!xyz.contains_key("XYZ Self Box"));
    assert_eq!(xyz.len(), 2);

    let diagnostics = &output.diagnostics;
    assert_eq!(diagnostics.count(DiagnosticKind::ResolutionMiss), 4);
    assert_eq!(diagnostics.count(DiagnosticKind::StructuralError), 1);
    assert_eq!(diagnostics.count(DiagnosticKind::MissingContents), 1);

    let linked: Vec<_> = output
        .deck_links
        .products_for("abc", "Starter Deck")
        .unwrap()
        .iter()
        .copied()
        .collect();
    assert_eq!(linked, vec![id(3)]);
    assert_eq!(output.deck_links.deck_count(), 1);
}

#[test]
fn test_card_links_reach_through_packs_decks_and_sealed() {
    let dir = tempfile::tempdir().unwrap();
    let (index, files) = setup(dir.path());

    let output = ContentCompiler::new(&index).compile_all(&files);
    let links = &output.card_links;
    let linked = |card: u128, finish: Finish| -> Vec<_> {
        links
            .products_for(&id(card), finish)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    };

    // Forest is on the draft sheets and in the Starter Deck list
    assert_eq!(linked(10, Finish::Nonfoil), vec![id(1), id(2), id(3), id(4)]);
    assert_eq!(linked(10, Finish::Foil), vec![id(1), id(2), id(4)]);
    assert_eq!(linked(11, Finish::Nonfoil), vec![id(1), id(2), id(4)]);
    // The box topper only appears as a foil loose card in one branch
    assert_eq!(linked(12, Finish::Foil), vec![id(2)]);
    assert!(links.products_for(&id(12), Finish::Nonfoil).is_none());
    // Deck tokens are not part of the deck
    assert!(links.products_for(&id(30), Finish::Nonfoil).is_none());
    assert_eq!(links.card_count(), 3);

    let artifact = output.card_links_artifact().unwrap();
    assert_eq!(
        artifact[id(12).to_string()],
        json!({"foil": [id(2).to_string()]})
    );
}

#[test]
fn test_variable_box_serializes_with_configs() {
    let dir = tempfile::tempdir().unwrap();
    let (index, files) = setup(dir.path());

    let output = ContentCompiler::new(&index).compile_all(&files);
    let artifact = output.contents_artifact().unwrap();
    let record = &artifact["abc"]["ABC Draft Booster Box"];

    assert_eq!(
        record["sealed"],
        json!([{"set": "abc", "count": 36, "name": "ABC Draft Booster Pack", "uuid": id(1).to_string()}])
    );
    let configs = record["variable"][0]["configs"].as_array().unwrap();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0]["card"][0]["uuid"], json!(id(12).to_string()));
    assert_eq!(configs[0]["card"][0]["foil"], json!(true));
    for config in configs {
        assert_eq!(config["variable_config"], json!([{"chance": 1, "weight": 2}]));
    }

    // Output records compile back to the same product
    let rebuilt = Product::from_branch(record).unwrap();
    assert_eq!(rebuilt.to_record().unwrap(), *record);
}

#[test]
fn test_container_order_does_not_change_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let (index, files) = setup(dir.path());
    let reversed: Vec<_> = files.iter().rev().cloned().collect();

    let compiler = ContentCompiler::new(&index);
    let forward = compiler.compile_all(&files);
    let backward = compiler.compile_all(&reversed);

    assert_eq!(
        forward.contents_artifact().unwrap(),
        backward.contents_artifact().unwrap()
    );
    assert_eq!(forward.deck_links, backward.deck_links);
    assert_eq!(forward.card_links, backward.card_links);
    assert_eq!(forward.diagnostics.len(), backward.diagnostics.len());
}

#[test]
fn test_status_file_lists_every_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let (index, files) = setup(dir.path());

    let output = ContentCompiler::new(&index).compile_all(&files);
    let status = dir.path().join("out").join("status.txt");
    output.diagnostics.write_status_file(&status).unwrap();

    let content = std::fs::read_to_string(&status).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines[0], "Starting output");
    assert_eq!(lines.len(), output.diagnostics.len() + 1);
    assert!(lines.contains(&"abc - ABC Prerelease Pack: missing contents"));
    assert!(lines
        .iter()
        .any(|line| line.starts_with("xyz - XYZ Promo Pack: Card number 5 in set xyz is Island")));
}

#[test]
fn test_missing_sets_resolve_to_diagnostics() {
    init_test_logging();
    let index = CatalogIndex::new();
    let file = ContentFile::from_yaml(ABC_CONTENTS).unwrap();

    let output = ContentCompiler::new(&index).compile_all(&[file]);

    // Nothing resolves, but every product except the empty one is still emitted
    assert_eq!(output.product_count(), 5);
    assert!(output.deck_links.is_empty());
    assert!(output.card_links.is_empty());
    assert!(output.diagnostics.count(DiagnosticKind::ResolutionMiss) >= 5);
}
