//! Benchmarks for catalog indexing and content compilation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sealed_core::catalog::IndexBuilder;
use sealed_core::compiler::ContentCompiler;
use sealed_core::content::{ContentFile, Product};
use sealed_core::diagnostics::Diagnostics;
use serde_json::{json, Map, Value};

/// A catalog with `sets` sets of 300 cards and 20 sealed products each
fn synthetic_catalog(sets: usize) -> Vec<u8> {
    let mut data = Map::new();
    for set in 0..sets {
        let cards: Vec<Value> = (0..300u128)
            .map(|n| {
                json!({
                    "name": format!("Card {n}"),
                    "number": n.to_string(),
                    "uuid": uuid::Uuid::from_u128((set as u128) << 32 | n).to_string(),
                    "finishes": ["nonfoil", "foil"],
                })
            })
            .collect();
        let sealed: Vec<Value> = (0..20u128)
            .map(|n| {
                json!({
                    "name": format!("Product {n}"),
                    "uuid": uuid::Uuid::from_u128((set as u128) << 48 | n).to_string(),
                })
            })
            .collect();
        data.insert(
            format!("S{set:03}"),
            json!({
                "booster": {"draft": {}, "collector": {}},
                "decks": [{"name": "Starter", "mainBoard": [{"name": "Card 1"}]}],
                "sealedProduct": sealed,
                "cards": cards,
            }),
        );
    }
    serde_json::to_vec(&json!({"data": data})).unwrap()
}

fn benchmark_index_build(c: &mut Criterion) {
    let catalog = synthetic_catalog(50);

    c.bench_function("index_build_50_sets", |b| {
        b.iter(|| {
            let mut diagnostics = Diagnostics::new();
            IndexBuilder::new(&mut diagnostics)
                .under_key("data")
                .build(black_box(catalog.as_slice()))
                .unwrap()
        });
    });
}

fn benchmark_variable_expansion(c: &mut Criterion) {
    let branches: Vec<Value> = (0..12)
        .map(|n| json!({"card": [{"set": "s000", "number": n.to_string(), "name": format!("Card {n}")}]}))
        .collect();
    let record = json!({
        "variable_mode": {"count": 3, "replacement": true},
        "variable": branches,
    });

    c.bench_function("expand_choose_3_of_12_with_replacement", |b| {
        b.iter(|| Product::from_branch(black_box(&record)).unwrap());
    });
}

fn benchmark_compile_all(c: &mut Criterion) {
    let catalog = synthetic_catalog(20);
    let mut diagnostics = Diagnostics::new();
    let index = IndexBuilder::new(&mut diagnostics)
        .under_key("data")
        .build(catalog.as_slice())
        .unwrap();

    let files: Vec<ContentFile> = (0..20)
        .map(|set| {
            let code = format!("s{set:03}");
            let products = (0..20)
                .map(|n| {
                    let record = json!({
                        "pack": [{"set": code, "code": "draft"}],
                        "card": [{"set": code, "number": "1", "name": "Card 1"}],
                        "deck": [{"set": code, "name": "Starter"}],
                        "card_count": 15,
                    });
                    (format!("Product {n}"), record)
                })
                .collect();
            ContentFile { code, products }
        })
        .collect();

    c.bench_function("compile_20_sets", |b| {
        let compiler = ContentCompiler::new(&index);
        b.iter(|| compiler.compile_all(black_box(&files)));
    });
}

criterion_group!(
    benches,
    benchmark_index_build,
    benchmark_variable_expansion,
    benchmark_compile_all
);
criterion_main!(benches);
