mod common;

use common::{FLAG, loader, seeded};
use loot_core::convert::NodeKind;
use loot_core::{ConversionContext, ConversionError, GenerationContext, LootContext, LootTable};
use serde_json::json;

fn canonical_table() -> serde_json::Value {
    json!({
        "pools": [
            {
                "rolls": { "type": "const", "value": 2.0 },
                "entries": [
                    {
                        "type": "token",
                        "name": "gem",
                        "weight": 3,
                        "functions": [{ "type": "suffix", "suffix": "!" }]
                    },
                    {
                        "type": "alternatives",
                        "children": [
                            {
                                "type": "token",
                                "name": "rare",
                                "conditions": [{ "type": "flag_set", "expected": true }]
                            },
                            { "type": "token", "name": "common", "quality": 2 }
                        ]
                    }
                ],
                "functions": [
                    {
                        "type": "suffix",
                        "suffix": "*",
                        "conditions": [{ "type": "flag_set", "expected": false }]
                    }
                ]
            },
            {
                "rolls": { "type": "const", "value": 1.0 },
                "bonus_rolls": { "type": "const", "value": 0.5 },
                "entries": [
                    {
                        "type": "group",
                        "children": [{ "type": "token", "name": "coin" }],
                        "conditions": [{ "type": "flag_set", "expected": true }]
                    },
                    { "type": "token", "name": "dust" }
                ]
            }
        ],
        "functions": [{ "type": "suffix", "suffix": "." }]
    })
}

#[test]
fn canonical_tables_round_trip() {
    let loader = loader();
    let ctx = loader.conversion_context();
    let document = canonical_table();

    let table = LootTable::deserialize(&document, &ctx).unwrap();
    assert_eq!(table.pools().len(), 2);
    assert_eq!(table.serialize(&ctx).unwrap(), document);

    let again = LootTable::deserialize(&table.serialize(&ctx).unwrap(), &ctx).unwrap();
    assert_eq!(again.serialize(&ctx).unwrap(), document);
}

#[test]
fn shorthand_nodes_use_default_deserializers() {
    let loader = loader();
    let ctx = loader.conversion_context();
    let document = json!({
        "pools": [{ "rolls": 2, "entries": ["apple", { "type": "token", "name": "pear" }] }]
    });

    let table = LootTable::deserialize(&document, &ctx).unwrap();
    assert_eq!(
        table.serialize(&ctx).unwrap(),
        json!({
            "pools": [{
                "rolls": { "type": "const", "value": 2.0 },
                "entries": [
                    { "type": "token", "name": "apple" },
                    { "type": "token", "name": "pear" }
                ]
            }]
        })
    );
}

#[test]
fn failures_name_the_element() {
    let loader = loader();
    let ctx = loader.conversion_context();
    let document = json!({
        "pools": [{
            "rolls": 1,
            "entries": [
                "fine",
                {
                    "type": "group",
                    "children": [{
                        "type": "token",
                        "name": "bad",
                        "conditions": [{ "type": "unknown_key" }]
                    }]
                }
            ]
        }]
    });

    let err = LootTable::deserialize(&document, &ctx).unwrap_err();
    assert_eq!(
        err.path(),
        Some("pools[0].entries[1].children[0].conditions[0]")
    );
    assert_eq!(
        err.root_cause(),
        &ConversionError::NoConverter {
            category: "conditions",
            key: "unknown_key".to_string(),
        }
    );
}

#[test]
fn missing_rolls_is_reported() {
    let loader = loader();
    let ctx = loader.conversion_context();
    let document = json!({ "pools": [{ "entries": ["a"] }] });

    let err = LootTable::deserialize(&document, &ctx).unwrap_err();
    assert_eq!(err.path(), Some("pools[0].rolls"));
    assert!(matches!(
        err.root_cause(),
        ConversionError::ExpectedValue { found: NodeKind::Null, .. }
    ));
}

#[test]
fn unmatched_shapes_fail_without_default() {
    let loader = loader();
    let ctx = loader.conversion_context();

    // conditions have no default deserializer
    let document = json!({
        "pools": [{ "rolls": 1, "entries": [{ "type": "token", "name": "a", "conditions": [true] }] }]
    });
    let err = LootTable::deserialize(&document, &ctx).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        ConversionError::ExpectedValue { category: "conditions", found: NodeKind::Boolean, .. }
    ));

    let err = LootTable::deserialize(&json!([]), &ctx).unwrap_err();
    assert!(matches!(err, ConversionError::ShapeMismatch { expected: "map", .. }));
}

#[test]
fn deserialized_tables_generate() {
    let loader = loader();
    let ctx = loader.conversion_context();
    let table = LootTable::deserialize(&canonical_table(), &ctx).unwrap();

    let plain = table.generate(&seeded(5)).unwrap();
    // two rolls of pool 0 and one of pool 1
    assert_eq!(plain.len(), 3);
    assert!(plain.iter().all(|item| item.ends_with('.')));
    assert!(!plain.iter().any(|item| item.starts_with("rare") || item.starts_with("coin")));

    let flagged = GenerationContext::builder()
        .seed(5)
        .with_information(&FLAG, true)
        .build()
        .unwrap();
    let items = table.generate(&flagged).unwrap();
    assert!(items.iter().all(|item| !item.contains('*')));
}

#[test]
fn conversion_context_carries_facts() {
    let loader = loader();
    let ctx = ConversionContext::builder()
        .loader(&loader)
        .with_information(&FLAG, true)
        .build()
        .unwrap();

    assert_eq!(ctx.assure(&FLAG).unwrap(), &true);
    assert_eq!(ctx.loader().entries().element_name(), "type");
}
