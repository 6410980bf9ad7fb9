use std::collections::BTreeMap;

use des_vars::{resolve, DependentDecl, VariableCatalog, VariableDecl};
use proptest::prelude::*;
use serde_json::json;

fn chain_catalog(depth: usize) -> VariableCatalog {
    let variables = [(
        "seed_value".to_string(),
        VariableDecl {
            default: json!(1),
            domain: None,
        },
    )]
    .into_iter()
    .collect();
    let mut dependent = BTreeMap::new();
    for level in 0..depth {
        let previous = if level == 0 {
            "seed_value".to_string()
        } else {
            format!("level_{}", level - 1)
        };
        dependent.insert(
            format!("level_{level}"),
            DependentDecl {
                formula: format!("{previous} + 1"),
            },
        );
    }
    VariableCatalog::build(variables, dependent, BTreeMap::new()).expect("catalog")
}

proptest! {
    #[test]
    fn resolution_is_deterministic(value in -1.0e6f64..1.0e6f64, depth in 1usize..12) {
        let catalog = chain_catalog(depth);
        let overrides: BTreeMap<String, serde_json::Value> =
            [("seed_value".to_string(), json!(value))].into_iter().collect();
        let first = resolve(&catalog, &overrides).expect("resolve");
        let second = resolve(&catalog, &overrides).expect("resolve");
        prop_assert_eq!(&first, &second);
        let ordered: Vec<&String> = first.dependent.keys().collect();
        let mut sorted = ordered.clone();
        sorted.sort();
        prop_assert_eq!(ordered, sorted);
    }

    #[test]
    fn deep_chains_accumulate(depth in 1usize..16) {
        let catalog = chain_catalog(depth);
        let resolved = resolve(&catalog, &BTreeMap::new()).expect("resolve");
        let last = format!("level_{}", depth - 1);
        prop_assert_eq!(&resolved.dependent[&last], &json!(1 + depth as i64));
    }
}
