use std::collections::BTreeMap;

use des_vars::{resolve, DependentDecl, VariableCatalog, VariableDecl};
use serde_json::{json, Value};

fn catalog_with_area() -> VariableCatalog {
    let variables = [(
        "radius".to_string(),
        VariableDecl {
            default: json!(2),
            domain: None,
        },
    )]
    .into_iter()
    .collect();
    let dependent = [(
        "area".to_string(),
        DependentDecl {
            formula: "pi * radius * radius".to_string(),
        },
    )]
    .into_iter()
    .collect();
    let constants = [("pi".to_string(), "3.0".to_string())]
        .into_iter()
        .collect();
    VariableCatalog::build(variables, dependent, constants).expect("catalog")
}

fn overrides(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn defaults_apply_when_unbound() {
    let catalog = catalog_with_area();
    let resolved = resolve(&catalog, &BTreeMap::new()).expect("resolve");
    assert_eq!(resolved.free["radius"], json!(2));
    assert_eq!(resolved.dependent["area"], json!(12));
}

#[test]
fn override_propagates_to_dependents() {
    let catalog = catalog_with_area();
    let resolved = resolve(&catalog, &overrides(&[("radius", json!(3))])).expect("resolve");
    assert_eq!(resolved.free["radius"], json!(3));
    assert_eq!(resolved.dependent["area"], json!(27));
}

#[test]
fn dependent_variables_cannot_be_set() {
    let catalog = catalog_with_area();
    let err = resolve(&catalog, &overrides(&[("area", json!(1))])).unwrap_err();
    assert_eq!(err.info().code, "unknown-variable");
    assert!(err.info().hint.as_deref().unwrap_or("").contains("computed"));
}

#[test]
fn constants_cannot_be_set() {
    let catalog = catalog_with_area();
    let err = resolve(&catalog, &overrides(&[("pi", json!(3.2))])).unwrap_err();
    assert_eq!(err.info().code, "unknown-variable");
}

#[test]
fn unknown_key_is_rejected() {
    let catalog = catalog_with_area();
    let err = resolve(&catalog, &overrides(&[("raduis", json!(3))])).unwrap_err();
    assert_eq!(err.info().code, "unknown-variable");
    assert_eq!(err.info().context["variable"], "raduis");
}

#[test]
fn type_mismatch_is_rejected() {
    let catalog = catalog_with_area();
    let err = resolve(&catalog, &overrides(&[("radius", json!("large"))])).unwrap_err();
    assert_eq!(err.info().code, "type-mismatch");
    assert_eq!(err.info().context["expected"], "number");
    assert_eq!(err.info().context["provided"], "string");
}

#[test]
fn integer_and_float_overrides_both_count_as_numbers() {
    let catalog = catalog_with_area();
    let resolved = resolve(&catalog, &overrides(&[("radius", json!(2.5))])).expect("resolve");
    assert_eq!(resolved.free["radius"], json!(2.5));
}

#[test]
fn free_and_dependent_names_are_disjoint() {
    let catalog = catalog_with_area();
    let frees: Vec<&String> = catalog.variables().keys().collect();
    let deps: Vec<&String> = catalog.dependent_variables().keys().collect();
    assert!(frees.iter().all(|name| !deps.contains(name)));
}

#[test]
fn chained_dependents_resolve_in_order() {
    let variables = [(
        "n".to_string(),
        VariableDecl {
            default: json!(10),
            domain: None,
        },
    )]
    .into_iter()
    .collect();
    let dependent: BTreeMap<String, DependentDecl> = [
        (
            "double".to_string(),
            DependentDecl {
                formula: "n * 2".to_string(),
            },
        ),
        (
            "quadruple".to_string(),
            DependentDecl {
                formula: "double * 2".to_string(),
            },
        ),
    ]
    .into_iter()
    .collect();
    let catalog =
        VariableCatalog::build(variables, dependent, BTreeMap::new()).expect("catalog");
    let resolved = resolve(&catalog, &overrides(&[("n", json!(5))])).expect("resolve");
    assert_eq!(resolved.dependent["double"], json!(10));
    assert_eq!(resolved.dependent["quadruple"], json!(20));
}

#[test]
fn cycles_are_reported_together() {
    let dependent: BTreeMap<String, DependentDecl> = [
        (
            "a".to_string(),
            DependentDecl {
                formula: "b + 1".to_string(),
            },
        ),
        (
            "b".to_string(),
            DependentDecl {
                formula: "a + 1".to_string(),
            },
        ),
    ]
    .into_iter()
    .collect();
    let catalog =
        VariableCatalog::build(BTreeMap::new(), dependent, BTreeMap::new()).expect("catalog");
    let err = resolve(&catalog, &BTreeMap::new()).unwrap_err();
    assert_eq!(err.info().code, "cyclic-dependency");
    assert_eq!(err.info().context["cycle"], "a,b");
}

#[test]
fn name_collision_is_a_build_error() {
    let variables = [(
        "n".to_string(),
        VariableDecl {
            default: json!(1),
            domain: None,
        },
    )]
    .into_iter()
    .collect();
    let dependent = [(
        "n".to_string(),
        DependentDecl {
            formula: "1 + 1".to_string(),
        },
    )]
    .into_iter()
    .collect();
    let err = VariableCatalog::build(variables, dependent, BTreeMap::new()).unwrap_err();
    assert_eq!(err.info().code, "name-collision");
}
