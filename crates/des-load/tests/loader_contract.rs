use std::collections::BTreeMap;

use des_core::Euclidean2D;
use des_load::{Loader, SimulationLoader};
use serde_json::{json, Value};

const DESCRIPTION: &str = r#"
name: ring-demo
seed: 2024
variables:
  n:
    default: 10
  radius:
    default: 2
dependent-variables:
  area:
    formula: "pi * radius * radius"
constants:
  pi: "3.0"
remote-dependencies:
  - path: data/topology.csv
  - path: data/weights.csv
deployments:
  - position: [0.0, 0.0]
    contents:
      substrate: "n / 2"
  - position: [1.0, 1.0]
"#;

fn sample_loader() -> SimulationLoader {
    SimulationLoader::from_yaml_str(DESCRIPTION).expect("loader")
}

fn overrides(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn default_equals_empty_overrides() {
    let loader = sample_loader();
    let via_default = loader
        .default_environment::<f64, Euclidean2D>()
        .expect("default");
    let via_empty = loader
        .environment_with::<f64, Euclidean2D>(&BTreeMap::new())
        .expect("empty");
    assert_eq!(via_default, via_empty);
}

#[test]
fn free_and_dependent_catalogs_are_disjoint() {
    let loader = sample_loader();
    for name in loader.variables().keys() {
        assert!(!loader.dependent_variables().contains_key(name));
    }
}

#[test]
fn constants_are_idempotent_reads() {
    let loader = sample_loader();
    let first = loader.constants().clone();
    let second = loader.constants().clone();
    assert_eq!(first, second);
    assert_eq!(first["pi"], json!(3));
}

#[test]
fn remote_dependencies_keep_declaration_order() {
    let loader = sample_loader();
    let first: Vec<String> = loader
        .remote_dependencies()
        .iter()
        .map(|dep| dep.path.clone())
        .collect();
    let second: Vec<String> = loader
        .remote_dependencies()
        .iter()
        .map(|dep| dep.path.clone())
        .collect();
    assert_eq!(first, second);
    assert_eq!(first, vec!["data/topology.csv", "data/weights.csv"]);
}

#[test]
fn override_applies_and_defaults_fall_back() {
    let loader = sample_loader();
    let bound = loader
        .environment_with::<f64, Euclidean2D>(&overrides(&[("n", json!(5))]))
        .expect("bound");
    assert_eq!(bound.variables["n"], json!(5));
    assert_eq!(bound.variables["radius"], json!(2));

    let unbound = loader
        .environment_with::<f64, Euclidean2D>(&BTreeMap::new())
        .expect("unbound");
    assert_eq!(unbound.variables["n"], json!(10));
}

#[test]
fn dependent_tracks_free_and_cannot_be_set() {
    let loader = sample_loader();
    let base = loader
        .default_environment::<f64, Euclidean2D>()
        .expect("base");
    assert_eq!(base.dependent_variables["area"], json!(12));

    let scaled = loader
        .environment_with::<f64, Euclidean2D>(&overrides(&[("radius", json!(3))]))
        .expect("scaled");
    assert_eq!(scaled.dependent_variables["area"], json!(27));

    let err = loader
        .environment_with::<f64, Euclidean2D>(&overrides(&[("area", json!(1))]))
        .unwrap_err();
    assert_eq!(err.info().code, "unknown-variable");
}

#[test]
fn deployments_become_nodes_with_evaluated_contents() {
    let loader = sample_loader();
    let environment = loader
        .default_environment::<f64, Euclidean2D>()
        .expect("environment");
    assert_eq!(environment.nodes.len(), 2);
    assert_eq!(environment.nodes[0].id, 0);
    assert_eq!(environment.nodes[0].position, Euclidean2D::new(0.0, 0.0));
    assert_eq!(environment.nodes[0].contents["substrate"], 5.0);
    assert!(environment.nodes[1].contents.is_empty());
}

#[test]
fn environments_are_independent_instances() {
    let loader = sample_loader();
    let mut first = loader
        .default_environment::<f64, Euclidean2D>()
        .expect("first");
    first.variables.insert("n".to_string(), json!(0));
    let second = loader
        .default_environment::<f64, Euclidean2D>()
        .expect("second");
    assert_eq!(second.variables["n"], json!(10));
}

#[test]
fn value_concentration_passes_through() {
    let loader = sample_loader();
    let environment = loader
        .default_environment::<Value, Euclidean2D>()
        .expect("environment");
    assert_eq!(environment.nodes[0].contents["substrate"], json!(5));
}

#[test]
fn undeclared_deployment_reference_fails_at_build() {
    let text = r#"
name: broken
deployments:
  - position: [0.0, 0.0]
    contents:
      substrate: "ghost + 1"
"#;
    let err = SimulationLoader::from_yaml_str(text).unwrap_err();
    assert_eq!(err.info().code, "missing-dependency");
}
