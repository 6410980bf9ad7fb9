use des_load::{Loader, SimulationLoader};

const HEADLESS: &str = r#"
name: headless-demo
seed: 11
variables:
  n:
    default: 10
deployments:
  - position: [0.0, 0.0]
  - position: [2.0, 2.0]
"#;

const BATCH: &str = r#"
name: batch-demo
seed: 11
variables:
  n:
    default: 10
    domain:
      type: values
      values: [5, 10, 20]
dependent-variables:
  twice:
    formula: "n * 2"
launcher:
  type: batch
"#;

#[test]
fn headless_launch_reports_one_job() {
    let loader = SimulationLoader::from_yaml_str(HEADLESS).expect("loader");
    assert_eq!(loader.launcher().name(), "headless");
    let report = loader.launcher().launch(&loader).expect("launch");
    assert_eq!(report.jobs.len(), 1);
    assert_eq!(report.jobs[0].node_count, 2);
    assert_eq!(report.jobs[0].seed, 11);
    assert_eq!(report.input_hash, loader.input_hash());
}

#[test]
fn batch_launch_reports_one_job_per_domain_value() {
    let loader = SimulationLoader::from_yaml_str(BATCH).expect("loader");
    assert_eq!(loader.launcher().name(), "batch");
    let report = loader.launcher().launch(&loader).expect("launch");
    assert_eq!(report.jobs.len(), 3);

    let hashes: Vec<&String> = report.jobs.iter().map(|job| &job.scope_hash).collect();
    let mut unique = hashes.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), hashes.len());
}

#[test]
fn launch_reports_are_deterministic() {
    let loader = SimulationLoader::from_yaml_str(BATCH).expect("loader");
    let first = loader.launcher().launch(&loader).expect("first");
    let second = loader.launcher().launch(&loader).expect("second");
    assert_eq!(first, second);
}
