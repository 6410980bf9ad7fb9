use des_core::provenance::{LoadProvenance, SchemaVersion};
use des_core::{LaunchJob, LaunchReport};
use serde_json::json;

#[test]
fn launch_report_round_trips_json() {
    let report = LaunchReport {
        schema_version: SchemaVersion::new(1, 0, 0),
        launcher: "headless".into(),
        input_hash: "deadbeef".into(),
        jobs: vec![LaunchJob {
            bindings: json!({"n": 5}),
            seed: 99,
            status: "completed".into(),
            node_count: 3,
            scope_hash: "cafe".into(),
        }],
    };

    let json = serde_json::to_string_pretty(&report).expect("serialize");
    let decoded: LaunchReport = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, report);
}

#[test]
fn provenance_round_trips_json() {
    let provenance = LoadProvenance {
        input_hash: "input".into(),
        description_name: "ring".into(),
        seed: 99,
        created_at: "2026-08-01T00:00:00Z".into(),
        tool_versions: [("des-core".into(), "0.1.0".into())].into_iter().collect(),
    };

    let json = serde_json::to_string_pretty(&provenance).expect("serialize");
    let decoded: LoadProvenance = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, provenance);
}
