//! Report payloads emitted by simulation launchers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::provenance::SchemaVersion;

/// Summary for a single environment built during a launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchJob {
    /// Binding set the environment was resolved with.
    pub bindings: Value,
    /// Deterministic seed assigned to the job.
    pub seed: u64,
    /// Terminal status of the job.
    pub status: String,
    /// Number of nodes deployed in the environment.
    pub node_count: usize,
    /// Canonical hash of the resolved variable scope.
    pub scope_hash: String,
}

/// Aggregate launch report persisted for reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchReport {
    /// Schema version for the report payload.
    pub schema_version: SchemaVersion,
    /// Name of the launcher that produced the report.
    pub launcher: String,
    /// Canonical hash of the simulation description.
    pub input_hash: String,
    /// Per-environment job summaries in execution order.
    pub jobs: Vec<LaunchJob>,
}
