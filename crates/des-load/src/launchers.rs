//! Launchers: the executable side of a loader.

use des_core::canonical::stable_hash_string;
use des_core::errors::DesError;
use des_core::rng::derive_substream_seed;
use des_core::{Euclidean2D, LaunchJob, LaunchReport};
use serde_json::{json, Value};

use des_exp::expand_bindings;

use crate::loader::{Loader, SimulationLoader, SCHEMA_VERSION};

/// Executes the simulation(s) described by a loader.
pub trait Launcher: Send + Sync + std::fmt::Debug {
    /// Stable launcher name recorded in reports.
    fn name(&self) -> &str;

    /// Builds the environment(s) and returns a deterministic report.
    fn launch(&self, loader: &SimulationLoader) -> Result<LaunchReport, DesError>;
}

/// Builds one environment at default bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessLauncher;

impl Launcher for HeadlessLauncher {
    fn name(&self) -> &str {
        "headless"
    }

    fn launch(&self, loader: &SimulationLoader) -> Result<LaunchReport, DesError> {
        let environment = loader.default_environment::<Value, Euclidean2D>()?;
        let scope_hash = stable_hash_string(&environment.scope())?;
        Ok(LaunchReport {
            schema_version: SCHEMA_VERSION,
            launcher: self.name().to_string(),
            input_hash: loader.input_hash().to_string(),
            jobs: vec![LaunchJob {
                bindings: json!({}),
                seed: environment.seed,
                status: "completed".to_string(),
                node_count: environment.nodes.len(),
                scope_hash,
            }],
        })
    }
}

/// Builds one environment per binding set expanded from declared domains.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchLauncher;

impl Launcher for BatchLauncher {
    fn name(&self) -> &str {
        "batch"
    }

    fn launch(&self, loader: &SimulationLoader) -> Result<LaunchReport, DesError> {
        let master_seed = loader.description().seed;
        let binding_sets = expand_bindings(loader.catalog())?;
        let mut jobs = Vec::with_capacity(binding_sets.len());
        for (idx, bindings) in binding_sets.into_iter().enumerate() {
            let environment = loader.environment_with::<Value, Euclidean2D>(&bindings)?;
            let scope_hash = stable_hash_string(&environment.scope())?;
            jobs.push(LaunchJob {
                bindings: Value::Object(bindings.into_iter().collect()),
                seed: derive_substream_seed(master_seed, idx as u64),
                status: "completed".to_string(),
                node_count: environment.nodes.len(),
                scope_hash,
            });
        }
        Ok(LaunchReport {
            schema_version: SCHEMA_VERSION,
            launcher: self.name().to_string(),
            input_hash: loader.input_hash().to_string(),
            jobs,
        })
    }
}
