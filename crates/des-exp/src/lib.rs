//! Batch expansion: deterministic grids over declared free-variable domains.

use std::collections::BTreeMap;

use des_core::errors::{DesError, ErrorInfo};
use des_core::rng::derive_substream_seed;
use des_core::stable_hash_string;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use des_vars::{resolve, VariableCatalog};

/// Summary for each binding set resolved during a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJobReport {
    /// Binding set the job resolved with.
    pub bindings: Value,
    /// Substream seed derived from the master seed and the job index.
    pub seed: u64,
    /// Terminal status of the job.
    pub status: String,
    /// Relative directory for the job's artifacts.
    pub out_dir: String,
    /// Canonical hash of the fully resolved scope.
    pub scope_hash: String,
}

/// Aggregate batch report persisted for reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Canonical hash of the expanded plan and master seed.
    pub plan_hash: String,
    /// Per-binding-set job summaries in expansion order.
    pub jobs: Vec<BatchJobReport>,
    /// Aggregate metrics for quick inspection.
    #[serde(default)]
    pub metrics: Value,
}

/// Expands the catalog's declared domains into the ordered list of binding
/// sets.
///
/// Variables are visited in name order; a variable's admissible values keep
/// their declared order; variables without a domain stay at their default and
/// contribute no axis. A catalog with no domains expands to the single empty
/// binding set.
pub fn expand_bindings(catalog: &VariableCatalog) -> Result<Vec<BTreeMap<String, Value>>, DesError> {
    let mut axes: Vec<(String, Vec<Value>)> = Vec::new();
    for (name, decl) in catalog.variables() {
        if let Some(domain) = &decl.domain {
            axes.push((name.clone(), domain.materialize()?));
        }
    }
    let mut outputs = Vec::new();
    expand_axes(&axes, 0, BTreeMap::new(), &mut outputs);
    Ok(outputs)
}

fn expand_axes(
    axes: &[(String, Vec<Value>)],
    idx: usize,
    current: BTreeMap<String, Value>,
    outputs: &mut Vec<BTreeMap<String, Value>>,
) {
    if idx == axes.len() {
        outputs.push(current);
        return;
    }
    let (name, values) = &axes[idx];
    for value in values {
        let mut next = current.clone();
        next.insert(name.clone(), value.clone());
        expand_axes(axes, idx + 1, next, outputs);
    }
}

/// Resolves every expanded binding set and produces a deterministic report.
///
/// Job seeds are substreams of `master_seed`; equal catalog and seed yield a
/// byte-identical report.
pub fn batch(catalog: &VariableCatalog, master_seed: u64) -> Result<BatchReport, DesError> {
    let binding_sets = expand_bindings(catalog)?;
    let plan: Vec<(&String, Vec<Value>)> = catalog
        .variables()
        .iter()
        .filter_map(|(name, decl)| {
            decl.domain
                .as_ref()
                .map(|domain| domain.materialize().map(|values| (name, values)))
        })
        .collect::<Result<_, _>>()?;
    let plan_hash = stable_hash_string(&(&plan, master_seed))?;

    let mut jobs = Vec::with_capacity(binding_sets.len());
    for (idx, bindings) in binding_sets.into_iter().enumerate() {
        let resolved = resolve(catalog, &bindings)?;
        let scope_hash = stable_hash_string(&resolved.scope())?;
        let bindings_value = serde_json::to_value(&bindings)
            .map_err(|err| DesError::Serde(ErrorInfo::new("json-encode", err.to_string())))?;
        jobs.push(BatchJobReport {
            bindings: bindings_value,
            seed: derive_substream_seed(master_seed, idx as u64),
            status: "completed".to_string(),
            out_dir: format!("job_{:04}", idx),
            scope_hash,
        });
    }
    let metrics = json!({
        "jobs": jobs.len(),
    });

    Ok(BatchReport {
        plan_hash,
        jobs,
        metrics,
    })
}
