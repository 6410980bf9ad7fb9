//! The fully resolved environment produced by a loader.

use std::collections::BTreeMap;

use des_core::provenance::{LoadProvenance, SchemaVersion};
use des_core::{Concentration, Position};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A deployed node with its position and contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node<T, P> {
    /// Stable node identifier, assigned in deployment order.
    pub id: u64,
    /// Position in the caller-chosen space.
    pub position: P,
    /// Contents keyed by name, in the caller-chosen representation.
    pub contents: BTreeMap<String, T>,
}

/// Complete resolved simulation state for one binding set.
///
/// Generic over the concentration representation `T` and the position space
/// `P`; both are chosen by the caller at resolution time. Two environments
/// compare equal exactly when every observable field matches, which is the
/// equality contract the loader guarantees between an empty-override
/// resolution and a default resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializedEnvironment<T, P> {
    /// Schema version for the environment payload.
    pub schema_version: SchemaVersion,
    /// Provenance linking the environment to its description.
    pub provenance: LoadProvenance,
    /// Master seed declared by the description.
    pub seed: u64,
    /// Free variables after override/default resolution.
    pub variables: BTreeMap<String, Value>,
    /// Dependent variables, computed from the free variables.
    pub dependent_variables: BTreeMap<String, Value>,
    /// Constants, independent of any binding.
    pub constants: BTreeMap<String, Value>,
    /// Remote dependency paths in declaration order.
    pub remote_dependencies: Vec<String>,
    /// Deployed nodes in declaration order.
    pub nodes: Vec<Node<T, P>>,
}

impl<T: Concentration, P: Position> InitializedEnvironment<T, P> {
    /// Merges variables, dependent variables, and constants into one scope.
    pub fn scope(&self) -> BTreeMap<String, Value> {
        let mut scope = self.constants.clone();
        scope.extend(self.variables.clone());
        scope.extend(self.dependent_variables.clone());
        scope
    }
}
