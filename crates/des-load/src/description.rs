//! YAML schema for simulation descriptions.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use des_core::errors::{DesError, ErrorInfo};
use serde::{Deserialize, Serialize};

use des_vars::{DependentDecl, VariableDecl};

/// External resource referenced by a simulation description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDependency {
    /// Path of the resource, relative to the description file.
    pub path: String,
    /// Optional expected SHA-256 digest, lowercase hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Initial placement of a node with its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Coordinates handed to the caller-chosen position type.
    pub position: Vec<f64>,
    /// Content formulas evaluated against the resolved scope, keyed by name.
    #[serde(default)]
    pub contents: BTreeMap<String, String>,
}

/// Launcher selection for this description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LauncherConfig {
    /// Single environment at default bindings.
    #[default]
    Headless,
    /// One environment per binding set expanded from declared domains.
    Batch,
}

/// Declarative description of a simulation, parsed from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulationDescription {
    /// Human readable scenario name.
    pub name: String,
    /// Master deterministic seed for the scenario.
    #[serde(default)]
    pub seed: u64,
    /// Free variable declarations, keyed by name.
    #[serde(default)]
    pub variables: BTreeMap<String, VariableDecl>,
    /// Dependent variable declarations, keyed by name.
    #[serde(default)]
    pub dependent_variables: BTreeMap<String, DependentDecl>,
    /// Constant formulas, keyed by name.
    #[serde(default)]
    pub constants: BTreeMap<String, String>,
    /// External resources in declaration order.
    #[serde(default)]
    pub remote_dependencies: Vec<RemoteDependency>,
    /// Initial node placements.
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    /// Launcher selection.
    #[serde(default)]
    pub launcher: LauncherConfig,
}

impl SimulationDescription {
    /// Parses a description from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, DesError> {
        serde_yaml::from_str(text).map_err(|err| {
            DesError::Serde(ErrorInfo::new("description-parse", err.to_string()))
        })
    }

    /// Loads and parses a description file.
    pub fn load(path: &Path) -> Result<Self, DesError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            DesError::Io(
                ErrorInfo::new("description-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            DesError::Serde(info) => {
                DesError::Serde(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }
}
