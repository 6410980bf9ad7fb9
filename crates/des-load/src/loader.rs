//! The loader contract and its YAML-backed implementation.

use std::collections::BTreeMap;
use std::path::Path;

use des_core::canonical::stable_hash_string;
use des_core::errors::{DesError, ErrorInfo};
use des_core::provenance::{LoadProvenance, SchemaVersion};
use des_core::{Concentration, Position};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use des_vars::{resolve, DependentVariable, Expr, VariableCatalog, VariableDecl};

use crate::description::{LauncherConfig, RemoteDependency, SimulationDescription};
use crate::environment::{InitializedEnvironment, Node};
use crate::launchers::{BatchLauncher, HeadlessLauncher, Launcher};

/// Schema version for loader snapshots and environments.
pub const SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// An entity able to produce initialized environments by resolving
/// user-supplied variable bindings.
///
/// Every method is a pure query against state fixed at construction time;
/// each environment call resolves fresh and the returned environment is
/// owned exclusively by the caller.
pub trait Loader: Send + Sync {
    /// Produces an environment with the given name/value overrides applied.
    /// Unspecified variables fall back to their declared defaults.
    fn environment_with<T: Concentration, P: Position>(
        &self,
        overrides: &BTreeMap<String, Value>,
    ) -> Result<InitializedEnvironment<T, P>, DesError>;

    /// Produces an environment with every variable at its default value.
    ///
    /// Pure composition: delegates to [`Loader::environment_with`] with an
    /// empty override map, so the two are interchangeable by construction.
    fn default_environment<T: Concentration, P: Position>(
        &self,
    ) -> Result<InitializedEnvironment<T, P>, DesError> {
        self.environment_with(&BTreeMap::new())
    }

    /// Free variable declarations, keyed by name.
    fn variables(&self) -> &BTreeMap<String, VariableDecl>;

    /// Dependent variable definitions, keyed by name.
    fn dependent_variables(&self) -> &BTreeMap<String, DependentVariable>;

    /// Fully resolved constants, keyed by name.
    fn constants(&self) -> &BTreeMap<String, Value>;

    /// Remote dependencies in declaration order.
    fn remote_dependencies(&self) -> &[RemoteDependency];

    /// The launcher associated with this loader.
    fn launcher(&self) -> &dyn Launcher;

    /// Versioned serializable snapshot of the loader state.
    fn snapshot(&self) -> Result<LoaderSnapshot, DesError>;
}

/// Persistable loader state: the description plus its canonical hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderSnapshot {
    /// Schema version for the snapshot payload.
    pub schema_version: SchemaVersion,
    /// The full simulation description.
    pub description: SimulationDescription,
    /// Canonical hash of the description at snapshot time.
    pub input_hash: String,
}

/// Deployment with its content formulas parsed and checked.
#[derive(Debug, Clone)]
struct ParsedDeployment {
    position: Vec<f64>,
    contents: BTreeMap<String, Expr>,
}

/// YAML-backed loader implementation.
///
/// Construction validates the whole description eagerly: catalog invariants,
/// constant evaluation, formula references, deployment contents. After that
/// the loader is read-only and safe to share across threads.
#[derive(Debug)]
pub struct SimulationLoader {
    description: SimulationDescription,
    catalog: VariableCatalog,
    deployments: Vec<ParsedDeployment>,
    input_hash: String,
    launcher: Box<dyn Launcher>,
}

impl SimulationLoader {
    /// Builds a loader from an already parsed description.
    pub fn from_description(description: SimulationDescription) -> Result<Self, DesError> {
        let catalog = VariableCatalog::build(
            description.variables.clone(),
            description.dependent_variables.clone(),
            description.constants.clone(),
        )?;

        let mut deployments = Vec::with_capacity(description.deployments.len());
        for (idx, deployment) in description.deployments.iter().enumerate() {
            let mut contents = BTreeMap::new();
            for (name, formula) in &deployment.contents {
                let expr = des_vars::parse(formula).map_err(|err| match err {
                    DesError::Resolve(info) => DesError::Resolve(
                        info.with_context("deployment", idx.to_string())
                            .with_context("content", name.clone()),
                    ),
                    other => other,
                })?;
                for reference in expr.references() {
                    let declared = catalog.variables().contains_key(&reference)
                        || catalog.dependent_variables().contains_key(&reference)
                        || catalog.constants().contains_key(&reference);
                    if !declared {
                        return Err(DesError::Resolve(
                            ErrorInfo::new(
                                "missing-dependency",
                                "deployment content references an undeclared name",
                            )
                            .with_context("deployment", idx.to_string())
                            .with_context("content", name.clone())
                            .with_context("reference", reference),
                        ));
                    }
                }
                contents.insert(name.clone(), expr);
            }
            deployments.push(ParsedDeployment {
                position: deployment.position.clone(),
                contents,
            });
        }

        let input_hash = stable_hash_string(&description)?;
        let launcher: Box<dyn Launcher> = match &description.launcher {
            LauncherConfig::Headless => Box::new(HeadlessLauncher),
            LauncherConfig::Batch => Box::new(BatchLauncher),
        };

        Ok(Self {
            description,
            catalog,
            deployments,
            input_hash,
            launcher,
        })
    }

    /// Parses and validates a description from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, DesError> {
        Self::from_description(SimulationDescription::from_yaml_str(text)?)
    }

    /// Loads, parses, and validates a description file.
    pub fn load(path: &Path) -> Result<Self, DesError> {
        Self::from_description(SimulationDescription::load(path)?)
    }

    /// Rebuilds a loader from a snapshot, rejecting hash drift.
    pub fn from_snapshot(snapshot: LoaderSnapshot) -> Result<Self, DesError> {
        let recomputed = stable_hash_string(&snapshot.description)?;
        if recomputed != snapshot.input_hash {
            return Err(DesError::Serde(
                ErrorInfo::new(
                    "snapshot-hash-mismatch",
                    "stored description hash does not match its content",
                )
                .with_context("stored", snapshot.input_hash)
                .with_context("recomputed", recomputed)
                .with_hint("the snapshot was edited or truncated; re-snapshot from the source"),
            ));
        }
        Self::from_description(snapshot.description)
    }

    /// The description this loader was built from.
    pub fn description(&self) -> &SimulationDescription {
        &self.description
    }

    /// The validated variable catalog.
    pub fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }

    /// Canonical hash of the description.
    pub fn input_hash(&self) -> &str {
        &self.input_hash
    }

    fn provenance(&self) -> LoadProvenance {
        LoadProvenance {
            input_hash: self.input_hash.clone(),
            description_name: self.description.name.clone(),
            seed: self.description.seed,
            created_at: String::new(),
            tool_versions: [(
                "des-load".to_string(),
                env!("CARGO_PKG_VERSION").to_string(),
            )]
            .into_iter()
            .collect(),
        }
    }
}

impl Loader for SimulationLoader {
    fn environment_with<T: Concentration, P: Position>(
        &self,
        overrides: &BTreeMap<String, Value>,
    ) -> Result<InitializedEnvironment<T, P>, DesError> {
        let resolved = resolve(&self.catalog, overrides)?;
        let scope = resolved.scope();

        let mut nodes = Vec::with_capacity(self.deployments.len());
        for (idx, deployment) in self.deployments.iter().enumerate() {
            let position = P::from_coordinates(&deployment.position).map_err(|err| match err {
                DesError::Environment(info) => {
                    DesError::Environment(info.with_context("deployment", idx.to_string()))
                }
                other => other,
            })?;
            let mut contents = BTreeMap::new();
            for (name, expr) in &deployment.contents {
                let value = expr.eval(&scope)?;
                contents.insert(name.clone(), T::from_value(&value)?);
            }
            nodes.push(Node {
                id: idx as u64,
                position,
                contents,
            });
        }

        Ok(InitializedEnvironment {
            schema_version: SCHEMA_VERSION,
            provenance: self.provenance(),
            seed: self.description.seed,
            variables: resolved.free,
            dependent_variables: resolved.dependent,
            constants: resolved.constants,
            remote_dependencies: self
                .description
                .remote_dependencies
                .iter()
                .map(|dep| dep.path.clone())
                .collect(),
            nodes,
        })
    }

    fn variables(&self) -> &BTreeMap<String, VariableDecl> {
        self.catalog.variables()
    }

    fn dependent_variables(&self) -> &BTreeMap<String, DependentVariable> {
        self.catalog.dependent_variables()
    }

    fn constants(&self) -> &BTreeMap<String, Value> {
        self.catalog.constants()
    }

    fn remote_dependencies(&self) -> &[RemoteDependency] {
        &self.description.remote_dependencies
    }

    fn launcher(&self) -> &dyn Launcher {
        self.launcher.as_ref()
    }

    fn snapshot(&self) -> Result<LoaderSnapshot, DesError> {
        Ok(LoaderSnapshot {
            schema_version: SCHEMA_VERSION,
            description: self.description.clone(),
            input_hash: self.input_hash.clone(),
        })
    }
}
