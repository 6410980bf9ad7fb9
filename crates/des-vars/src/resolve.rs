//! Deterministic resolution of a binding set against a catalog.

use std::collections::{BTreeMap, BTreeSet};

use des_core::errors::{DesError, ErrorInfo};
use serde_json::Value;

use crate::catalog::VariableCatalog;

/// Outcome of resolving a binding set: every declared name with its value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBindings {
    /// Free variables, overridden or defaulted.
    pub free: BTreeMap<String, Value>,
    /// Dependent variables, computed in topological order.
    pub dependent: BTreeMap<String, Value>,
    /// Constants, copied from the catalog.
    pub constants: BTreeMap<String, Value>,
}

impl ResolvedBindings {
    /// Merges the three sections into a single evaluation scope.
    pub fn scope(&self) -> BTreeMap<String, Value> {
        let mut scope = self.constants.clone();
        scope.extend(self.free.clone());
        scope.extend(self.dependent.clone());
        scope
    }
}

/// Resolves user overrides against the catalog.
///
/// Unknown override keys and type-mismatched values are hard errors; free
/// variables without an override fall back to their declared default;
/// dependent variables are evaluated in a deterministic topological order.
pub fn resolve(
    catalog: &VariableCatalog,
    overrides: &BTreeMap<String, Value>,
) -> Result<ResolvedBindings, DesError> {
    for (name, value) in overrides {
        let decl = match catalog.variables().get(name) {
            Some(decl) => decl,
            None => return Err(reject_unknown(catalog, name)),
        };
        let expected = json_type(&decl.default);
        let provided = json_type(value);
        if expected != provided {
            return Err(DesError::Variable(
                ErrorInfo::new("type-mismatch", "override value has the wrong type")
                    .with_context("variable", name.clone())
                    .with_context("expected", expected)
                    .with_context("provided", provided),
            ));
        }
    }

    let mut free = BTreeMap::new();
    for (name, decl) in catalog.variables() {
        let value = overrides
            .get(name)
            .cloned()
            .unwrap_or_else(|| decl.default.clone());
        free.insert(name.clone(), value);
    }

    let mut scope = catalog.constants().clone();
    scope.extend(free.clone());

    let dependencies: BTreeMap<String, BTreeSet<String>> = catalog
        .dependent_variables()
        .iter()
        .map(|(name, var)| (name.clone(), var.references.clone()))
        .collect();
    let order = topological_order(&dependencies)?;

    let mut dependent = BTreeMap::new();
    for name in order {
        let var = &catalog.dependent_variables()[&name];
        let value = var.expr.eval(&scope).map_err(|err| match err {
            DesError::Resolve(info) => {
                DesError::Resolve(info.with_context("variable", name.clone()))
            }
            other => other,
        })?;
        scope.insert(name.clone(), value.clone());
        dependent.insert(name, value);
    }

    Ok(ResolvedBindings {
        free,
        dependent,
        constants: catalog.constants().clone(),
    })
}

fn reject_unknown(catalog: &VariableCatalog, name: &str) -> DesError {
    let mut info = ErrorInfo::new("unknown-variable", "override names no free variable")
        .with_context("variable", name.to_string());
    if catalog.dependent_variables().contains_key(name) {
        info = info.with_hint("dependent variables are computed and cannot be set");
    } else if catalog.constants().contains_key(name) {
        info = info.with_hint("constants are fixed and cannot be set");
    }
    DesError::Variable(info)
}

/// Classifies a JSON value for override type checking. Integers and floats
/// both classify as `number`.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Orders names so that every reference is evaluated before its reader.
///
/// Kahn's algorithm with the ready set held in a `BTreeSet`, so ties break
/// lexicographically and the order is total and stable across runs.
/// References outside the key set (free variables, constants) carry no edge.
pub fn topological_order(
    dependencies: &BTreeMap<String, BTreeSet<String>>,
) -> Result<Vec<String>, DesError> {
    let mut in_degree: BTreeMap<&String, usize> = BTreeMap::new();
    let mut readers: BTreeMap<&String, Vec<&String>> = BTreeMap::new();
    for (name, references) in dependencies {
        let internal = references
            .iter()
            .filter(|reference| dependencies.contains_key(*reference));
        let mut degree = 0;
        for reference in internal {
            readers.entry(reference).or_default().push(name);
            degree += 1;
        }
        in_degree.insert(name, degree);
    }

    let mut ready: BTreeSet<&String> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| *name)
        .collect();

    let mut order = Vec::with_capacity(dependencies.len());
    while let Some(name) = ready.iter().next().copied() {
        ready.remove(name);
        order.push(name.clone());
        if let Some(dependents) = readers.get(name) {
            for &reader in dependents {
                if let Some(degree) = in_degree.get_mut(reader) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(reader);
                    }
                }
            }
        }
    }

    if order.len() != dependencies.len() {
        let stuck: Vec<String> = in_degree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(name, _)| name.clone())
            .collect();
        return Err(DesError::Resolve(
            ErrorInfo::new("cyclic-dependency", "dependent variables form a cycle")
                .with_context("cycle", stuck.join(","))
                .with_hint("break the cycle by fixing one of the listed formulas"),
        ));
    }
    Ok(order)
}
