//! Variable catalog: free variables, dependent variables, and constants.

use std::collections::{BTreeMap, BTreeSet};

use des_core::errors::{DesError, ErrorInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::expr::{self, number_value, Expr};

/// Admissible values for a free variable, used by batch expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Domain {
    /// Explicit list of admissible values, in declaration order.
    Values {
        /// Candidate values the variable may take during a batch.
        values: Vec<Value>,
    },
    /// Inclusive numeric range stepped from `min` towards `max`.
    Range {
        /// Lower bound, included.
        min: f64,
        /// Upper bound, included when reachable by stepping.
        max: f64,
        /// Positive step between consecutive values.
        step: f64,
    },
}

impl Domain {
    /// Materializes the domain into the ordered list of admissible values.
    pub fn materialize(&self) -> Result<Vec<Value>, DesError> {
        match self {
            Domain::Values { values } => Ok(values.clone()),
            Domain::Range { min, max, step } => {
                let mut out = Vec::new();
                let mut idx = 0u32;
                loop {
                    let value = min + f64::from(idx) * step;
                    if value > max + 1e-9 {
                        break;
                    }
                    out.push(number_value(value));
                    idx += 1;
                }
                Ok(out)
            }
        }
    }

    fn validate(&self, name: &str) -> Result<(), DesError> {
        let invalid = |message: &str| {
            DesError::Variable(
                ErrorInfo::new("domain-invalid", message).with_context("variable", name.to_string()),
            )
        };
        match self {
            Domain::Values { values } => {
                if values.is_empty() {
                    return Err(invalid("value list domain is empty"));
                }
            }
            Domain::Range { min, max, step } => {
                if !step.is_finite() || *step <= 0.0 {
                    return Err(invalid("range step must be positive"));
                }
                if !(min.is_finite() && max.is_finite()) || min > max {
                    return Err(invalid("range bounds must be finite with min <= max"));
                }
            }
        }
        Ok(())
    }
}

/// Declaration of a user-overridable free variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    /// Value used when the caller supplies no override.
    pub default: Value,
    /// Optional admissible-value domain driving batch expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
}

/// Declaration of a variable computed from other variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentDecl {
    /// Formula evaluated against the resolved scope.
    pub formula: String,
}

/// A dependent variable with its parsed formula and reference set.
#[derive(Debug, Clone, PartialEq)]
pub struct DependentVariable {
    /// Source text of the formula, as declared.
    pub formula: String,
    /// Parsed expression tree.
    pub expr: Expr,
    /// Names the formula reads, free and dependent alike.
    pub references: BTreeSet<String>,
}

/// Validated catalog of every name a simulation description declares.
///
/// Construction checks the invariants once; afterwards the catalog is
/// read-only and safe to share across resolution calls.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableCatalog {
    variables: BTreeMap<String, VariableDecl>,
    dependent: BTreeMap<String, DependentVariable>,
    constants: BTreeMap<String, Value>,
}

impl VariableCatalog {
    /// Builds and validates a catalog from raw declarations.
    ///
    /// Enforced invariants: free, dependent, and constant names are pairwise
    /// disjoint; constant formulas reference constants only; dependent
    /// formulas reference declared names only; domains are well formed.
    /// Constants are fully evaluated here, ahead of any binding.
    pub fn build(
        variables: BTreeMap<String, VariableDecl>,
        dependent: BTreeMap<String, DependentDecl>,
        constants: BTreeMap<String, String>,
    ) -> Result<Self, DesError> {
        check_disjoint(&variables, &dependent, &constants)?;
        for (name, decl) in &variables {
            if let Some(domain) = &decl.domain {
                domain.validate(name)?;
            }
        }

        let resolved_constants = evaluate_constants(&constants, &variables, &dependent)?;

        let mut parsed = BTreeMap::new();
        for (name, decl) in &dependent {
            let expr = expr::parse(&decl.formula).map_err(|err| annotate_variable(err, name))?;
            let references = expr.references();
            for reference in &references {
                let declared = variables.contains_key(reference)
                    || dependent.contains_key(reference)
                    || resolved_constants.contains_key(reference);
                if !declared {
                    return Err(DesError::Resolve(
                        ErrorInfo::new(
                            "missing-dependency",
                            "formula references an undeclared name",
                        )
                        .with_context("variable", name.clone())
                        .with_context("reference", reference.clone()),
                    ));
                }
            }
            parsed.insert(
                name.clone(),
                DependentVariable {
                    formula: decl.formula.clone(),
                    expr,
                    references,
                },
            );
        }

        Ok(Self {
            variables,
            dependent: parsed,
            constants: resolved_constants,
        })
    }

    /// Free variable declarations, keyed by name.
    pub fn variables(&self) -> &BTreeMap<String, VariableDecl> {
        &self.variables
    }

    /// Dependent variable definitions, keyed by name.
    pub fn dependent_variables(&self) -> &BTreeMap<String, DependentVariable> {
        &self.dependent
    }

    /// Fully evaluated constants, keyed by name.
    pub fn constants(&self) -> &BTreeMap<String, Value> {
        &self.constants
    }
}

fn annotate_variable(err: DesError, name: &str) -> DesError {
    match err {
        DesError::Resolve(info) => {
            DesError::Resolve(info.with_context("variable", name.to_string()))
        }
        other => other,
    }
}

fn check_disjoint(
    variables: &BTreeMap<String, VariableDecl>,
    dependent: &BTreeMap<String, DependentDecl>,
    constants: &BTreeMap<String, String>,
) -> Result<(), DesError> {
    let mut seen: BTreeMap<&String, &'static str> = BTreeMap::new();
    for name in variables.keys() {
        seen.insert(name, "variable");
    }
    for (name, class) in dependent
        .keys()
        .map(|n| (n, "dependent-variable"))
        .chain(constants.keys().map(|n| (n, "constant")))
    {
        if let Some(existing) = seen.insert(name, class) {
            return Err(DesError::Variable(
                ErrorInfo::new("name-collision", "name declared in more than one section")
                    .with_context("name", name.clone())
                    .with_context("first", existing)
                    .with_context("second", class),
            ));
        }
    }
    Ok(())
}

/// Evaluates constants in dependency order. Constants may reference other
/// constants only; a reference to a free or dependent variable makes the
/// value binding-sensitive and is rejected.
fn evaluate_constants(
    constants: &BTreeMap<String, String>,
    variables: &BTreeMap<String, VariableDecl>,
    dependent: &BTreeMap<String, DependentDecl>,
) -> Result<BTreeMap<String, Value>, DesError> {
    let mut parsed: BTreeMap<String, (Expr, BTreeSet<String>)> = BTreeMap::new();
    for (name, formula) in constants {
        let expr = expr::parse(formula).map_err(|err| annotate_variable(err, name))?;
        let references = expr.references();
        for reference in &references {
            if variables.contains_key(reference) || dependent.contains_key(reference) {
                return Err(DesError::Variable(
                    ErrorInfo::new("constant-impure", "constant depends on a variable")
                        .with_context("constant", name.clone())
                        .with_context("reference", reference.clone())
                        .with_hint("move the declaration to dependent-variables"),
                ));
            }
            if !constants.contains_key(reference) {
                return Err(DesError::Resolve(
                    ErrorInfo::new("missing-dependency", "constant references an undeclared name")
                        .with_context("constant", name.clone())
                        .with_context("reference", reference.clone()),
                ));
            }
        }
        parsed.insert(name.clone(), (expr, references));
    }

    let dependencies: BTreeMap<String, BTreeSet<String>> = parsed
        .iter()
        .map(|(name, (_, refs))| (name.clone(), refs.clone()))
        .collect();
    let order = crate::resolve::topological_order(&dependencies)?;

    let mut resolved = BTreeMap::new();
    for name in order {
        let (expr, _) = &parsed[&name];
        let value = expr.eval(&resolved).map_err(|err| annotate_variable(err, &name))?;
        resolved.insert(name, value);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn range_domain_materializes_inclusively() {
        let domain = Domain::Range {
            min: 1.0,
            max: 2.0,
            step: 0.5,
        };
        let values = domain.materialize().expect("materialize");
        assert_eq!(values, vec![json!(1), json!(1.5), json!(2)]);
    }

    #[test]
    fn empty_value_domain_is_rejected() {
        let variables = [(
            "n".to_string(),
            VariableDecl {
                default: json!(1),
                domain: Some(Domain::Values { values: vec![] }),
            },
        )]
        .into_iter()
        .collect();
        let err =
            VariableCatalog::build(variables, BTreeMap::new(), BTreeMap::new()).unwrap_err();
        assert_eq!(err.info().code, "domain-invalid");
    }

    #[test]
    fn constants_chain_evaluates() {
        let constants = [
            ("tau".to_string(), "2 * pi".to_string()),
            ("pi".to_string(), "3.14159".to_string()),
        ]
        .into_iter()
        .collect();
        let catalog =
            VariableCatalog::build(BTreeMap::new(), BTreeMap::new(), constants).expect("build");
        assert_eq!(catalog.constants()["tau"], json!(6.28318));
    }

    #[test]
    fn constant_referencing_variable_is_impure() {
        let variables = [(
            "n".to_string(),
            VariableDecl {
                default: json!(1),
                domain: None,
            },
        )]
        .into_iter()
        .collect();
        let constants = [("twice".to_string(), "2 * n".to_string())]
            .into_iter()
            .collect();
        let err = VariableCatalog::build(variables, BTreeMap::new(), constants).unwrap_err();
        assert_eq!(err.info().code, "constant-impure");
    }
}
