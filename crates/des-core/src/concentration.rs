//! Concentration conversion trait and reference implementations.

use serde_json::Value;

use crate::errors::{DesError, ErrorInfo};

/// Caller-chosen representation for node contents.
///
/// Deployment contents are evaluated to JSON scalars; the concentration type
/// decides how the resolved scalar is represented inside the environment.
pub trait Concentration: Sized + Clone + PartialEq + std::fmt::Debug + Send + Sync {
    /// Converts a resolved value into this concentration representation.
    fn from_value(value: &Value) -> Result<Self, DesError>;
}

impl Concentration for f64 {
    fn from_value(value: &Value) -> Result<Self, DesError> {
        value.as_f64().ok_or_else(|| {
            DesError::Environment(
                ErrorInfo::new("concentration-numeric", "expected a numeric concentration")
                    .with_context("value", value.to_string()),
            )
        })
    }
}

impl Concentration for Value {
    fn from_value(value: &Value) -> Result<Self, DesError> {
        Ok(value.clone())
    }
}
