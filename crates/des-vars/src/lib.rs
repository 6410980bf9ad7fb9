//! Variable catalog and dependency resolution for DES simulation descriptions.

mod catalog;
mod expr;
mod resolve;

pub use catalog::{
    DependentDecl, DependentVariable, Domain, VariableCatalog, VariableDecl,
};
pub use expr::{number_value, parse, BinaryOp, Expr, Func};
pub use resolve::{json_type, resolve, topological_order, ResolvedBindings};
