//! The interpretable tree.
//!
//! One sum type per node category. Nodes are immutable once built; the
//! only interior state is the lazily computed free-variable set cached on
//! each `Definition`.

mod definition;
mod expr;
mod module;
mod pattern;
mod stmt;

pub use definition::{Definition, DefinitionKind, FunctionDef, OperationDef, StateDef};
pub use expr::{BinaryOp, CaseAlternative, Expr, ExprKind, UnaryOp};
pub use module::{Module, ModuleKind, ModuleList};
pub use pattern::{BindKind, MultipleBind, Pattern, PatternKind};
pub use stmt::{CaseStmtAlternative, Dcl, Designator, DesignatorKind, Stmt, StmtKind};

#[cfg(test)]
mod tests;
