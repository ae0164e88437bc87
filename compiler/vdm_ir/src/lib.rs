//! VDM IR - the interpretable tree consumed by the evaluator.
//!
//! The parser and type checker are external collaborators; what arrives
//! here is an already-resolved tree. This crate owns:
//!
//! - `Name` / `StringInterner`: interned identifiers
//! - `Location`: file/line/column source positions used in every diagnostic
//! - `Type`: runtime type descriptors (record shapes, `is_` tests)
//! - `ast`: expressions, statements, patterns, binds, definitions, modules
//! - `visitor`: generic read-only traversal
//! - `free_vars`: the conservative free-variable analysis used by the
//!   static initializer

pub mod ast;
pub mod free_vars;
mod interner;
mod location;
mod name;
mod types;
pub mod visitor;

pub use ast::{
    BinaryOp, BindKind, CaseAlternative, CaseStmtAlternative, Dcl, Definition, DefinitionKind,
    Designator, DesignatorKind, Expr, ExprKind, FunctionDef, Module, ModuleKind, ModuleList,
    MultipleBind, OperationDef, Pattern, PatternKind, StateDef, Stmt, StmtKind, UnaryOp,
};
pub use free_vars::{FreeVariables, GlobalEnv, GlobalKind, LocalEnv, NameSet};
pub use interner::StringInterner;
pub use location::Location;
pub use name::Name;
pub use types::{RecordField, RecordType, Type};
