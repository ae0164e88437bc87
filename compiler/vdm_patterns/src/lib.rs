#![allow(
    clippy::result_large_err,
    reason = "EvalError is fundamental; boxing would add indirection across every evaluator path"
)]
//! VDM Patterns - runtime values, scopes and pattern matching.
//!
//! This crate provides:
//! - Runtime value types (`Value`, `Heap`, `FunctionValue`, `ObjectValue`, etc.)
//! - Evaluation error types (`EvalError`, `EvalResult`, `PatternMismatch`)
//! - The scope chain (`Context`) and binding environments (`Bindings`)
//! - The pattern matching engine (`Matcher`)
//!
//! # Value Types
//!
//! Compound values are shared, immutable once built, and only constructed
//! through `Value::` factory methods:
//! - `Heap<T>` has a private constructor so every allocation goes through a factory
//! - Thread-safe reference counting via `Arc`
//!
//! # Matching
//!
//! A match produces every binding environment a pattern admits, so set,
//! concatenation and union patterns may yield many. See [`matching`].

mod bindings;
mod context;
pub mod errors;
pub mod matching;
pub mod value;

pub use bindings::Bindings;
pub use context::{AssignError, Context, FrameKind, Mutability};
pub use errors::{
    BacktraceFrame, EvalBacktrace, EvalError, EvalErrorKind, EvalResult, PatternMismatch,
};
pub use matching::{match_pattern, Matcher};
pub use value::{
    FunctionKind, FunctionValue, GroupMember, Heap, ObjectRef, ObjectValue, OperationValue,
    RecordValue, RecursiveGroup, Value, ValueMap, ValueSet,
};
