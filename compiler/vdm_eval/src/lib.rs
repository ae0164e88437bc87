#![allow(
    clippy::result_large_err,
    reason = "EvalError is fundamental; boxing would add indirection across every evaluator path"
)]
//! VDM Eval - tree-walking evaluator for the VDM interpreter.
//!
//! # Architecture
//!
//! - `Interpreter`: expression and statement evaluation over a `Context`
//!   scope chain, built with `InterpreterBuilder`
//! - `HookRegistry`: before/after callbacks around every node, owned by the
//!   session rather than the process
//! - `SuspendCheck`: the suspension point called before every node;
//!   `DebugLink` implements breakpoints, stepping and tracepoints on it
//! - `StaticInitializer`: retrying, dependency-tolerant initialization of
//!   module and class static state
//!
//! Values, contexts and pattern matching come from `vdm_patterns` and are
//! re-exported here for convenience.

mod config;
pub mod debug;
pub mod hooks;
pub mod init;
pub mod interpreter;
#[cfg(test)]
mod test_support;

pub use config::EvalConfig;
pub use debug::{
    BufferTraceCallback, DebugCommand, DebugError, DebugLink, DebugResponse, Evaluate,
    LogTraceCallback, NoSuspend, NodeRef, StopEvent, StopReason, SuspendCheck, SuspendPoint,
    ThreadId, TraceCallback,
};
pub use hooks::{EvalHook, HookError, HookRegistry, SharedHookRegistry};
pub use init::{initialize, InitReport, ModuleListExt, StaticInitializer, UnitOutcome};
pub use interpreter::{ClassTable, Interpreter, InterpreterBuilder};
pub use vdm_patterns::{
    Bindings, Context, EvalError, EvalErrorKind, EvalResult, Heap, Matcher, PatternMismatch,
    Value,
};
pub use vdm_stack::ensure_sufficient_stack;
