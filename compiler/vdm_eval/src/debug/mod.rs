//! Suspension points and the debugging collaborator.
//!
//! The interpreter calls [`SuspendCheck::check`] before evaluating every
//! expression and statement. The default, [`NoSuspend`], never pauses.
//! [`DebugLink`] implements breakpoints, stepping, tracepoints and
//! termination on top of the same call: a stopped logical thread blocks
//! inside `check` and serves [`DebugCommand`]s until it is resumed, so no
//! evaluation state is lost while it waits.

mod link;
mod trace;

use std::fmt;

use vdm_ir::{Expr, Location, Stmt};
use vdm_patterns::{Context, EvalError, EvalResult};

pub use link::{
    Breakpoint, DebugCommand, DebugError, DebugLink, DebugResponse, FrameInfo, ScopeInfo,
    StopEvent, StopReason, ThreadInfo, Tracepoint,
};
pub use trace::{BufferTraceCallback, LogTraceCallback, TraceCallback};

/// Identifies one logical thread.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ThreadId(pub u32);

impl ThreadId {
    /// The thread an interpreter runs on unless told otherwise.
    pub const MAIN: ThreadId = ThreadId(0);
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The node about to be evaluated.
#[derive(Copy, Clone, Debug)]
pub enum NodeRef<'a> {
    Expr(&'a Expr),
    Stmt(&'a Stmt),
}

/// Everything a suspension check can see.
#[derive(Copy, Clone, Debug)]
pub struct SuspendPoint<'a> {
    pub thread: ThreadId,
    pub location: Location,
    pub node: NodeRef<'a>,
    pub context: &'a Context,
    /// Call depth of `context`, for step-over and step-out.
    pub depth: usize,
}

/// Evaluation on behalf of a suspended thread: breakpoint conditions,
/// tracepoint guards and `Evaluate` commands.
pub trait Evaluate {
    fn evaluate(&mut self, expr: &Expr, ctx: &Context) -> EvalResult;
}

/// Called before every node.
///
/// Returning an error stops evaluation at this boundary; a terminate
/// request is reported this way.
pub trait SuspendCheck: Send + Sync {
    fn check(&self, point: &SuspendPoint<'_>, eval: &mut dyn Evaluate) -> Result<(), EvalError>;
}

/// Never suspends.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoSuspend;

impl SuspendCheck for NoSuspend {
    #[inline]
    fn check(&self, _point: &SuspendPoint<'_>, _eval: &mut dyn Evaluate) -> Result<(), EvalError> {
        Ok(())
    }
}
