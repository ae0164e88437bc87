//! Tree-walking interpreter for VDM.
//!
//! # Architecture
//!
//! Every node goes through [`Interpreter::eval_expr`] or
//! [`Interpreter::eval_stmt`], which apply the same protocol before
//! dispatching on the node kind:
//!
//! 1. the suspension check (breakpoints, stepping, termination),
//! 2. the hooks' `before_*` callbacks,
//! 3. evaluation proper, stamping any error with the node's location,
//! 4. the hooks' `after_*` callbacks with the result.
//!
//! Helper modules split the node kinds:
//!
//! - `expr` - expressions
//! - `ops` - unary and binary operators on values
//! - `bind` - multiple binds, quantifiers and comprehensions
//! - `apply` - function, operation, sequence and map application
//! - `stmt` - statements
//! - `assign` - assignment through designators
//! - `objects` - classes, `new` and member access
//!
//! # Statement results
//!
//! A statement evaluates to `Value::Void` when control falls through.
//! Anything else (including `Value::VoidReturn` from a bare `return`) is an
//! early exit that enclosing blocks, loops and conditionals pass outward
//! untouched until the operation boundary consumes it.

mod apply;
mod assign;
mod bind;
mod builder;
mod expr;
mod objects;
mod ops;
mod session;
mod stmt;

pub use builder::InterpreterBuilder;
pub use objects::{ClassEntry, ClassTable};

use std::sync::Arc;

use vdm_ir::{Definition, DefinitionKind, Expr, Location, Name, Pattern, Stmt};
use vdm_patterns::errors::{not_in_scope, stack_overflow};
use vdm_patterns::{
    Context, EvalError, EvalResult, GroupMember, Matcher, PatternMismatch, RecursiveGroup, Value,
};
use vdm_stack::{ensure_sufficient_stack, CallDepth};

use crate::debug::{Evaluate, NodeRef, SuspendCheck, SuspendPoint, ThreadId};
use crate::hooks::SharedHookRegistry;
use crate::EvalConfig;
use session::Session;

/// Evaluator for one logical thread.
///
/// Interpreters for different threads share the root context, the class
/// table, the hook registry and the suspension check; each has its own
/// call depth. Static scopes are cleared once the last of them is dropped.
pub struct Interpreter {
    session: Arc<Session>,
    hooks: SharedHookRegistry,
    suspend: Arc<dyn SuspendCheck>,
    config: EvalConfig,
    matcher: Matcher,
    depth: CallDepth,
    thread: ThreadId,
    /// Set while the suspension check runs, so evaluation on its behalf
    /// does not suspend again.
    in_check: bool,
}

impl Interpreter {
    /// An interpreter with default settings and a fresh global context.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// A sibling interpreter for another logical thread.
    pub fn for_thread(&self, thread: ThreadId) -> Interpreter {
        InterpreterBuilder::new()
            .session(Arc::clone(&self.session))
            .hooks(Arc::clone(&self.hooks))
            .suspend(Arc::clone(&self.suspend))
            .config(self.config.clone())
            .thread(thread)
            .build()
    }

    pub fn root(&self) -> &Context {
        &self.session.root
    }

    pub fn hooks(&self) -> &SharedHookRegistry {
        &self.hooks
    }

    pub fn classes(&self) -> &ClassTable {
        &self.session.classes
    }

    /// Keep a module or class scope alive for the rest of the session.
    pub(crate) fn adopt_scope(&self, scope: Context) {
        self.session.adopt(scope);
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// Current number of active applications on this thread.
    pub fn call_depth(&self) -> usize {
        self.depth.current()
    }

    /// Evaluate an expression.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn eval_expr(&mut self, expr: &Expr, ctx: &Context) -> EvalResult {
        ensure_sufficient_stack(|| {
            self.suspension_point(expr.location, NodeRef::Expr(expr), ctx)?;
            self.hooks
                .before_expr(expr, ctx)
                .map_err(|e| e.at(expr.location))?;
            let result = self
                .eval_expr_inner(expr, ctx)
                .map_err(|e| e.at(expr.location))?;
            self.hooks
                .after_expr(expr, ctx, &result)
                .map_err(|e| e.at(expr.location))?;
            Ok(result)
        })
    }

    /// Evaluate a statement. `Value::Void` means control fell through.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn eval_stmt(&mut self, stmt: &Stmt, ctx: &Context) -> EvalResult {
        ensure_sufficient_stack(|| {
            self.suspension_point(stmt.location, NodeRef::Stmt(stmt), ctx)?;
            self.hooks
                .before_stmt(stmt, ctx)
                .map_err(|e| e.at(stmt.location))?;
            let result = self
                .eval_stmt_inner(stmt, ctx)
                .map_err(|e| e.at(stmt.location))?;
            self.hooks
                .after_stmt(stmt, ctx, &result)
                .map_err(|e| e.at(stmt.location))?;
            Ok(result)
        })
    }

    /// Look a global name up and apply it: the entry point for running an
    /// operation or function of an initialized specification.
    pub fn call(&mut self, name: Name, args: Vec<Value>) -> EvalResult {
        let root = self.session.root.clone();
        let callee = root.lookup(name).ok_or_else(|| not_in_scope(name))?;
        self.apply(&callee, args, Location::DUMMY, &root)
    }

    fn suspension_point(
        &mut self,
        location: Location,
        node: NodeRef<'_>,
        ctx: &Context,
    ) -> Result<(), EvalError> {
        if self.in_check {
            return Ok(());
        }
        let suspend = Arc::clone(&self.suspend);
        let point = SuspendPoint {
            thread: self.thread,
            location,
            node,
            context: ctx,
            depth: ctx.call_depth(),
        };
        self.in_check = true;
        let result = suspend.check(&point, self);
        self.in_check = false;
        result
    }

    fn enter_call(&mut self) -> Result<(), EvalError> {
        self.depth
            .enter()
            .map_err(|exceeded| stack_overflow(exceeded.limit))
    }

    /// Bind the names of `pattern` matched against `value` in `scope`,
    /// taking the first environment.
    pub(crate) fn bind_pattern(
        &self,
        pattern: &Pattern,
        value: &Value,
        scope: &Context,
    ) -> Result<(), EvalError> {
        if let Some(name) = pattern.as_identifier() {
            scope.bind(name, value.clone());
            return Ok(());
        }
        let envs = self
            .matcher
            .matches(pattern, value)
            .map_err(PatternMismatch::into_abort)?;
        if let Some(env) = envs.first() {
            scope.bind_all(env);
        }
        Ok(())
    }

    /// Bind the definitions of a `let` in order and return the scope the
    /// body runs in.
    ///
    /// Each value gets a scope nested in the previous one. A run of adjacent
    /// functions and operations becomes one [`RecursiveGroup`]: its members
    /// close over the scope before the run and may call each other.
    fn bind_definitions(
        &mut self,
        defs: &[Definition],
        location: Location,
        ctx: &Context,
    ) -> Result<Context, EvalError> {
        let mut scope = ctx.clone();
        let mut run = Vec::new();
        for def in defs {
            match &def.kind {
                DefinitionKind::Value { pattern, expr, .. } => {
                    scope = bind_group(std::mem::take(&mut run), scope, location);
                    let value = self.eval_expr(expr, &scope)?;
                    let next = scope.child_scope("let", location);
                    self.bind_pattern(pattern, &value, &next)?;
                    scope = next;
                }
                DefinitionKind::Function(func) => run.push(GroupMember::Function(Arc::clone(func))),
                DefinitionKind::Operation(op) => run.push(GroupMember::Operation(Arc::clone(op))),
                DefinitionKind::Type(_)
                | DefinitionKind::InstanceVariable { .. }
                | DefinitionKind::State(_)
                | DefinitionKind::Rename { .. } => {}
            }
        }
        Ok(bind_group(run, scope, location))
    }
}

/// A scope holding `members` as a group closing over `scope`.
fn bind_group(members: Vec<GroupMember>, scope: Context, location: Location) -> Context {
    if members.is_empty() {
        return scope;
    }
    let group = RecursiveGroup::new(members);
    let next = scope.child_scope("let", location);
    group.bind_members(&scope, &next);
    next
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluate for Interpreter {
    fn evaluate(&mut self, expr: &Expr, ctx: &Context) -> EvalResult {
        self.eval_expr(expr, ctx)
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("thread", &self.thread)
            .field("static_scopes", &self.session.scope_count())
            .field("depth", &self.depth.current())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
