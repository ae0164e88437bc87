//! Evaluation hooks.
//!
//! Tools that want to observe evaluation (tracing, coverage, breakpoint
//! translation) implement [`EvalHook`] and are registered into the
//! session's [`HookRegistry`]. The interpreter calls every live hook before
//! and after each node; the callbacks default to no-ops.
//!
//! Each hook type may also have a one-time kind-level initializer,
//! [`EvalHook::init_kind`]. [`HookRegistry::init`] runs it exactly once per
//! registered type, however many instances exist, and then runs every
//! instance's own [`EvalHook::init`].

use std::any::TypeId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::debug;
use vdm_ir::{Expr, Module, Stmt};
use vdm_patterns::errors::hook_failure;
use vdm_patterns::{Context, EvalError, Value};

/// Failure reported by a hook callback.
///
/// The registry turns it into an `EvalError` (code 4200) naming the hook;
/// it is never swallowed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),
    #[error("initialization failed: {0}")]
    Init(String),
}

/// Callbacks invoked around evaluation.
pub trait EvalHook: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Kind-level setup, run once per `init` for each registered type.
    fn init_kind(_ctx: &Context) -> Result<(), HookError>
    where
        Self: Sized,
    {
        Ok(())
    }

    /// Per-instance setup.
    fn init(&self, _ctx: &Context) -> Result<(), HookError> {
        Ok(())
    }

    fn before_module(&self, _module: &Module, _ctx: &Context) -> Result<(), HookError> {
        Ok(())
    }

    fn before_stmt(&self, _stmt: &Stmt, _ctx: &Context) -> Result<(), HookError> {
        Ok(())
    }

    fn before_expr(&self, _expr: &Expr, _ctx: &Context) -> Result<(), HookError> {
        Ok(())
    }

    fn after_stmt(&self, _stmt: &Stmt, _ctx: &Context, _result: &Value) -> Result<(), HookError> {
        Ok(())
    }

    fn after_expr(&self, _expr: &Expr, _ctx: &Context, _result: &Value) -> Result<(), HookError> {
        Ok(())
    }
}

type KindInit = fn(&Context) -> Result<(), HookError>;

#[derive(Clone, Copy)]
struct HookKind {
    id: TypeId,
    name: &'static str,
    init: KindInit,
}

/// The set of hook kinds and live hook instances for one session.
pub struct HookRegistry {
    kinds: Mutex<Vec<HookKind>>,
    /// Replaced wholesale on registration so dispatch can iterate a
    /// snapshot without holding the lock.
    instances: RwLock<Arc<[Arc<dyn EvalHook>]>>,
    live: AtomicUsize,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry shared between an interpreter session and its tools.
pub type SharedHookRegistry = Arc<HookRegistry>;

impl HookRegistry {
    pub fn new() -> Self {
        HookRegistry {
            kinds: Mutex::new(Vec::new()),
            instances: RwLock::new(Arc::from(Vec::new())),
            live: AtomicUsize::new(0),
        }
    }

    /// Register a hook instance, declaring its kind if this is the first
    /// instance of that type.
    pub fn register<H: EvalHook + 'static>(&self, hook: H) -> Arc<H> {
        let hook = Arc::new(hook);
        {
            let mut kinds = self.kinds.lock();
            let id = TypeId::of::<H>();
            if !kinds.iter().any(|k| k.id == id) {
                kinds.push(HookKind {
                    id,
                    name: std::any::type_name::<H>(),
                    init: H::init_kind,
                });
            }
        }
        let shared: Arc<dyn EvalHook> = hook.clone();
        let mut instances = self.instances.write();
        let mut list = instances.to_vec();
        list.push(shared);
        *instances = Arc::from(list);
        self.live.store(instances.len(), Ordering::Release);
        hook
    }

    /// Forget every kind and instance. Call before each independent run.
    pub fn reset(&self) {
        self.kinds.lock().clear();
        *self.instances.write() = Arc::from(Vec::new());
        self.live.store(0, Ordering::Release);
    }

    /// Run each kind's one-time initializer, then each instance's.
    pub fn init(&self, ctx: &Context) -> Result<(), EvalError> {
        let kinds: Vec<HookKind> = self.kinds.lock().clone();
        for kind in kinds {
            debug!(kind = kind.name, "initializing hook kind");
            (kind.init)(ctx).map_err(|e| hook_failure(kind.name, e))?;
        }
        for hook in self.snapshot().iter() {
            debug!(hook = hook.name(), "initializing hook");
            hook.init(ctx).map_err(|e| hook_failure(hook.name(), e))?;
        }
        Ok(())
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of declared kinds.
    pub fn kind_count(&self) -> usize {
        self.kinds.lock().len()
    }

    fn snapshot(&self) -> Arc<[Arc<dyn EvalHook>]> {
        Arc::clone(&self.instances.read())
    }

    fn dispatch(
        &self,
        mut call: impl FnMut(&dyn EvalHook) -> Result<(), HookError>,
    ) -> Result<(), EvalError> {
        if self.is_empty() {
            return Ok(());
        }
        for hook in self.snapshot().iter() {
            call(hook.as_ref()).map_err(|e| hook_failure(hook.name(), e))?;
        }
        Ok(())
    }

    pub fn before_module(&self, module: &Module, ctx: &Context) -> Result<(), EvalError> {
        self.dispatch(|h| h.before_module(module, ctx))
    }

    pub fn before_stmt(&self, stmt: &Stmt, ctx: &Context) -> Result<(), EvalError> {
        self.dispatch(|h| h.before_stmt(stmt, ctx))
    }

    pub fn before_expr(&self, expr: &Expr, ctx: &Context) -> Result<(), EvalError> {
        self.dispatch(|h| h.before_expr(expr, ctx))
    }

    pub fn after_stmt(&self, stmt: &Stmt, ctx: &Context, result: &Value) -> Result<(), EvalError> {
        self.dispatch(|h| h.after_stmt(stmt, ctx, result))
    }

    pub fn after_expr(&self, expr: &Expr, ctx: &Context, result: &Value) -> Result<(), EvalError> {
        self.dispatch(|h| h.after_expr(expr, ctx, result))
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("kinds", &self.kind_count())
            .field("instances", &self.len())
            .finish()
    }
}
