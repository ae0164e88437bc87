//! `InterpreterBuilder` for assembling an [`Interpreter`].

use std::sync::Arc;

use vdm_patterns::{Context, Matcher};
use vdm_stack::CallDepth;

use super::session::Session;
use super::{ClassTable, Interpreter};
use crate::debug::{NoSuspend, SuspendCheck, ThreadId};
use crate::hooks::{HookRegistry, SharedHookRegistry};
use crate::EvalConfig;

/// Builder for interpreters.
///
/// Everything is optional: without a root context a fresh global one is
/// created, without hooks an empty registry is used, and without a
/// suspension check evaluation never pauses.
#[derive(Default)]
pub struct InterpreterBuilder {
    root: Option<Context>,
    hooks: Option<SharedHookRegistry>,
    suspend: Option<Arc<dyn SuspendCheck>>,
    classes: Option<ClassTable>,
    session: Option<Arc<Session>>,
    config: EvalConfig,
    thread: ThreadId,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The global context names resolve against last. The interpreter
    /// clears it when it and every sibling from
    /// [`Interpreter::for_thread`] have been dropped.
    #[must_use]
    pub fn root(mut self, root: Context) -> Self {
        self.root = Some(root);
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: SharedHookRegistry) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// The collaborator consulted before every node.
    #[must_use]
    pub fn suspend(mut self, suspend: Arc<dyn SuspendCheck>) -> Self {
        self.suspend = Some(suspend);
        self
    }

    #[must_use]
    pub fn classes(mut self, classes: ClassTable) -> Self {
        self.classes = Some(classes);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Join an existing session instead of starting one; `root` and
    /// `classes` are then ignored.
    #[must_use]
    pub(super) fn session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// The logical thread the interpreter runs on.
    #[must_use]
    pub fn thread(mut self, thread: ThreadId) -> Self {
        self.thread = thread;
        self
    }

    pub fn build(self) -> Interpreter {
        let matcher = Matcher::new().with_dedupe(self.config.dedupe_bindings);
        let session = match self.session {
            Some(session) => session,
            None => Arc::new(Session::new(
                self.root.unwrap_or_else(Context::global),
                self.classes.unwrap_or_default(),
            )),
        };
        Interpreter {
            session,
            hooks: self
                .hooks
                .unwrap_or_else(|| Arc::new(HookRegistry::new())),
            suspend: self.suspend.unwrap_or_else(|| Arc::new(NoSuspend)),
            depth: CallDepth::new(self.config.max_call_depth),
            config: self.config,
            matcher,
            thread: self.thread,
            in_check: false,
        }
    }
}
