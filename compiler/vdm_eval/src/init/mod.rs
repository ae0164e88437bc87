//! Static initialization of modules and classes.
//!
//! Modules may refer to each other's values in any order, so initialization
//! is a bounded fixed point: every pass attempts each module that has not
//! yet succeeded, and a module that fails (typically on a name a later
//! module defines) is simply retried on the next pass. Within a module,
//! value definitions are retried the same way until no further progress is
//! made.

use std::sync::Arc;

use tracing::{debug, warn};
use vdm_ir::{Definition, DefinitionKind, GlobalEnv, GlobalKind, Module, ModuleList, Name};
use vdm_patterns::errors::not_in_scope;
use vdm_patterns::{Context, EvalError, FunctionValue, OperationValue, Value};

use crate::Interpreter;

/// Root context construction for a module list.
pub trait ModuleListExt {
    /// A fresh, empty root context for running this specification.
    fn initial_context(&self) -> Context;
}

impl ModuleListExt for ModuleList {
    fn initial_context(&self) -> Context {
        Context::global()
    }
}

/// Result of one module's initialization attempt.
#[derive(Debug)]
pub enum UnitOutcome {
    Succeeded,
    Failed(Vec<EvalError>),
}

/// Summary of a successful initialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitReport {
    /// Passes it took to reach the fixed point.
    pub passes: usize,
    /// Modules and classes in the order they succeeded.
    pub initialized: Vec<Name>,
}

/// Drives module and class initialization to a fixed point.
pub struct StaticInitializer<'a> {
    modules: &'a ModuleList,
    globals: GlobalEnv,
}

impl<'a> StaticInitializer<'a> {
    pub fn new(modules: &'a ModuleList) -> Self {
        StaticInitializer {
            modules,
            globals: GlobalEnv::from_modules(modules),
        }
    }

    /// Initialize every module into the interpreter's root context.
    ///
    /// Runs the hooks' `init` first. On failure, returns one representative
    /// error, preferring anything over "not in scope".
    #[tracing::instrument(level = "debug", skip_all, fields(modules = self.modules.len()))]
    pub fn run(&self, interp: &mut Interpreter) -> Result<InitReport, EvalError> {
        let root = interp.root().clone();
        interp.hooks().init(&root)?;

        let passes = interp.config().init_passes.max(1);
        let mut done = vec![false; self.modules.len()];
        let mut initialized = Vec::new();
        let mut problems = Vec::new();

        for pass in 1..=passes {
            problems.clear();
            for (module, done) in self.modules.iter().zip(done.iter_mut()) {
                if *done {
                    continue;
                }
                match self.attempt(module, interp) {
                    UnitOutcome::Succeeded => {
                        *done = true;
                        initialized.push(module.name);
                    }
                    UnitOutcome::Failed(errors) => problems.extend(errors),
                }
            }
            debug!(pass, problems = problems.len(), "initialization pass");

            if problems.is_empty() {
                return Ok(InitReport {
                    passes: pass,
                    initialized,
                });
            }
            if let [only] = problems.as_slice() {
                if only.is_stack_overflow() {
                    break;
                }
            }
        }

        for problem in &problems {
            warn!(code = problem.number(), %problem, "initialization failed");
        }
        match representative(problems) {
            Some(error) => Err(error),
            None => Ok(InitReport {
                passes,
                initialized,
            }),
        }
    }

    fn attempt(&self, module: &Module, interp: &mut Interpreter) -> UnitOutcome {
        let root = interp.root().clone();
        if let Err(e) = interp.hooks().before_module(module, &root) {
            return UnitOutcome::Failed(vec![e]);
        }

        let scope = root.module_scope(module.name, module.location);
        bind_callables(&module.definitions, &scope);

        let mut pending: Vec<&Definition> = module
            .definitions
            .iter()
            .filter(|d| needs_evaluation(d, module.is_class()))
            .collect();
        let mut errors = Vec::new();
        loop {
            errors.clear();
            let before = pending.len();
            pending.retain(|def| match self.initialize_definition(def, &scope, interp) {
                Ok(()) => false,
                Err(e) => {
                    errors.push(e);
                    true
                }
            });
            if pending.is_empty() {
                break;
            }
            if pending.len() == before {
                debug!(module = %module.name, pending = pending.len(), "module incomplete");
                // The next pass starts from a fresh scope.
                scope.clear();
                return UnitOutcome::Failed(errors);
            }
        }
        interp.adopt_scope(scope.clone());

        if module.is_class() {
            interp
                .classes()
                .register(module.name, module.definitions.clone().into(), scope);
        } else {
            export(module, &scope, &root);
        }
        UnitOutcome::Succeeded
    }

    fn initialize_definition(
        &self,
        def: &Definition,
        scope: &Context,
        interp: &mut Interpreter,
    ) -> Result<(), EvalError> {
        self.evaluate_definition(def, scope, interp)
            .map_err(|e| e.at(def.location))
    }

    /// Evaluate one definition into the module scope.
    fn evaluate_definition(
        &self,
        def: &Definition,
        scope: &Context,
        interp: &mut Interpreter,
    ) -> Result<(), EvalError> {
        match &def.kind {
            DefinitionKind::Value { pattern, expr, .. } => {
                self.check_dependencies(def, scope)?;
                let value = interp.eval_expr(expr, scope)?;
                interp.bind_pattern(pattern, &value, scope)
            }
            DefinitionKind::Rename { target } => {
                let value = scope.lookup(*target).ok_or_else(|| not_in_scope(*target))?;
                scope.bind(def.name, value);
                Ok(())
            }
            DefinitionKind::State(state) => {
                let Some(init) = &state.init else {
                    for field in &state.record.fields {
                        scope.declare(field.tag, Value::Undefined);
                    }
                    return Ok(());
                };
                let value = interp.eval_expr(init, scope)?;
                let record = value.as_record()?;
                for (field, value) in record.ty.fields.iter().zip(&record.fields) {
                    scope.declare(field.tag, value.clone());
                }
                Ok(())
            }
            DefinitionKind::InstanceVariable { init, .. } => {
                let value = match init {
                    Some(init) => interp.eval_expr(init, scope)?,
                    None => Value::Undefined,
                };
                scope.declare(def.name, value);
                Ok(())
            }
            DefinitionKind::Function(_)
            | DefinitionKind::Operation(_)
            | DefinitionKind::Type(_) => Ok(()),
        }
    }

    /// Fail without evaluating when a global value the definition reads is
    /// not bound yet.
    fn check_dependencies(&self, def: &Definition, scope: &Context) -> Result<(), EvalError> {
        let mut missing: Vec<Name> = def
            .free_variables(&self.globals)
            .iter()
            .copied()
            .filter(|name| self.globals.find(*name) == Some(GlobalKind::Value))
            .filter(|name| !scope.is_bound(*name))
            .collect();
        missing.sort_by_key(|name| name.as_str());
        match missing.first() {
            Some(name) => Err(not_in_scope(*name)),
            None => Ok(()),
        }
    }
}

/// Initialize `modules` into the interpreter's root context.
pub fn initialize(modules: &ModuleList, interp: &mut Interpreter) -> Result<InitReport, EvalError> {
    StaticInitializer::new(modules).run(interp)
}

/// The error to report for a failed initialization. Unbound names are
/// usually forward references that never resolved, so anything else is
/// more telling.
fn representative(problems: Vec<EvalError>) -> Option<EvalError> {
    let (unbound, other): (Vec<_>, Vec<_>) =
        problems.into_iter().partition(EvalError::is_not_in_scope);
    other.into_iter().next().or_else(|| unbound.into_iter().next())
}

/// Functions and operations are bound before any value is evaluated, so
/// values may call them regardless of declaration order.
fn bind_callables(defs: &[Definition], scope: &Context) {
    for def in defs {
        match &def.kind {
            DefinitionKind::Function(func) => scope.bind(
                def.name,
                Value::function(FunctionValue::explicit(
                    Arc::clone(func),
                    scope.clone(),
                )),
            ),
            DefinitionKind::Operation(op) => scope.bind(
                def.name,
                Value::operation(OperationValue::new(Arc::clone(op), scope.clone())),
            ),
            _ => {}
        }
    }
}

/// Whether a definition has state to compute at initialization. Instance
/// variables of classes belong to objects unless static.
fn needs_evaluation(def: &Definition, in_class: bool) -> bool {
    match &def.kind {
        DefinitionKind::Value { .. } | DefinitionKind::State(_) | DefinitionKind::Rename { .. } => {
            true
        }
        DefinitionKind::InstanceVariable { .. } => !in_class || def.is_static,
        DefinitionKind::Function(_) | DefinitionKind::Operation(_) | DefinitionKind::Type(_) => {
            false
        }
    }
}

/// Make a module's values, functions, operations and renames visible to
/// every other module.
fn export(module: &Module, scope: &Context, root: &Context) {
    for def in &module.definitions {
        let exported = matches!(
            def.kind,
            DefinitionKind::Value { .. }
                | DefinitionKind::Function(_)
                | DefinitionKind::Operation(_)
                | DefinitionKind::Rename { .. }
        );
        if !exported {
            continue;
        }
        for name in def.defined_names() {
            if let Some(value) = scope.local(name) {
                root.bind(name, value);
            }
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
