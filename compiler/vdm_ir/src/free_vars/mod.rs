//! Free-variable analysis.
//!
//! Computes a conservative approximation of the global names an expression
//! reads when evaluated. The static initializer uses it to tell whether a
//! value definition can be attempted yet.
//!
//! Only unconditionally evaluated sub-expressions contribute: the right
//! operand of a boolean connective, the branches of `if` and `cases`, the
//! body of a lambda and the element of a comprehension may never run, so
//! they are ignored. Names introduced by local binding forms shadow globals
//! while their scope is analyzed.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::{
    BindKind, Definition, DefinitionKind, Expr, ExprKind, Module, ModuleList, MultipleBind,
    Pattern,
};
use crate::Name;

pub type NameSet = FxHashSet<Name>;

/// What a global name refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GlobalKind {
    Value,
    Function,
    Operation,
    Type,
    State,
    InstanceVariable,
    /// Alias for another definition's name.
    Rename(Name),
}

/// The global (module and class level) names visible to the analysis.
#[derive(Clone, Debug, Default)]
pub struct GlobalEnv {
    names: FxHashMap<Name, GlobalKind>,
}

impl GlobalEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_modules(modules: &ModuleList) -> Self {
        let mut env = Self::new();
        for module in modules {
            env.add_module(module);
        }
        env
    }

    pub fn add_module(&mut self, module: &Module) {
        for def in &module.definitions {
            self.add_definition(def);
        }
    }

    pub fn add_definition(&mut self, def: &Definition) {
        let kind = match &def.kind {
            DefinitionKind::Value { .. } => GlobalKind::Value,
            DefinitionKind::Function(_) => GlobalKind::Function,
            DefinitionKind::Operation(_) => GlobalKind::Operation,
            DefinitionKind::Type(_) => GlobalKind::Type,
            DefinitionKind::State(_) => GlobalKind::State,
            DefinitionKind::InstanceVariable { .. } => GlobalKind::InstanceVariable,
            DefinitionKind::Rename { target } => GlobalKind::Rename(*target),
        };
        for name in def.defined_names() {
            self.names.insert(name, kind);
        }
        if let DefinitionKind::State(state) = &def.kind {
            self.names.insert(state.record.name, GlobalKind::Type);
        }
    }

    pub fn insert(&mut self, name: Name, kind: GlobalKind) {
        self.names.insert(name, kind);
    }

    pub fn find(&self, name: Name) -> Option<GlobalKind> {
        self.names.get(&name).copied()
    }
}

/// Names bound by enclosing local scopes.
///
/// Scopes nest strictly, so a flat stack truncated on scope exit is enough.
#[derive(Clone, Debug, Default)]
pub struct LocalEnv {
    names: Vec<Name>,
}

impl LocalEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names(names: impl IntoIterator<Item = Name>) -> Self {
        LocalEnv {
            names: names.into_iter().collect(),
        }
    }

    pub fn contains(&self, name: Name) -> bool {
        self.names.contains(&name)
    }

    fn mark(&self) -> usize {
        self.names.len()
    }

    fn reset(&mut self, mark: usize) {
        self.names.truncate(mark);
    }

    fn push_pattern(&mut self, pattern: &Pattern) {
        self.names.extend(pattern.bound_names());
    }

    fn push_binds(&mut self, binds: &[MultipleBind]) {
        for bind in binds {
            for p in &bind.patterns {
                self.push_pattern(p);
            }
        }
    }
}

/// Free variables of `expr` given the enclosing local scope.
pub fn free_variables(expr: &Expr, globals: &GlobalEnv, locals: &LocalEnv) -> NameSet {
    let mut locals = locals.clone();
    FreeVariables::new(globals).expr(expr, &mut locals)
}

/// The analyzer. Holds the global environment; locals are threaded through.
pub struct FreeVariables<'g> {
    globals: &'g GlobalEnv,
}

impl<'g> FreeVariables<'g> {
    pub fn new(globals: &'g GlobalEnv) -> Self {
        FreeVariables { globals }
    }

    /// Free variables of a definition analyzed in `locals`.
    pub fn definition(&self, def: &Definition, locals: &mut LocalEnv) -> NameSet {
        match &def.kind {
            DefinitionKind::Value { expr, .. } => self.expr(expr, locals),
            DefinitionKind::InstanceVariable {
                init: Some(init), ..
            } => self.expr(init, locals),
            DefinitionKind::State(state) => state
                .init
                .as_ref()
                .map(|init| self.expr(init, locals))
                .unwrap_or_default(),
            // Function and operation bodies are only evaluated when called.
            _ => NameSet::default(),
        }
    }

    pub fn expr(&self, expr: &Expr, locals: &mut LocalEnv) -> NameSet {
        let mut names = NameSet::default();
        self.collect(expr, locals, &mut names);
        names
    }

    fn variable(&self, name: Name, locals: &LocalEnv, out: &mut NameSet) {
        if locals.contains(name) {
            return;
        }
        match self.globals.find(name) {
            None | Some(GlobalKind::Function) => {}
            Some(GlobalKind::Rename(target)) => {
                if self.globals.find(target) != Some(GlobalKind::Function) {
                    out.insert(target);
                }
            }
            Some(_) => {
                out.insert(name);
            }
        }
    }

    fn bind(&self, bind: &MultipleBind, locals: &mut LocalEnv, out: &mut NameSet) {
        match &bind.kind {
            BindKind::Set(e) | BindKind::Seq(e) => self.collect(e, locals, out),
            BindKind::Type(_) => {}
        }
    }

    fn collect(&self, expr: &Expr, locals: &mut LocalEnv, out: &mut NameSet) {
        match &expr.kind {
            ExprKind::Var(name) => self.variable(*name, locals, out),

            ExprKind::Apply { root, args } => {
                match &root.kind {
                    ExprKind::Var(name) if !locals.contains(*name) => {
                        if self.globals.find(*name) == Some(GlobalKind::Function) {
                            out.insert(*name);
                        } else {
                            self.variable(*name, locals, out);
                        }
                    }
                    _ => self.collect(root, locals, out),
                }
                for arg in args {
                    self.collect(arg, locals, out);
                }
            }

            ExprKind::Binary { op, left, right } => {
                self.collect(left, locals, out);
                if !op.is_boolean() {
                    self.collect(right, locals, out);
                }
            }
            ExprKind::If { cond, .. } => self.collect(cond, locals, out),
            ExprKind::Cases { selector, .. } => self.collect(selector, locals, out),
            ExprKind::Lambda { .. } => {}

            ExprKind::Exists { binds, predicate } | ExprKind::Forall { binds, predicate } => {
                let mark = locals.mark();
                locals.push_binds(binds);
                self.collect(predicate, locals, out);
                for b in binds {
                    self.bind(b, locals, out);
                }
                locals.reset(mark);
            }
            ExprKind::Exists1 { bind, predicate } | ExprKind::Iota { bind, predicate } => {
                let mark = locals.mark();
                locals.push_binds(std::slice::from_ref(bind));
                self.collect(predicate, locals, out);
                self.bind(bind, locals, out);
                locals.reset(mark);
            }
            ExprKind::LetBeSt {
                bind,
                predicate,
                body,
            } => {
                let mark = locals.mark();
                locals.push_binds(std::slice::from_ref(bind));
                self.bind(bind, locals, out);
                if let Some(p) = predicate {
                    self.collect(p, locals, out);
                }
                self.collect(body, locals, out);
                locals.reset(mark);
            }

            ExprKind::Let { defs, body } => {
                let mark = locals.mark();
                for def in defs {
                    if def.is_function() {
                        continue;
                    }
                    locals.names.extend(def.defined_names());
                    out.extend(self.definition(def, locals));
                }
                self.collect(body, locals, out);
                locals.reset(mark);
            }
            ExprKind::Def { bindings, body } => {
                let mark = locals.mark();
                for (pattern, value) in bindings {
                    locals.push_pattern(pattern);
                    self.collect(value, locals, out);
                }
                self.collect(body, locals, out);
                locals.reset(mark);
            }

            // The element/key expressions only run for satisfying bindings.
            ExprKind::SetComp { binds, .. } | ExprKind::MapComp { binds, .. } => {
                let mark = locals.mark();
                locals.push_binds(binds);
                for b in binds {
                    self.bind(b, locals, out);
                }
                locals.reset(mark);
            }
            ExprKind::SeqComp { bind, .. } => {
                let mark = locals.mark();
                locals.push_binds(std::slice::from_ref(bind));
                self.bind(bind, locals, out);
                locals.reset(mark);
            }

            ExprKind::MkRecord { ty, args } => {
                out.insert(ty.name);
                for arg in args {
                    self.collect(arg, locals, out);
                }
            }

            ExprKind::Bool(_)
            | ExprKind::Char(_)
            | ExprKind::Int(_)
            | ExprKind::Real(_)
            | ExprKind::Quote(_)
            | ExprKind::Str(_)
            | ExprKind::Nil
            | ExprKind::Undefined
            | ExprKind::SelfRef => {}

            ExprKind::Unary { operand: e, .. }
            | ExprKind::MkToken(e)
            | ExprKind::Field { object: e, .. }
            | ExprKind::IsType { expr: e, .. }
            | ExprKind::Instantiate { function: e, .. } => self.collect(e, locals, out),
            ExprKind::SetRange { low, high } => {
                self.collect(low, locals, out);
                self.collect(high, locals, out);
            }
            ExprKind::SetEnum(items) | ExprKind::SeqEnum(items) | ExprKind::New { args: items, .. } => {
                for e in items {
                    self.collect(e, locals, out);
                }
            }
            ExprKind::MapEnum(pairs) => {
                for (k, v) in pairs {
                    self.collect(k, locals, out);
                    self.collect(v, locals, out);
                }
            }
            ExprKind::SubSeq { seq, from, to } => {
                self.collect(seq, locals, out);
                self.collect(from, locals, out);
                self.collect(to, locals, out);
            }
            ExprKind::Mu {
                record,
                modifications,
            } => {
                self.collect(record, locals, out);
                for (_, e) in modifications {
                    self.collect(e, locals, out);
                }
            }
        }
    }
}

impl Definition {
    /// Free variables of this definition at module level, computed once.
    pub fn free_variables(&self, globals: &GlobalEnv) -> &NameSet {
        self.free_vars
            .get_or_init(|| FreeVariables::new(globals).definition(self, &mut LocalEnv::new()))
    }
}
