//! Execution contexts: the scope chain.
//!
//! A `Context` is one frame of name bindings with a parent link; lookup
//! walks outward to the root, which holds module and class static state.
//! Frames are shared (`Arc`) so closures can capture their defining scope,
//! and each frame's bindings sit behind a lock so the evaluator, the debug
//! link and other logical threads can read them safely.
//!
//! Call frames additionally record their caller. The parent chain is
//! lexical; the caller chain is the dynamic call stack used for backtraces
//! and debugger stack listings.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use vdm_ir::{Location, Name, Type};

use crate::errors::{BacktraceFrame, EvalBacktrace};
use crate::value::{ObjectRef, Value};
use crate::Bindings;

/// Whether a binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// State, instance variables and `dcl` declarations.
    Mutable,
    /// Pattern-bound names and parameters.
    Immutable,
}

/// Error returned by `Context::assign`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    Immutable,
    Undefined,
}

/// What a frame represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Global,
    Module(Name),
    /// Instance variables of one object.
    Object(Name),
    /// A function or operation activation.
    Call,
    /// A block, quantifier, `let` or other nested scope.
    Block,
}

#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    mutability: Mutability,
}

struct Frame {
    title: String,
    location: Location,
    kind: FrameKind,
    bindings: RwLock<FxHashMap<Name, Binding>>,
    parent: Option<Context>,
    caller: Option<Context>,
    self_obj: Option<ObjectRef>,
    call_depth: usize,
    /// Type parameters bound by a polymorphic function's instantiation.
    type_args: Vec<(Name, Type)>,
}

impl Frame {
    fn new(title: String, location: Location, kind: FrameKind, parent: Option<&Context>) -> Self {
        Frame {
            title,
            location,
            kind,
            bindings: RwLock::new(FxHashMap::default()),
            call_depth: parent.map_or(0, |p| p.0.call_depth),
            parent: parent.cloned(),
            caller: None,
            self_obj: None,
            type_args: Vec::new(),
        }
    }
}

/// One frame of the scope chain.
#[derive(Clone)]
pub struct Context(Arc<Frame>);

impl Context {
    fn from_frame(frame: Frame) -> Self {
        Context(Arc::new(frame))
    }

    /// The root context.
    pub fn global() -> Self {
        Self::from_frame(Frame::new(
            "global environment".to_string(),
            Location::DUMMY,
            FrameKind::Global,
            None,
        ))
    }

    /// A module or class static frame.
    pub fn module_scope(&self, name: Name, location: Location) -> Self {
        Self::from_frame(Frame::new(
            format!("module {name}"),
            location,
            FrameKind::Module(name),
            Some(self),
        ))
    }

    /// A nested scope for a block, quantifier or `let`.
    pub fn child_scope(&self, title: impl Into<String>, location: Location) -> Self {
        Self::from_frame(Frame::new(
            title.into(),
            location,
            FrameKind::Block,
            Some(self),
        ))
    }

    /// A function or operation activation. `self` is the closure; `caller`
    /// is the context the call was made from.
    pub fn call_frame(
        &self,
        title: impl Into<String>,
        location: Location,
        caller: &Context,
        self_obj: Option<ObjectRef>,
    ) -> Self {
        let mut frame = Frame::new(title.into(), location, FrameKind::Call, Some(self));
        frame.caller = Some(caller.clone());
        frame.self_obj = self_obj;
        frame.call_depth = caller.0.call_depth + 1;
        Self::from_frame(frame)
    }

    /// The instance-variable frame of a new object of `class`.
    pub fn object_scope(&self, class: Name, location: Location) -> Self {
        Self::from_frame(Frame::new(
            format!("object {class}"),
            location,
            FrameKind::Object(class),
            Some(self),
        ))
    }

    /// A scope binding the type parameters of an instantiated function,
    /// between its closure and its activations.
    pub fn instantiation_scope(&self, type_args: Vec<(Name, Type)>, location: Location) -> Self {
        let mut frame = Frame::new(
            "instantiation params".to_string(),
            location,
            FrameKind::Block,
            Some(self),
        );
        frame.type_args = type_args;
        Self::from_frame(frame)
    }

    /// Bind an immutable name in this frame.
    pub fn bind(&self, name: Name, value: Value) {
        self.define(name, value, Mutability::Immutable);
    }

    /// Declare a mutable name in this frame.
    pub fn declare(&self, name: Name, value: Value) {
        self.define(name, value, Mutability::Mutable);
    }

    pub fn define(&self, name: Name, value: Value, mutability: Mutability) {
        self.0
            .bindings
            .write()
            .insert(name, Binding { value, mutability });
    }

    /// Bind every name of a match result.
    pub fn bind_all(&self, bindings: &Bindings) {
        let mut frame = self.0.bindings.write();
        for (name, value) in bindings.iter() {
            frame.insert(
                *name,
                Binding {
                    value: value.clone(),
                    mutability: Mutability::Immutable,
                },
            );
        }
    }

    /// Look a name up, walking outward to the root.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        let mut ctx = Some(self);
        while let Some(current) = ctx {
            if let Some(value) = current.local(name) {
                return Some(value);
            }
            ctx = current.0.parent.as_ref();
        }
        None
    }

    /// Look a name up in this frame only.
    pub fn local(&self, name: Name) -> Option<Value> {
        self.0.bindings.read().get(&name).map(|b| b.value.clone())
    }

    pub fn is_bound(&self, name: Name) -> bool {
        self.lookup(name).is_some()
    }

    /// Replace the value of the innermost binding of `name`.
    pub fn assign(&self, name: Name, value: Value) -> Result<(), AssignError> {
        let mut ctx = Some(self);
        while let Some(current) = ctx {
            let mut frame = current.0.bindings.write();
            if let Some(binding) = frame.get_mut(&name) {
                if binding.mutability != Mutability::Mutable {
                    return Err(AssignError::Immutable);
                }
                binding.value = value;
                return Ok(());
            }
            drop(frame);
            ctx = current.0.parent.as_ref();
        }
        Err(AssignError::Undefined)
    }

    /// Drop every binding of this frame.
    ///
    /// Module and class frames hold closures over themselves; clearing them
    /// when their session ends is what releases them.
    pub fn clear(&self) {
        self.0.bindings.write().clear();
    }

    /// `ty` with each type parameter bound by an enclosing instantiation
    /// replaced by its argument. The innermost binding wins.
    pub fn resolve_type(&self, ty: &Type) -> Type {
        let args: Vec<(Name, Type)> = self
            .frames()
            .flat_map(|ctx| ctx.0.type_args.iter().cloned())
            .collect();
        if args.is_empty() {
            ty.clone()
        } else {
            ty.instantiate(&args)
        }
    }

    /// Handles to this frame, including the ones parents and closures hold.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    pub fn title(&self) -> &str {
        &self.0.title
    }

    pub fn location(&self) -> Location {
        self.0.location
    }

    pub fn kind(&self) -> FrameKind {
        self.0.kind
    }

    pub fn parent(&self) -> Option<&Context> {
        self.0.parent.as_ref()
    }

    pub fn caller(&self) -> Option<&Context> {
        self.0.caller.as_ref()
    }

    /// Number of call frames between this context and the root.
    pub fn call_depth(&self) -> usize {
        self.0.call_depth
    }

    /// The object `self` refers to, from the innermost call frame that has one.
    pub fn self_object(&self) -> Option<ObjectRef> {
        self.frames().find_map(|ctx| ctx.0.self_obj.clone())
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// This frame's bindings, sorted by name.
    pub fn local_bindings(&self) -> Vec<(Name, Value)> {
        let mut bindings: Vec<_> = self
            .0
            .bindings
            .read()
            .iter()
            .map(|(name, b)| (*name, b.value.clone()))
            .collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        bindings
    }

    /// The lexical chain, innermost first.
    pub fn frames(&self) -> impl Iterator<Item = &Context> {
        std::iter::successors(Some(self), |ctx| ctx.parent())
    }

    /// The innermost call frame of the lexical chain, if any.
    pub fn enclosing_call(&self) -> Option<&Context> {
        self.frames().find(|ctx| ctx.kind() == FrameKind::Call)
    }

    /// The dynamic call stack, innermost first.
    pub fn call_stack(&self) -> Vec<Context> {
        let mut stack = Vec::new();
        let mut current = self.enclosing_call();
        while let Some(frame) = current {
            stack.push(frame.clone());
            current = frame.caller().and_then(Context::enclosing_call);
        }
        stack
    }

    pub fn backtrace(&self) -> EvalBacktrace {
        EvalBacktrace::new(
            self.call_stack()
                .iter()
                .map(|frame| BacktraceFrame {
                    name: frame.title().to_string(),
                    location: frame.location(),
                })
                .collect(),
        )
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("title", &self.0.title)
            .field("kind", &self.0.kind)
            .field("bindings", &self.0.bindings.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
