//! Compound value payloads: records, functions, operations and objects.

use std::fmt;
use std::sync::Arc;

use vdm_ir::{Expr, FunctionDef, Name, OperationDef, Pattern, RecordType, Type};

use super::{Heap, Value};
use crate::Context;

/// A record value of a declared shape.
#[derive(Clone, Debug)]
pub struct RecordValue {
    pub ty: Arc<RecordType>,
    pub fields: Vec<Value>,
}

impl RecordValue {
    pub fn name(&self) -> Name {
        self.ty.name
    }

    pub fn field(&self, tag: Name) -> Option<&Value> {
        self.ty.field_index(tag).and_then(|i| self.fields.get(i))
    }
}

/// How a function value was defined.
#[derive(Clone, Debug)]
pub enum FunctionKind {
    /// An explicit (possibly polymorphic) module or class function.
    Explicit(Arc<FunctionDef>),
    Lambda {
        params: Vec<Pattern>,
        body: Arc<Expr>,
    },
}

/// A function or operation of a recursive group.
#[derive(Clone, Debug)]
pub enum GroupMember {
    Function(Arc<FunctionDef>),
    Operation(Arc<OperationDef>),
}

/// Functions and operations defined side by side in one `let`, which may
/// call each other.
///
/// The scope the group is bound in is not what its members close over:
/// they close over the scope before it, and each activation of a member
/// gets the whole group bound again. A scope therefore never holds a
/// closure over itself.
#[derive(Debug)]
pub struct RecursiveGroup {
    members: Vec<GroupMember>,
}

impl RecursiveGroup {
    pub fn new(members: Vec<GroupMember>) -> Arc<Self> {
        Arc::new(RecursiveGroup { members })
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    /// Bind every member into `scope` as a closure over `closure`.
    pub fn bind_members(self: &Arc<Self>, closure: &Context, scope: &Context) {
        for member in &self.members {
            match member {
                GroupMember::Function(def) => {
                    let mut func = FunctionValue::explicit(Arc::clone(def), closure.clone());
                    func.group = Some(Arc::clone(self));
                    scope.bind(def.name, Value::function(func));
                }
                GroupMember::Operation(def) => {
                    let mut op = OperationValue::new(Arc::clone(def), closure.clone());
                    op.group = Some(Arc::clone(self));
                    scope.bind(def.name, Value::operation(op));
                }
            }
        }
    }
}

/// A function closure.
#[derive(Clone)]
pub struct FunctionValue {
    pub name: Name,
    pub kind: FunctionKind,
    /// The defining environment.
    pub closure: Context,
    /// Type arguments; `None` until a polymorphic function is instantiated.
    pub type_args: Option<Vec<(Name, Type)>>,
    /// Bound object, for class functions accessed through an instance.
    pub self_obj: Option<ObjectRef>,
    /// Siblings to rebind on every call, for `let` functions.
    pub group: Option<Arc<RecursiveGroup>>,
}

impl FunctionValue {
    pub fn explicit(def: Arc<FunctionDef>, closure: Context) -> Self {
        FunctionValue {
            name: def.name,
            kind: FunctionKind::Explicit(def),
            closure,
            type_args: None,
            self_obj: None,
            group: None,
        }
    }

    pub fn lambda(params: Vec<Pattern>, body: Arc<Expr>, closure: Context) -> Self {
        FunctionValue {
            name: Name::intern("lambda"),
            kind: FunctionKind::Lambda { params, body },
            closure,
            type_args: None,
            self_obj: None,
            group: None,
        }
    }

    pub fn params(&self) -> &[Pattern] {
        match &self.kind {
            FunctionKind::Explicit(def) => &def.params,
            FunctionKind::Lambda { params, .. } => params,
        }
    }

    /// `None` when the body is not yet specified.
    pub fn body(&self) -> Option<&Expr> {
        match &self.kind {
            FunctionKind::Explicit(def) => def.body.as_ref(),
            FunctionKind::Lambda { body, .. } => Some(body),
        }
    }

    pub fn precondition(&self) -> Option<&Expr> {
        match &self.kind {
            FunctionKind::Explicit(def) => def.pre.as_ref(),
            FunctionKind::Lambda { .. } => None,
        }
    }

    pub fn type_params(&self) -> &[Name] {
        match &self.kind {
            FunctionKind::Explicit(def) => &def.type_params,
            FunctionKind::Lambda { .. } => &[],
        }
    }

    pub fn is_polymorphic(&self) -> bool {
        !self.type_params().is_empty()
    }

    pub fn is_instantiated(&self) -> bool {
        self.type_args.is_some()
    }

    /// Only a polymorphic function not yet given its type arguments can be
    /// instantiated.
    pub fn needs_instantiation(&self) -> bool {
        self.is_polymorphic() && !self.is_instantiated()
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.name)
            .field("params", &self.params().len())
            .field("type_args", &self.type_args)
            .finish_non_exhaustive()
    }
}

/// An operation bound to its module or object state.
#[derive(Clone)]
pub struct OperationValue {
    pub def: Arc<OperationDef>,
    pub closure: Context,
    pub self_obj: Option<ObjectRef>,
    pub group: Option<Arc<RecursiveGroup>>,
}

impl OperationValue {
    pub fn new(def: Arc<OperationDef>, closure: Context) -> Self {
        OperationValue {
            def,
            closure,
            self_obj: None,
            group: None,
        }
    }

    pub fn name(&self) -> Name {
        self.def.name
    }
}

impl fmt::Debug for OperationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationValue")
            .field("name", &self.def.name)
            .finish_non_exhaustive()
    }
}

/// An object instance. Instance variables live in `state`, an object frame
/// whose parent is the class's static context.
pub struct ObjectValue {
    pub id: u64,
    pub class: Name,
    pub state: Context,
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{#{}}}", self.class, self.id)
    }
}

/// Shared reference to an object; equality is identity.
pub type ObjectRef = Heap<ObjectValue>;

impl ObjectValue {
    /// Current value of an instance variable.
    pub fn field(&self, name: Name) -> Option<Value> {
        self.state.local(name)
    }
}
