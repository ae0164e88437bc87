//! Named definitions owned by modules and classes.

use std::sync::{Arc, OnceLock};

use super::{Expr, Pattern, Stmt};
use crate::free_vars::NameSet;
use crate::{Location, Name, RecordType, Type};

/// A named, typed unit of a module or class.
#[derive(Clone, Debug)]
pub struct Definition {
    pub name: Name,
    pub kind: DefinitionKind,
    /// Class members only: shared by all instances and initialized with
    /// the class itself.
    pub is_static: bool,
    pub location: Location,
    pub(crate) free_vars: OnceLock<NameSet>,
}

#[derive(Clone, Debug)]
pub enum DefinitionKind {
    /// `p : T = e`; `name` is the first name the pattern binds.
    Value {
        pattern: Pattern,
        ty: Option<Type>,
        expr: Expr,
    },
    Function(Arc<FunctionDef>),
    Operation(Arc<OperationDef>),
    Type(Type),
    InstanceVariable {
        ty: Type,
        init: Option<Expr>,
    },
    State(StateDef),
    /// Imported alias for a definition of another module.
    Rename {
        target: Name,
    },
}

impl Definition {
    pub fn new(name: Name, kind: DefinitionKind, location: Location) -> Self {
        Definition {
            name,
            kind,
            is_static: false,
            location,
            free_vars: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Value definition binding the names of `pattern`.
    pub fn value(pattern: Pattern, expr: Expr) -> Self {
        let name = pattern.bound_names().first().copied().unwrap_or(Name::EMPTY);
        let location = pattern.location;
        Definition::new(
            name,
            DefinitionKind::Value {
                pattern,
                ty: None,
                expr,
            },
            location,
        )
    }

    pub fn function(def: FunctionDef, location: Location) -> Self {
        Definition::new(def.name, DefinitionKind::Function(Arc::new(def)), location)
    }

    pub fn operation(def: OperationDef, location: Location) -> Self {
        Definition::new(def.name, DefinitionKind::Operation(Arc::new(def)), location)
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, DefinitionKind::Function(_))
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, DefinitionKind::Value { .. })
    }

    /// Names this definition introduces into its module's scope.
    pub fn defined_names(&self) -> Vec<Name> {
        match &self.kind {
            DefinitionKind::Value { pattern, .. } => pattern.bound_names().to_vec(),
            DefinitionKind::State(state) => state.record.fields.iter().map(|f| f.tag).collect(),
            _ => vec![self.name],
        }
    }
}

/// Explicit function definition.
#[derive(Clone, Debug)]
pub struct FunctionDef {
    pub name: Name,
    /// Non-empty for polymorphic functions, which must be instantiated
    /// before they can be applied.
    pub type_params: Vec<Name>,
    pub params: Vec<Pattern>,
    pub param_types: Vec<Type>,
    pub result: Type,
    /// `None` for `is not yet specified`.
    pub body: Option<Expr>,
    pub pre: Option<Expr>,
}

impl FunctionDef {
    pub fn new(name: Name, params: Vec<Pattern>, body: Expr) -> Self {
        FunctionDef {
            name,
            type_params: Vec::new(),
            param_types: Vec::new(),
            params,
            result: Type::Unknown,
            body: Some(body),
            pre: None,
        }
    }
}

/// Explicit operation definition.
#[derive(Clone, Debug)]
pub struct OperationDef {
    pub name: Name,
    pub params: Vec<Pattern>,
    pub body: Option<Stmt>,
    pub pre: Option<Expr>,
}

impl OperationDef {
    pub fn new(name: Name, params: Vec<Pattern>, body: Stmt) -> Self {
        OperationDef {
            name,
            params,
            body: Some(body),
            pre: None,
        }
    }
}

/// Module state: `state S of f1 : T1 ... init s == s = mk_S(...) end`.
#[derive(Clone, Debug)]
pub struct StateDef {
    pub record: Arc<RecordType>,
    /// The `mk_S(...)` initializer expression.
    pub init: Option<Expr>,
}
