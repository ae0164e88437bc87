//! Classes, object creation and member access.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use vdm_ir::{Definition, DefinitionKind, Location, Name};
use vdm_patterns::errors::{unknown_class, unknown_field, wrong_argument_count};
use vdm_patterns::{Context, EvalResult, FunctionValue, OperationValue, Value};

use super::Interpreter;

/// A class registered by the static initializer.
#[derive(Clone, Debug)]
pub struct ClassEntry {
    pub definitions: Arc<[Definition]>,
    /// The class's static context; every object frame's parent.
    pub context: Context,
}

/// Classes by name, shared by every interpreter of a session.
#[derive(Clone, Debug, Default)]
pub struct ClassTable(Arc<RwLock<FxHashMap<Name, ClassEntry>>>);

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: Name, definitions: Arc<[Definition]>, context: Context) {
        self.0.write().insert(
            name,
            ClassEntry {
                definitions,
                context,
            },
        );
    }

    pub fn get(&self, name: Name) -> Option<ClassEntry> {
        self.0.read().get(&name).cloned()
    }

    pub fn contains(&self, name: Name) -> bool {
        self.0.read().contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

impl Interpreter {
    /// `new C(args)`: initialize instance variables in declaration order,
    /// then run the constructor (the operation named after the class), if
    /// any.
    #[tracing::instrument(level = "debug", skip(self, args, ctx))]
    pub(super) fn new_object(
        &mut self,
        class: Name,
        args: Vec<Value>,
        location: Location,
        ctx: &Context,
    ) -> EvalResult {
        let entry = self.classes().get(class).ok_or_else(|| unknown_class(class))?;
        let state = entry.context.object_scope(class, location);
        let object = Value::object(class, state.clone());
        let obj = object.as_object()?.clone();

        let init = state.call_frame(
            format!("{class} instance variables"),
            location,
            ctx,
            Some(obj.clone()),
        );
        for def in entry.definitions.iter().filter(|d| !d.is_static) {
            if let DefinitionKind::InstanceVariable { init: expr, .. } = &def.kind {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, &init)?,
                    None => Value::Undefined,
                };
                state.declare(def.name, value);
            }
        }

        match entry.context.local(class) {
            Some(Value::Operation(ctor)) => {
                let mut bound = OperationValue::clone(&ctor);
                bound.self_obj = Some(obj);
                self.apply(&Value::operation(bound), args, location, ctx)?;
            }
            _ if !args.is_empty() => return Err(wrong_argument_count(class, 0, args.len())),
            _ => {}
        }
        Ok(object)
    }
}

/// `v.f`: a record field, an object's instance variable, or a member
/// function or operation bound to the object.
pub(super) fn field_of(value: &Value, field: Name) -> EvalResult {
    match value {
        Value::Record(record) => record
            .field(field)
            .cloned()
            .ok_or_else(|| unknown_field(field, value)),
        Value::Object(obj) => match member(&obj.state, field) {
            Some(Value::Function(func)) => {
                let mut bound = FunctionValue::clone(&func);
                bound.self_obj = Some(obj.clone());
                Ok(Value::function(bound))
            }
            Some(Value::Operation(op)) => {
                let mut bound = OperationValue::clone(&op);
                bound.self_obj = Some(obj.clone());
                Ok(Value::operation(bound))
            }
            Some(member) => Ok(member),
            None => Err(unknown_field(field, value)),
        },
        _ => Err(unknown_field(field, value)),
    }
}

/// An object's instance variable, else a member of its class.
fn member(state: &Context, name: Name) -> Option<Value> {
    state
        .local(name)
        .or_else(|| state.parent().and_then(|class| class.local(name)))
}
