//! Assignment through designators.
//!
//! Values are immutable, so assigning to `r.f` or `m(k)` rebuilds the
//! enclosing record, sequence or map and assigns that to the enclosing
//! designator, down to the root name. Object instance variables are the
//! exception: `o.f := v` updates the object's state in place.

use std::sync::Arc;

use vdm_ir::{Designator, DesignatorKind, Location, Name};
use vdm_patterns::errors::{
    cannot_assign_immutable, map_key_missing, not_applicable, not_in_scope,
    seq_index_out_of_range, unknown_field,
};
use vdm_patterns::{AssignError, Context, EvalError, EvalResult, Heap, Value};

use super::Interpreter;

/// A copy of `record` with `field` replaced.
pub(super) fn with_field(record: &Value, field: Name, value: Value) -> EvalResult {
    let current = record.as_record()?;
    let index = current
        .ty
        .field_index(field)
        .ok_or_else(|| unknown_field(field, record))?;
    let mut fields = current.fields.clone();
    fields[index] = value;
    Value::record(Arc::clone(&current.ty), fields)
}

fn assign_error(name: Name, error: AssignError) -> EvalError {
    match error {
        AssignError::Immutable => cannot_assign_immutable(name),
        AssignError::Undefined => not_in_scope(name),
    }
}

/// One step from a designator's root variable towards the assigned location.
struct Step {
    kind: StepKind,
    location: Location,
}

enum StepKind {
    Field(Name),
    /// Sequence index or map key, evaluated once.
    Index(Value),
}

impl Interpreter {
    pub(super) fn assign(
        &mut self,
        target: &Designator,
        value: Value,
        ctx: &Context,
    ) -> Result<(), EvalError> {
        let mut steps = Vec::new();
        let root = self
            .resolve_designator(target, ctx, &mut steps)
            .map_err(|e| e.at(target.location))?;
        let result = if steps.is_empty() {
            ctx.assign(root, value).map_err(|e| assign_error(root, e))
        } else {
            ctx.lookup(root)
                .ok_or_else(|| not_in_scope(root))
                .and_then(|current| update(current, &steps, value))
                .and_then(|updated| match updated {
                    Some(updated) => ctx.assign(root, updated).map_err(|e| assign_error(root, e)),
                    None => Ok(()),
                })
        };
        result.map_err(|e| e.at(target.location))
    }

    /// The root variable of `target`, pushing the steps below it outermost
    /// first. Index expressions are evaluated left to right.
    fn resolve_designator(
        &mut self,
        target: &Designator,
        ctx: &Context,
        steps: &mut Vec<Step>,
    ) -> Result<Name, EvalError> {
        let (root, kind) = match &target.kind {
            DesignatorKind::Name(name) => return Ok(*name),
            DesignatorKind::Field(inner, field) => (
                self.resolve_designator(inner, ctx, steps)?,
                StepKind::Field(*field),
            ),
            DesignatorKind::Apply(inner, index) => {
                let root = self.resolve_designator(inner, ctx, steps)?;
                (root, StepKind::Index(self.eval_expr(index, ctx)?))
            }
        };
        steps.push(Step {
            kind,
            location: target.location,
        });
        Ok(root)
    }
}

/// `current` with the location `steps` lead to set to `value`. `None` when
/// the update happened in place, in an object's state.
fn update(current: Value, steps: &[Step], value: Value) -> Result<Option<Value>, EvalError> {
    let Some((step, rest)) = steps.split_first() else {
        return Ok(Some(value));
    };
    update_step(current, step, rest, value).map_err(|e| e.at(step.location))
}

fn update_step(
    current: Value,
    step: &Step,
    rest: &[Step],
    value: Value,
) -> Result<Option<Value>, EvalError> {
    // The part below this step, read only when more steps follow.
    let descend = move |part: &dyn Fn() -> EvalResult| -> Result<Option<Value>, EvalError> {
        if rest.is_empty() {
            Ok(Some(value))
        } else {
            update(part()?, rest, value)
        }
    };
    match (&step.kind, current) {
        (StepKind::Field(field), Value::Object(obj)) => {
            let part = || -> EvalResult {
                obj.field(*field)
                    .ok_or_else(|| unknown_field(*field, &Value::Object(obj.clone())))
            };
            if let Some(replacement) = descend(&part)? {
                obj.state
                    .assign(*field, replacement)
                    .map_err(|e| assign_error(*field, e))?;
            }
            Ok(None)
        }
        (StepKind::Field(field), record) => {
            let part = || -> EvalResult {
                record
                    .as_record()?
                    .field(*field)
                    .cloned()
                    .ok_or_else(|| unknown_field(*field, &record))
            };
            match descend(&part)? {
                Some(replacement) => with_field(&record, *field, replacement).map(Some),
                None => Ok(None),
            }
        }
        (StepKind::Index(key), Value::Seq(mut items)) => {
            let position = key.as_int()?;
            let len = items.len();
            let index = usize::try_from(position)
                .ok()
                .and_then(|i| i.checked_sub(1))
                .filter(|i| *i < len)
                .ok_or_else(|| seq_index_out_of_range(position, len))?;
            let part = || -> EvalResult { Ok(items[index].clone()) };
            match descend(&part)? {
                Some(replacement) => {
                    Heap::make_mut(&mut items)[index] = replacement;
                    Ok(Some(Value::Seq(items)))
                }
                None => Ok(None),
            }
        }
        (StepKind::Index(key), Value::Map(mut entries)) => {
            let part = || -> EvalResult {
                entries.get(key).cloned().ok_or_else(|| map_key_missing(key))
            };
            match descend(&part)? {
                Some(replacement) => {
                    Heap::make_mut(&mut entries).insert(key.clone(), replacement);
                    Ok(Some(Value::Map(entries)))
                }
                None => Ok(None),
            }
        }
        (StepKind::Index(_), other) => Err(not_applicable(&other)),
    }
}
