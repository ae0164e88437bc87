//! Application of functions, operations, sequences and maps.

use vdm_ir::{Location, Name, Pattern};
use vdm_patterns::errors::{
    map_key_missing, not_applicable, not_yet_specified, parameter_mismatch, precondition_failure,
    seq_index_out_of_range, wrong_argument_count,
};
use vdm_patterns::{
    Context, EvalError, EvalResult, FrameKind, FunctionValue, ObjectRef, OperationValue, Value,
};

use super::Interpreter;

/// The object a call runs against: the one bound to the callee, else the
/// caller's own `self` when the callee belongs to the caller's class.
fn receiver(bound: Option<&ObjectRef>, closure: &Context, caller: &Context) -> Option<ObjectRef> {
    if let Some(obj) = bound {
        return Some(obj.clone());
    }
    let FrameKind::Module(class) = closure.kind() else {
        return None;
    };
    caller.self_object().filter(|obj| obj.class == class)
}

impl Interpreter {
    /// Apply `callee` to already evaluated arguments.
    pub fn apply(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        location: Location,
        caller: &Context,
    ) -> EvalResult {
        match callee {
            Value::Function(func) => self.call_function(func, &args, location, caller),
            Value::Operation(op) => self.call_operation(op, &args, location, caller),
            Value::Seq(items) => {
                let index = single_argument(callee, &args)?.as_int()?;
                usize::try_from(index)
                    .ok()
                    .and_then(|i| i.checked_sub(1))
                    .and_then(|i| items.get(i))
                    .cloned()
                    .ok_or_else(|| seq_index_out_of_range(index, items.len()))
            }
            Value::Map(entries) => {
                let key = single_argument(callee, &args)?;
                entries.get(key).cloned().ok_or_else(|| map_key_missing(key))
            }
            other => Err(not_applicable(other)),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %func.name))]
    fn call_function(
        &mut self,
        func: &FunctionValue,
        args: &[Value],
        location: Location,
        caller: &Context,
    ) -> EvalResult {
        check_arity(func.name, func.params(), args)?;
        self.enter_call()?;
        let result = self.run_function(func, args, location, caller);
        self.depth.leave();
        result
    }

    fn run_function(
        &mut self,
        func: &FunctionValue,
        args: &[Value],
        location: Location,
        caller: &Context,
    ) -> EvalResult {
        let self_obj = receiver(func.self_obj.as_ref(), &func.closure, caller);
        let mut closure = self_obj
            .as_ref()
            .map_or_else(|| func.closure.clone(), |obj| obj.state.clone());
        if let Some(type_args) = &func.type_args {
            closure = closure.instantiation_scope(type_args.clone(), location);
        }
        let frame = closure.call_frame(func.name.as_str(), location, caller, self_obj.clone());
        if let Some(group) = &func.group {
            group.bind_members(&func.closure, &frame);
        }
        self.bind_parameters(func.name, func.params(), args, location, &frame)?;

        let run = |this: &mut Self| -> EvalResult {
            if let (Some(pre), true) = (func.precondition(), this.config.check_preconditions) {
                if !this.eval_expr(pre, &frame)?.as_bool()? {
                    return Err(precondition_failure(func.name));
                }
            }
            let body = func.body().ok_or_else(|| not_yet_specified(func.name))?;
            this.eval_expr(body, &frame)
        };
        run(self).map_err(|e| e.with_backtrace(frame.backtrace()))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(operation = %op.name()))]
    fn call_operation(
        &mut self,
        op: &OperationValue,
        args: &[Value],
        location: Location,
        caller: &Context,
    ) -> EvalResult {
        check_arity(op.name(), &op.def.params, args)?;
        self.enter_call()?;
        let result = self.run_operation(op, args, location, caller);
        self.depth.leave();
        result
    }

    fn run_operation(
        &mut self,
        op: &OperationValue,
        args: &[Value],
        location: Location,
        caller: &Context,
    ) -> EvalResult {
        let name = op.name();
        let self_obj = receiver(op.self_obj.as_ref(), &op.closure, caller);
        let closure = self_obj.as_ref().map_or(&op.closure, |obj| &obj.state);
        let frame = closure.call_frame(name.as_str(), location, caller, self_obj.clone());
        if let Some(group) = &op.group {
            group.bind_members(&op.closure, &frame);
        }
        self.bind_parameters(name, &op.def.params, args, location, &frame)?;

        let run = |this: &mut Self| -> EvalResult {
            if let (Some(pre), true) = (&op.def.pre, this.config.check_preconditions) {
                if !this.eval_expr(pre, &frame)?.as_bool()? {
                    return Err(precondition_failure(name));
                }
            }
            let body = op.def.body.as_ref().ok_or_else(|| not_yet_specified(name))?;
            match this.eval_stmt(body, &frame)? {
                Value::VoidReturn => Ok(Value::Void),
                result => Ok(result),
            }
        };
        run(self).map_err(|e| e.with_backtrace(frame.backtrace()))
    }

    fn bind_parameters(
        &self,
        name: Name,
        params: &[Pattern],
        args: &[Value],
        location: Location,
        frame: &Context,
    ) -> Result<(), EvalError> {
        if params.iter().all(|p| p.as_identifier().is_some()) {
            for (param, arg) in params.iter().zip(args) {
                if let Some(ident) = param.as_identifier() {
                    frame.bind(ident, arg.clone());
                }
            }
            return Ok(());
        }
        let envs = self
            .matcher
            .matches_all(params, args, location)
            .map_err(|mismatch| parameter_mismatch(name, &mismatch))?;
        if let Some(env) = envs.first() {
            frame.bind_all(env);
        }
        Ok(())
    }
}

fn check_arity(name: Name, params: &[Pattern], args: &[Value]) -> Result<(), EvalError> {
    if params.len() == args.len() {
        Ok(())
    } else {
        Err(wrong_argument_count(name, params.len(), args.len()))
    }
}

fn single_argument<'a>(callee: &Value, args: &'a [Value]) -> Result<&'a Value, EvalError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(wrong_argument_count(Name::intern(callee.kind()), 1, args.len())),
    }
}
