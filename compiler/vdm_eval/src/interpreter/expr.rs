//! Expression evaluation.

use std::sync::Arc;

use vdm_ir::{
    BinaryOp, CaseAlternative, CaseStmtAlternative, Expr, ExprKind, Location, Name, Pattern, Type,
};
use vdm_patterns::errors::{
    already_instantiated, no_cases_apply, no_return_value, no_self, not_in_scope,
    seq_index_out_of_range,
};
use vdm_patterns::{Context, EvalError, EvalResult, FunctionValue, Value};

use super::{objects, ops, Interpreter};

impl Interpreter {
    pub(super) fn eval_expr_inner(&mut self, expr: &Expr, ctx: &Context) -> EvalResult {
        let location = expr.location;
        match &expr.kind {
            ExprKind::Bool(b) => Ok(Value::bool(*b)),
            ExprKind::Char(c) => Ok(Value::Char(*c)),
            ExprKind::Int(i) => Ok(Value::int(*i)),
            ExprKind::Real(r) => Ok(Value::real(*r)),
            ExprKind::Quote(q) => Ok(Value::Quote(*q)),
            ExprKind::Str(s) => Ok(Value::string(s)),
            ExprKind::Nil => Ok(Value::Nil),
            ExprKind::Undefined => Ok(Value::Undefined),
            ExprKind::SelfRef => ctx.self_object().map(Value::Object).ok_or_else(no_self),
            ExprKind::Var(name) => lookup(*name, ctx),

            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand, ctx)?;
                ops::unary(*op, &value)
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right, ctx),

            ExprKind::If {
                cond,
                then_branch,
                elseifs,
                else_branch,
            } => {
                if self.eval_expr(cond, ctx)?.as_bool()? {
                    return self.eval_expr(then_branch, ctx);
                }
                for (elseif_cond, branch) in elseifs {
                    if self.eval_expr(elseif_cond, ctx)?.as_bool()? {
                        return self.eval_expr(branch, ctx);
                    }
                }
                self.eval_expr(else_branch, ctx)
            }
            ExprKind::Cases {
                selector,
                alternatives,
                others,
            } => {
                let value = self.eval_expr(selector, ctx)?;
                if let Some((alt, scope)) = self.select_case(alternatives, &value, location, ctx) {
                    return self.eval_expr(&alt.result, &scope);
                }
                match others {
                    Some(others) => self.eval_expr(others, ctx),
                    None => Err(no_cases_apply(&value)),
                }
            }

            ExprKind::SetEnum(items) => Ok(Value::set(self.eval_all(items, ctx)?)),
            ExprKind::SetRange { low, high } => {
                let low = self.eval_expr(low, ctx)?.as_int()?;
                let high = self.eval_expr(high, ctx)?.as_int()?;
                Ok(Value::set((low..=high).map(Value::int)))
            }
            ExprKind::SeqEnum(items) => Ok(Value::seq(self.eval_all(items, ctx)?)),
            ExprKind::MapEnum(pairs) => {
                let mut entries = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    entries.push((self.eval_expr(key, ctx)?, self.eval_expr(value, ctx)?));
                }
                Value::map(entries)
            }
            ExprKind::SetComp {
                element,
                binds,
                predicate,
            } => self.eval_set_comp(element, binds, predicate.as_deref(), location, ctx),
            ExprKind::SeqComp {
                element,
                bind,
                predicate,
            } => self.eval_seq_comp(element, bind, predicate.as_deref(), location, ctx),
            ExprKind::MapComp {
                key,
                value,
                binds,
                predicate,
            } => self.eval_map_comp(key, value, binds, predicate.as_deref(), location, ctx),
            ExprKind::SubSeq { seq, from, to } => {
                let seq = self.eval_expr(seq, ctx)?;
                let from = self.eval_expr(from, ctx)?.as_int()?;
                let to = self.eval_expr(to, ctx)?.as_int()?;
                subsequence(seq.as_seq()?, from, to)
            }

            ExprKind::MkRecord { ty, args } => {
                let fields = self.eval_all(args, ctx)?;
                Value::record(Arc::clone(ty), fields)
            }
            ExprKind::MkToken(inner) => Ok(Value::token(self.eval_expr(inner, ctx)?)),
            ExprKind::Field { object, field } => {
                let value = self.eval_expr(object, ctx)?;
                objects::field_of(&value, *field)
            }
            ExprKind::Mu {
                record,
                modifications,
            } => {
                let mut value = self.eval_expr(record, ctx)?;
                for (field, expr) in modifications {
                    let replacement = self.eval_expr(expr, ctx)?;
                    value = super::assign::with_field(&value, *field, replacement)?;
                }
                Ok(value)
            }
            ExprKind::IsType { expr, ty } => {
                let value = self.eval_expr(expr, ctx)?;
                Ok(Value::bool(value.conforms_to(&ctx.resolve_type(ty))))
            }
            ExprKind::New { class, args } => {
                let args = self.eval_all(args, ctx)?;
                self.new_object(*class, args, location, ctx)
            }

            ExprKind::Apply { root, args } => {
                let callee = self.eval_expr(root, ctx)?;
                let args = self.eval_all(args, ctx)?;
                let result = self.apply(&callee, args, location, ctx)?;
                match (&callee, result) {
                    (Value::Operation(op), Value::Void) => Err(no_return_value(op.name())),
                    (_, result) => Ok(result),
                }
            }
            ExprKind::Lambda { params, body } => Ok(Value::function(FunctionValue::lambda(
                params.clone(),
                Arc::clone(body),
                ctx.clone(),
            ))),
            ExprKind::Instantiate { function, types } => {
                let value = self.eval_expr(function, ctx)?;
                let types = types.iter().map(|ty| ctx.resolve_type(ty)).collect();
                instantiate(value.as_function()?, types)
            }

            ExprKind::Let { defs, body } => {
                let scope = self.bind_definitions(defs, location, ctx)?;
                self.eval_expr(body, &scope)
            }
            ExprKind::Def { bindings, body } => {
                let scope = self.def_scope(bindings, location, ctx)?;
                self.eval_expr(body, &scope)
            }
            ExprKind::LetBeSt {
                bind,
                predicate,
                body,
            } => {
                let scope = self.let_be_st_scope(bind, predicate.as_deref(), location, ctx)?;
                self.eval_expr(body, &scope)
            }
            ExprKind::Exists { binds, predicate } => {
                self.eval_exists(binds, predicate, location, ctx)
            }
            ExprKind::Forall { binds, predicate } => {
                self.eval_forall(binds, predicate, location, ctx)
            }
            ExprKind::Exists1 { bind, predicate } => self.eval_exists1(bind, predicate, ctx),
            ExprKind::Iota { bind, predicate } => self.eval_iota(bind, predicate, ctx),
        }
    }

    /// Boolean connectives short-circuit; everything else is strict.
    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ctx: &Context,
    ) -> EvalResult {
        let l = self.eval_expr(left, ctx)?;
        match op {
            BinaryOp::And if !l.as_bool()? => Ok(Value::bool(false)),
            BinaryOp::Or if l.as_bool()? => Ok(Value::bool(true)),
            BinaryOp::Implies if !l.as_bool()? => Ok(Value::bool(true)),
            _ => {
                let r = self.eval_expr(right, ctx)?;
                ops::binary(op, &l, &r)
            }
        }
    }

    pub(super) fn eval_all(
        &mut self,
        exprs: &[Expr],
        ctx: &Context,
    ) -> Result<Vec<Value>, EvalError> {
        exprs.iter().map(|e| self.eval_expr(e, ctx)).collect()
    }

    /// The first alternative with a matching pattern, and a scope holding
    /// its bindings.
    pub(super) fn select_case<'a, A: CaseArm>(
        &self,
        alternatives: &'a [A],
        value: &Value,
        location: Location,
        ctx: &Context,
    ) -> Option<(&'a A, Context)> {
        for alt in alternatives {
            for pattern in alt.patterns() {
                if let Ok(envs) = self.matcher.matches(pattern, value) {
                    let scope = ctx.child_scope("cases", location);
                    if let Some(env) = envs.first() {
                        scope.bind_all(env);
                    }
                    return Some((alt, scope));
                }
            }
        }
        None
    }

    /// `def p1 = e1; p2 = e2 in`: each binding sees the previous ones.
    /// Every binding gets its own scope, so a closure a right-hand side
    /// creates never lives in the scope it captured.
    pub(super) fn def_scope(
        &mut self,
        bindings: &[(Pattern, Expr)],
        location: Location,
        ctx: &Context,
    ) -> Result<Context, EvalError> {
        let mut scope = ctx.clone();
        for (pattern, expr) in bindings {
            let value = self.eval_expr(expr, &scope)?;
            let next = scope.child_scope("def", location);
            self.bind_pattern(pattern, &value, &next)?;
            scope = next;
        }
        Ok(scope)
    }
}

/// A `cases` alternative of an expression or a statement.
pub(super) trait CaseArm {
    fn patterns(&self) -> &[Pattern];
}

impl CaseArm for CaseAlternative {
    fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}

impl CaseArm for CaseStmtAlternative {
    fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}

fn lookup(name: Name, ctx: &Context) -> EvalResult {
    ctx.lookup(name).ok_or_else(|| not_in_scope(name))
}

/// `s(from, ..., to)`. Bounds are clamped to the sequence; an empty range
/// gives the empty sequence.
fn subsequence(items: &[Value], from: i64, to: i64) -> EvalResult {
    let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
    let from = from.max(1);
    let to = to.min(len);
    if from > to {
        return Ok(Value::empty_seq());
    }
    let start = usize::try_from(from - 1).map_err(|_| seq_index_out_of_range(from, items.len()))?;
    let end = usize::try_from(to).map_err(|_| seq_index_out_of_range(to, items.len()))?;
    Ok(Value::seq(items[start..end].to_vec()))
}

/// Apply type arguments to a polymorphic function. Functions without type
/// parameters count as instantiated already.
fn instantiate(func: &FunctionValue, types: Vec<Type>) -> EvalResult {
    if !func.needs_instantiation() {
        return Err(already_instantiated(func.name));
    }
    let mut instance = func.clone();
    instance.type_args = Some(func.type_params().iter().copied().zip(types).collect());
    Ok(Value::function(instance))
}
