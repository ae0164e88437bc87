//! Multiple binds, quantifiers, comprehensions and `let be st`.
//!
//! A list of multiple binds denotes the product of its binds: every value
//! of every bind's collection matched against each of its patterns, merged
//! into one environment. Values a pattern does not match are skipped, and
//! environments binding one name to two different values are dropped.

use vdm_ir::{BindKind, Expr, Location, MultipleBind, Type};
use vdm_patterns::errors::{infinite_type_bind, iota_multiple, iota_none, let_be_st_none};
use vdm_patterns::{Bindings, Context, EvalError, EvalResult, Value, ValueSet};

use super::Interpreter;

/// Values of a finite type, in value order.
fn type_values(ty: &Type) -> Result<ValueSet, EvalError> {
    match ty {
        Type::Bool => Ok([Value::bool(false), Value::bool(true)].into_iter().collect()),
        Type::Quote(q) => Ok(std::iter::once(Value::Quote(*q)).collect()),
        Type::Named(_, inner) => type_values(inner),
        Type::Optional(inner) => {
            let mut values = type_values(inner)?;
            values.insert(Value::Nil);
            Ok(values)
        }
        Type::Union(members) => {
            let mut values = ValueSet::new();
            for member in members {
                values.extend(type_values(member)?);
            }
            Ok(values)
        }
        _ => Err(infinite_type_bind(ty)),
    }
}

impl Interpreter {
    /// The values a single bind ranges over.
    fn bind_values(&mut self, bind: &MultipleBind, ctx: &Context) -> Result<Vec<Value>, EvalError> {
        match &bind.kind {
            BindKind::Set(expr) => {
                let set = self.eval_expr(expr, ctx)?;
                Ok(set.as_set()?.iter().cloned().collect())
            }
            BindKind::Seq(expr) => {
                let seq = self.eval_expr(expr, ctx)?;
                Ok(seq.as_seq()?.to_vec())
            }
            BindKind::Type(ty) => Ok(type_values(&ctx.resolve_type(ty))?.into_iter().collect()),
        }
    }

    /// Every environment the binds admit.
    pub(super) fn bind_environments(
        &mut self,
        binds: &[MultipleBind],
        ctx: &Context,
    ) -> Result<Vec<Bindings>, EvalError> {
        let mut envs = vec![Bindings::new()];
        for bind in binds {
            let values = self.bind_values(bind, ctx)?;
            for pattern in &bind.patterns {
                let mut next = Vec::new();
                for value in &values {
                    let Ok(matches) = self.matcher.matches(pattern, value) else {
                        continue;
                    };
                    for env in &envs {
                        next.extend(
                            matches
                                .iter()
                                .filter_map(|m| env.merge(m, bind.location).ok()),
                        );
                    }
                }
                envs = next;
            }
        }
        Ok(envs)
    }

    /// A scope holding one environment.
    fn scope_with(ctx: &Context, title: &str, location: Location, env: &Bindings) -> Context {
        let scope = ctx.child_scope(title, location);
        scope.bind_all(env);
        scope
    }

    fn holds(&mut self, predicate: &Expr, scope: &Context) -> Result<bool, EvalError> {
        self.eval_expr(predicate, scope)?.as_bool()
    }

    fn holds_opt(&mut self, predicate: Option<&Expr>, scope: &Context) -> Result<bool, EvalError> {
        match predicate {
            Some(p) => self.holds(p, scope),
            None => Ok(true),
        }
    }

    pub(super) fn eval_exists(
        &mut self,
        binds: &[MultipleBind],
        predicate: &Expr,
        location: Location,
        ctx: &Context,
    ) -> EvalResult {
        for env in self.bind_environments(binds, ctx)? {
            let scope = Self::scope_with(ctx, "exists", location, &env);
            if self.holds(predicate, &scope)? {
                return Ok(Value::bool(true));
            }
        }
        Ok(Value::bool(false))
    }

    pub(super) fn eval_forall(
        &mut self,
        binds: &[MultipleBind],
        predicate: &Expr,
        location: Location,
        ctx: &Context,
    ) -> EvalResult {
        for env in self.bind_environments(binds, ctx)? {
            let scope = Self::scope_with(ctx, "forall", location, &env);
            if !self.holds(predicate, &scope)? {
                return Ok(Value::bool(false));
            }
        }
        Ok(Value::bool(true))
    }

    /// Values of a single bind for which some environment satisfies the
    /// predicate. Stops once `limit` values are found.
    fn satisfying_values(
        &mut self,
        bind: &MultipleBind,
        predicate: &Expr,
        limit: usize,
        ctx: &Context,
    ) -> Result<Vec<Value>, EvalError> {
        let mut found = Vec::new();
        for value in self.bind_values(bind, ctx)? {
            let mut envs = vec![Bindings::new()];
            for pattern in &bind.patterns {
                let Ok(matches) = self.matcher.matches(pattern, &value) else {
                    envs.clear();
                    break;
                };
                envs = envs
                    .iter()
                    .flat_map(|env| matches.iter().filter_map(|m| env.merge(m, bind.location).ok()))
                    .collect();
            }
            for env in &envs {
                let scope = Self::scope_with(ctx, "quantifier", bind.location, env);
                if self.holds(predicate, &scope)? {
                    found.push(value.clone());
                    break;
                }
            }
            if found.len() >= limit {
                break;
            }
        }
        Ok(found)
    }

    pub(super) fn eval_exists1(
        &mut self,
        bind: &MultipleBind,
        predicate: &Expr,
        ctx: &Context,
    ) -> EvalResult {
        let found = self.satisfying_values(bind, predicate, 2, ctx)?;
        Ok(Value::bool(found.len() == 1))
    }

    pub(super) fn eval_iota(
        &mut self,
        bind: &MultipleBind,
        predicate: &Expr,
        ctx: &Context,
    ) -> EvalResult {
        let mut found = self.satisfying_values(bind, predicate, 2, ctx)?;
        match found.len() {
            0 => Err(iota_none()),
            1 => Ok(found.swap_remove(0)),
            _ => Err(iota_multiple()),
        }
    }

    /// The scope of the first environment satisfying `predicate`.
    pub(super) fn let_be_st_scope(
        &mut self,
        bind: &MultipleBind,
        predicate: Option<&Expr>,
        location: Location,
        ctx: &Context,
    ) -> Result<Context, EvalError> {
        for env in self.bind_environments(std::slice::from_ref(bind), ctx)? {
            let scope = Self::scope_with(ctx, "let be st", location, &env);
            if self.holds_opt(predicate, &scope)? {
                return Ok(scope);
            }
        }
        Err(let_be_st_none())
    }

    pub(super) fn eval_set_comp(
        &mut self,
        element: &Expr,
        binds: &[MultipleBind],
        predicate: Option<&Expr>,
        location: Location,
        ctx: &Context,
    ) -> EvalResult {
        let mut result = ValueSet::new();
        for env in self.bind_environments(binds, ctx)? {
            let scope = Self::scope_with(ctx, "set comprehension", location, &env);
            if self.holds_opt(predicate, &scope)? {
                result.insert(self.eval_expr(element, &scope)?);
            }
        }
        Ok(Value::set_from(result))
    }

    /// Sequence binds keep the sequence's order; set binds use value order.
    pub(super) fn eval_seq_comp(
        &mut self,
        element: &Expr,
        bind: &MultipleBind,
        predicate: Option<&Expr>,
        location: Location,
        ctx: &Context,
    ) -> EvalResult {
        let mut result = Vec::new();
        for env in self.bind_environments(std::slice::from_ref(bind), ctx)? {
            let scope = Self::scope_with(ctx, "seq comprehension", location, &env);
            if self.holds_opt(predicate, &scope)? {
                result.push(self.eval_expr(element, &scope)?);
            }
        }
        Ok(Value::seq(result))
    }

    pub(super) fn eval_map_comp(
        &mut self,
        key: &Expr,
        value: &Expr,
        binds: &[MultipleBind],
        predicate: Option<&Expr>,
        location: Location,
        ctx: &Context,
    ) -> EvalResult {
        let mut pairs = Vec::new();
        for env in self.bind_environments(binds, ctx)? {
            let scope = Self::scope_with(ctx, "map comprehension", location, &env);
            if self.holds_opt(predicate, &scope)? {
                pairs.push((self.eval_expr(key, &scope)?, self.eval_expr(value, &scope)?));
            }
        }
        Value::map(pairs)
    }
}
