//! Statement evaluation.

use vdm_ir::{Location, Pattern, Stmt, StmtKind};
use vdm_patterns::errors::{error_statement, zero_loop_step};
use vdm_patterns::{Context, EvalResult, Value};

use super::Interpreter;

impl Interpreter {
    pub(super) fn eval_stmt_inner(&mut self, stmt: &Stmt, ctx: &Context) -> EvalResult {
        let location = stmt.location;
        match &stmt.kind {
            StmtKind::Block { dcls, body } => {
                let scope = ctx.child_scope("block", location);
                for dcl in dcls {
                    let value = match &dcl.init {
                        Some(init) => self.eval_expr(init, &scope)?,
                        None => Value::Undefined,
                    };
                    scope.declare(dcl.name, value);
                }
                self.eval_sequence(body, &scope)
            }
            StmtKind::Assign { target, value } => {
                let value = self.eval_expr(value, ctx)?;
                self.assign(target, value, ctx)?;
                Ok(Value::Void)
            }
            StmtKind::Atomic(stmts) => {
                // Every right-hand side sees the state before any assignment.
                let mut pending = Vec::with_capacity(stmts.len());
                for s in stmts {
                    if let StmtKind::Assign { target, value } = &s.kind {
                        pending.push((target, self.eval_expr(value, ctx)?));
                    }
                }
                for (target, value) in pending {
                    self.assign(target, value, ctx)?;
                }
                Ok(Value::Void)
            }
            StmtKind::If {
                cond,
                then_branch,
                elseifs,
                else_branch,
            } => {
                if self.eval_expr(cond, ctx)?.as_bool()? {
                    return self.eval_stmt(then_branch, ctx);
                }
                for (elseif_cond, branch) in elseifs {
                    if self.eval_expr(elseif_cond, ctx)?.as_bool()? {
                        return self.eval_stmt(branch, ctx);
                    }
                }
                match else_branch {
                    Some(branch) => self.eval_stmt(branch, ctx),
                    None => Ok(Value::Void),
                }
            }
            StmtKind::Cases {
                selector,
                alternatives,
                others,
            } => {
                let value = self.eval_expr(selector, ctx)?;
                if let Some((alt, scope)) = self.select_case(alternatives, &value, location, ctx) {
                    return self.eval_stmt(&alt.body, &scope);
                }
                match others {
                    Some(others) => self.eval_stmt(others, ctx),
                    None => Ok(Value::Void),
                }
            }
            StmtKind::While { cond, body } => {
                while self.eval_expr(cond, ctx)?.as_bool()? {
                    let result = self.eval_stmt(body, ctx)?;
                    if !result.is_void() {
                        return Ok(result);
                    }
                }
                Ok(Value::Void)
            }
            StmtKind::ForSeq {
                pattern,
                seq,
                reverse,
                body,
            } => {
                let mut items = self.eval_expr(seq, ctx)?.as_seq()?.to_vec();
                if *reverse {
                    items.reverse();
                }
                self.eval_for(pattern, items, body, location, ctx)
            }
            StmtKind::ForSet { pattern, set, body } => {
                let items = self.eval_expr(set, ctx)?.as_set()?.iter().cloned().collect();
                self.eval_for(pattern, items, body, location, ctx)
            }
            StmtKind::ForIndex {
                var,
                from,
                to,
                by,
                body,
            } => {
                let from = self.eval_expr(from, ctx)?.as_int()?;
                let to = self.eval_expr(to, ctx)?.as_int()?;
                let by = match by {
                    Some(by) => self.eval_expr(by, ctx)?.as_int()?,
                    None => 1,
                };
                if by == 0 {
                    return Err(zero_loop_step());
                }
                let mut i = from;
                while (by > 0 && i <= to) || (by < 0 && i >= to) {
                    let scope = ctx.child_scope("for", location);
                    scope.bind(*var, Value::int(i));
                    let result = self.eval_stmt(body, &scope)?;
                    if !result.is_void() {
                        return Ok(result);
                    }
                    let Some(next) = i.checked_add(by) else {
                        break;
                    };
                    i = next;
                }
                Ok(Value::Void)
            }
            StmtKind::Return(None) => Ok(Value::VoidReturn),
            StmtKind::Return(Some(expr)) => self.eval_expr(expr, ctx),
            StmtKind::Skip => Ok(Value::Void),
            StmtKind::Call { root, args } => {
                let callee = self.eval_expr(root, ctx)?;
                let args = self.eval_all(args, ctx)?;
                self.apply(&callee, args, location, ctx)
            }
            StmtKind::Let { defs, body } => {
                let scope = self.bind_definitions(defs, location, ctx)?;
                self.eval_stmt(body, &scope)
            }
            StmtKind::Def { bindings, body } => {
                let scope = self.def_scope(bindings, location, ctx)?;
                self.eval_stmt(body, &scope)
            }
            StmtKind::LetBeSt {
                bind,
                predicate,
                body,
            } => {
                let scope = self.let_be_st_scope(bind, predicate.as_ref(), location, ctx)?;
                self.eval_stmt(body, &scope)
            }
            StmtKind::Error => Err(error_statement()),
        }
    }

    /// Run statements in order until one produces a value.
    fn eval_sequence(&mut self, body: &[Stmt], ctx: &Context) -> EvalResult {
        for stmt in body {
            let result = self.eval_stmt(stmt, ctx)?;
            if !result.is_void() {
                return Ok(result);
            }
        }
        Ok(Value::Void)
    }

    /// Loop over `items`; elements the pattern does not match are skipped.
    fn eval_for(
        &mut self,
        pattern: &Pattern,
        items: Vec<Value>,
        body: &Stmt,
        location: Location,
        ctx: &Context,
    ) -> EvalResult {
        for item in items {
            let Ok(envs) = self.matcher.matches(pattern, &item) else {
                continue;
            };
            let scope = ctx.child_scope("for", location);
            if let Some(env) = envs.first() {
                scope.bind_all(env);
            }
            let result = self.eval_stmt(body, &scope)?;
            if !result.is_void() {
                return Ok(result);
            }
        }
        Ok(Value::Void)
    }
}
