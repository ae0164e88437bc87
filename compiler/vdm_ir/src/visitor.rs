//! Tree visitor.
//!
//! Default `visit_*` methods call the matching `walk_*` function, which
//! visits every child in source order. Override a `visit_*` method to act
//! on a node and call `walk_*` to keep descending.
//!
//! # Example
//!
//! ```text
//! struct CountVars(usize);
//!
//! impl<'ast> Visitor<'ast> for CountVars {
//!     fn visit_expr(&mut self, expr: &'ast Expr) {
//!         if let ExprKind::Var(_) = expr.kind {
//!             self.0 += 1;
//!         }
//!         walk_expr(self, expr);
//!     }
//! }
//! ```

use crate::ast::{
    BindKind, Definition, DefinitionKind, Designator, DesignatorKind, Expr, ExprKind, Module,
    MultipleBind, Pattern, PatternKind, Stmt, StmtKind,
};

pub trait Visitor<'ast> {
    fn visit_module(&mut self, module: &'ast Module) {
        walk_module(self, module);
    }

    fn visit_definition(&mut self, def: &'ast Definition) {
        walk_definition(self, def);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_pattern(&mut self, pattern: &'ast Pattern) {
        walk_pattern(self, pattern);
    }

    fn visit_bind(&mut self, bind: &'ast MultipleBind) {
        walk_bind(self, bind);
    }

    fn visit_designator(&mut self, designator: &'ast Designator) {
        walk_designator(self, designator);
    }
}

pub fn walk_module<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, module: &'ast Module) {
    for def in &module.definitions {
        visitor.visit_definition(def);
    }
}

pub fn walk_definition<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, def: &'ast Definition) {
    match &def.kind {
        DefinitionKind::Value { pattern, expr, .. } => {
            visitor.visit_pattern(pattern);
            visitor.visit_expr(expr);
        }
        DefinitionKind::Function(func) => {
            for p in &func.params {
                visitor.visit_pattern(p);
            }
            if let Some(pre) = &func.pre {
                visitor.visit_expr(pre);
            }
            if let Some(body) = &func.body {
                visitor.visit_expr(body);
            }
        }
        DefinitionKind::Operation(op) => {
            for p in &op.params {
                visitor.visit_pattern(p);
            }
            if let Some(pre) = &op.pre {
                visitor.visit_expr(pre);
            }
            if let Some(body) = &op.body {
                visitor.visit_stmt(body);
            }
        }
        DefinitionKind::InstanceVariable { init, .. } => {
            if let Some(init) = init {
                visitor.visit_expr(init);
            }
        }
        DefinitionKind::State(state) => {
            if let Some(init) = &state.init {
                visitor.visit_expr(init);
            }
        }
        DefinitionKind::Type(_) | DefinitionKind::Rename { .. } => {}
    }
}

pub fn walk_bind<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, bind: &'ast MultipleBind) {
    for p in &bind.patterns {
        visitor.visit_pattern(p);
    }
    match &bind.kind {
        BindKind::Set(e) | BindKind::Seq(e) => visitor.visit_expr(e),
        BindKind::Type(_) => {}
    }
}

pub fn walk_designator<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    designator: &'ast Designator,
) {
    match &designator.kind {
        DesignatorKind::Name(_) => {}
        DesignatorKind::Field(inner, _) => visitor.visit_designator(inner),
        DesignatorKind::Apply(inner, index) => {
            visitor.visit_designator(inner);
            visitor.visit_expr(index);
        }
    }
}

/// Sub-patterns are visited through `visit_pattern`; patterns contain no
/// expressions.
pub fn walk_pattern<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, pattern: &'ast Pattern) {
    match &pattern.kind {
        PatternKind::Set(items) | PatternKind::Seq(items) => {
            for p in items {
                visitor.visit_pattern(p);
            }
        }
        PatternKind::Record { fields, .. } => {
            for p in fields {
                visitor.visit_pattern(p);
            }
        }
        PatternKind::Object { fields, .. } => {
            for (_, p) in fields {
                visitor.visit_pattern(p);
            }
        }
        PatternKind::Concat(l, r) | PatternKind::Union(l, r) => {
            visitor.visit_pattern(l);
            visitor.visit_pattern(r);
        }
        _ => {}
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Bool(_)
        | ExprKind::Char(_)
        | ExprKind::Int(_)
        | ExprKind::Real(_)
        | ExprKind::Quote(_)
        | ExprKind::Str(_)
        | ExprKind::Nil
        | ExprKind::Undefined
        | ExprKind::SelfRef
        | ExprKind::Var(_) => {}

        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand),
        ExprKind::MkToken(inner)
        | ExprKind::Field { object: inner, .. }
        | ExprKind::IsType { expr: inner, .. }
        | ExprKind::Instantiate {
            function: inner, ..
        } => visitor.visit_expr(inner),
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::SetRange { low, high } => {
            visitor.visit_expr(low);
            visitor.visit_expr(high);
        }

        ExprKind::If {
            cond,
            then_branch,
            elseifs,
            else_branch,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_expr(then_branch);
            for (c, e) in elseifs {
                visitor.visit_expr(c);
                visitor.visit_expr(e);
            }
            visitor.visit_expr(else_branch);
        }
        ExprKind::Cases {
            selector,
            alternatives,
            others,
        } => {
            visitor.visit_expr(selector);
            for alt in alternatives {
                for p in &alt.patterns {
                    visitor.visit_pattern(p);
                }
                visitor.visit_expr(&alt.result);
            }
            if let Some(others) = others {
                visitor.visit_expr(others);
            }
        }

        ExprKind::SetEnum(items) | ExprKind::SeqEnum(items) => {
            for e in items {
                visitor.visit_expr(e);
            }
        }
        ExprKind::MkRecord { args, .. } | ExprKind::New { args, .. } => {
            for e in args {
                visitor.visit_expr(e);
            }
        }
        ExprKind::MapEnum(pairs) => {
            for (k, v) in pairs {
                visitor.visit_expr(k);
                visitor.visit_expr(v);
            }
        }
        ExprKind::SetComp {
            element,
            binds,
            predicate,
        } => {
            for b in binds {
                visitor.visit_bind(b);
            }
            visitor.visit_expr(element);
            if let Some(p) = predicate {
                visitor.visit_expr(p);
            }
        }
        ExprKind::SeqComp {
            element,
            bind,
            predicate,
        } => {
            visitor.visit_bind(bind);
            visitor.visit_expr(element);
            if let Some(p) = predicate {
                visitor.visit_expr(p);
            }
        }
        ExprKind::MapComp {
            key,
            value,
            binds,
            predicate,
        } => {
            for b in binds {
                visitor.visit_bind(b);
            }
            visitor.visit_expr(key);
            visitor.visit_expr(value);
            if let Some(p) = predicate {
                visitor.visit_expr(p);
            }
        }
        ExprKind::SubSeq { seq, from, to } => {
            visitor.visit_expr(seq);
            visitor.visit_expr(from);
            visitor.visit_expr(to);
        }
        ExprKind::Mu {
            record,
            modifications,
        } => {
            visitor.visit_expr(record);
            for (_, e) in modifications {
                visitor.visit_expr(e);
            }
        }
        ExprKind::Apply { root, args } => {
            visitor.visit_expr(root);
            for e in args {
                visitor.visit_expr(e);
            }
        }
        ExprKind::Lambda { params, body } => {
            for p in params {
                visitor.visit_pattern(p);
            }
            visitor.visit_expr(body);
        }

        ExprKind::Let { defs, body } => {
            for d in defs {
                visitor.visit_definition(d);
            }
            visitor.visit_expr(body);
        }
        ExprKind::Def { bindings, body } => {
            for (p, e) in bindings {
                visitor.visit_pattern(p);
                visitor.visit_expr(e);
            }
            visitor.visit_expr(body);
        }
        ExprKind::LetBeSt {
            bind,
            predicate,
            body,
        } => {
            visitor.visit_bind(bind);
            if let Some(p) = predicate {
                visitor.visit_expr(p);
            }
            visitor.visit_expr(body);
        }
        ExprKind::Exists { binds, predicate } | ExprKind::Forall { binds, predicate } => {
            for b in binds {
                visitor.visit_bind(b);
            }
            visitor.visit_expr(predicate);
        }
        ExprKind::Exists1 { bind, predicate } | ExprKind::Iota { bind, predicate } => {
            visitor.visit_bind(bind);
            visitor.visit_expr(predicate);
        }
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Block { dcls, body } => {
            for dcl in dcls {
                if let Some(init) = &dcl.init {
                    visitor.visit_expr(init);
                }
            }
            for s in body {
                visitor.visit_stmt(s);
            }
        }
        StmtKind::Assign { target, value } => {
            visitor.visit_designator(target);
            visitor.visit_expr(value);
        }
        StmtKind::Atomic(assigns) => {
            for s in assigns {
                visitor.visit_stmt(s);
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            elseifs,
            else_branch,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(then_branch);
            for (c, s) in elseifs {
                visitor.visit_expr(c);
                visitor.visit_stmt(s);
            }
            if let Some(s) = else_branch {
                visitor.visit_stmt(s);
            }
        }
        StmtKind::Cases {
            selector,
            alternatives,
            others,
        } => {
            visitor.visit_expr(selector);
            for alt in alternatives {
                for p in &alt.patterns {
                    visitor.visit_pattern(p);
                }
                visitor.visit_stmt(&alt.body);
            }
            if let Some(s) = others {
                visitor.visit_stmt(s);
            }
        }
        StmtKind::While { cond, body } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(body);
        }
        StmtKind::ForSeq {
            pattern, seq, body, ..
        } => {
            visitor.visit_pattern(pattern);
            visitor.visit_expr(seq);
            visitor.visit_stmt(body);
        }
        StmtKind::ForSet { pattern, set, body } => {
            visitor.visit_pattern(pattern);
            visitor.visit_expr(set);
            visitor.visit_stmt(body);
        }
        StmtKind::ForIndex {
            from, to, by, body, ..
        } => {
            visitor.visit_expr(from);
            visitor.visit_expr(to);
            if let Some(by) = by {
                visitor.visit_expr(by);
            }
            visitor.visit_stmt(body);
        }
        StmtKind::Return(value) => {
            if let Some(e) = value {
                visitor.visit_expr(e);
            }
        }
        StmtKind::Call { root, args } => {
            visitor.visit_expr(root);
            for e in args {
                visitor.visit_expr(e);
            }
        }
        StmtKind::Let { defs, body } => {
            for d in defs {
                visitor.visit_definition(d);
            }
            visitor.visit_stmt(body);
        }
        StmtKind::Def { bindings, body } => {
            for (p, e) in bindings {
                visitor.visit_pattern(p);
                visitor.visit_expr(e);
            }
            visitor.visit_stmt(body);
        }
        StmtKind::LetBeSt {
            bind,
            predicate,
            body,
        } => {
            visitor.visit_bind(bind);
            if let Some(p) = predicate {
                visitor.visit_expr(p);
            }
            visitor.visit_stmt(body);
        }
        StmtKind::Skip | StmtKind::Error => {}
    }
}
