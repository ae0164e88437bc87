//! Tree builders shared by the evaluator's unit tests.
//!
//! Nodes get `Location::DUMMY` unless placed explicitly with [`on_line`]
//! or [`stmt_on_line`], so only the nodes a test cares about carry a real
//! location.

use std::sync::Arc;

use vdm_ir::{
    BinaryOp, BindKind, Dcl, Definition, DefinitionKind, Designator, DesignatorKind, Expr,
    ExprKind, FunctionDef, Location, Module, ModuleKind, MultipleBind, Name, OperationDef, Pattern,
    RecordField, RecordType, Stmt, StmtKind, Type,
};

pub(crate) const FILE: &str = "test.vdm";

pub(crate) fn name(s: &str) -> Name {
    Name::intern(s)
}

pub(crate) fn line(n: u32) -> Location {
    Location::at(name(FILE), n, 1)
}

pub(crate) fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Location::DUMMY)
}

pub(crate) fn on_line(n: u32, mut e: Expr) -> Expr {
    e.location = line(n);
    e
}

pub(crate) fn int(i: i64) -> Expr {
    expr(ExprKind::Int(i))
}

pub(crate) fn boolean(b: bool) -> Expr {
    expr(ExprKind::Bool(b))
}

pub(crate) fn var(s: &str) -> Expr {
    expr(ExprKind::Var(name(s)))
}

pub(crate) fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub(crate) fn set(items: Vec<Expr>) -> Expr {
    expr(ExprKind::SetEnum(items))
}

pub(crate) fn seq(items: Vec<Expr>) -> Expr {
    expr(ExprKind::SeqEnum(items))
}

pub(crate) fn apply(callee: Expr, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Apply {
        root: Box::new(callee),
        args,
    })
}

pub(crate) fn call(f: &str, args: Vec<Expr>) -> Expr {
    apply(var(f), args)
}

pub(crate) fn field(object: Expr, f: &str) -> Expr {
    expr(ExprKind::Field {
        object: Box::new(object),
        field: name(f),
    })
}

pub(crate) fn new_object(class: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::New {
        class: name(class),
        args,
    })
}

pub(crate) fn ident(s: &str) -> Pattern {
    Pattern::ident(name(s))
}

pub(crate) fn set_bind(names: &[&str], source: Expr) -> MultipleBind {
    MultipleBind::new(
        names.iter().map(|n| ident(n)).collect(),
        BindKind::Set(source),
        Location::DUMMY,
    )
}

pub(crate) fn record_type(tag: &str, fields: &[(&str, Type)]) -> Arc<RecordType> {
    Arc::new(RecordType::new(
        name(tag),
        fields
            .iter()
            .map(|(f, ty)| RecordField::new(name(f), ty.clone()))
            .collect(),
    ))
}

pub(crate) fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Location::DUMMY)
}

pub(crate) fn stmt_on_line(n: u32, mut s: Stmt) -> Stmt {
    s.location = line(n);
    s
}

pub(crate) fn block(dcls: Vec<Dcl>, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Block { dcls, body })
}

pub(crate) fn dcl(n: &str, init: Option<Expr>) -> Dcl {
    Dcl {
        name: name(n),
        ty: Type::Int,
        init,
        location: Location::DUMMY,
    }
}

pub(crate) fn target(n: &str) -> Designator {
    Designator::new(DesignatorKind::Name(name(n)), Location::DUMMY)
}

pub(crate) fn assign(n: &str, value: Expr) -> Stmt {
    assign_to(target(n), value)
}

pub(crate) fn assign_to(target: Designator, value: Expr) -> Stmt {
    stmt(StmtKind::Assign { target, value })
}

pub(crate) fn ret(value: Expr) -> Stmt {
    stmt(StmtKind::Return(Some(value)))
}

pub(crate) fn value_def(n: &str, value: Expr) -> Definition {
    Definition::value(ident(n), value)
}

pub(crate) fn function(n: &str, params: &[&str], body: Expr) -> Definition {
    let params = params.iter().map(|p| ident(p)).collect();
    Definition::function(FunctionDef::new(name(n), params, body), Location::DUMMY)
}

pub(crate) fn polymorphic(n: &str, type_params: &[&str], params: &[&str], body: Expr) -> Definition {
    let params = params.iter().map(|p| ident(p)).collect();
    let mut def = FunctionDef::new(name(n), params, body);
    def.type_params = type_params.iter().map(|t| name(t)).collect();
    Definition::function(def, Location::DUMMY)
}

pub(crate) fn operation(n: &str, params: &[&str], body: Stmt) -> Definition {
    let params = params.iter().map(|p| ident(p)).collect();
    Definition::operation(OperationDef::new(name(n), params, body), Location::DUMMY)
}

pub(crate) fn instance_variable(n: &str, init: Expr) -> Definition {
    Definition::new(
        name(n),
        DefinitionKind::InstanceVariable {
            ty: Type::Int,
            init: Some(init),
        },
        Location::DUMMY,
    )
}

pub(crate) fn module(n: &str, defs: Vec<Definition>) -> Module {
    Module::new(name(n), ModuleKind::Module, defs)
}

pub(crate) fn class(n: &str, defs: Vec<Definition>) -> Module {
    Module::new(name(n), ModuleKind::Class, defs)
}
