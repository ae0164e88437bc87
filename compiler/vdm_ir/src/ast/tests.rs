use pretty_assertions::assert_eq;

use super::*;
use crate::{Location, Name};

fn loc(line: u32) -> Location {
    Location::new(Name::intern("finder.vdmsl"), line, 1, line, 20)
}

fn module() -> Module {
    // operations op() == (x := 1; while x < 3 do x := x + 1)
    let assign = |line: u32, value: Expr| {
        Stmt::new(
            StmtKind::Assign {
                target: Designator::new(DesignatorKind::Name(Name::intern("x")), loc(line)),
                value,
            },
            loc(line),
        )
    };
    let cond = Expr::new(
        ExprKind::Binary {
            op: BinaryOp::Lt,
            left: Box::new(Expr::new(ExprKind::Var(Name::intern("x")), loc(4))),
            right: Box::new(Expr::new(ExprKind::Int(3), loc(4))),
        },
        loc(4),
    );
    let body = Stmt::new(
        StmtKind::Block {
            dcls: vec![],
            body: vec![
                assign(3, Expr::new(ExprKind::Int(1), loc(3))),
                Stmt::new(
                    StmtKind::While {
                        cond,
                        body: Box::new(assign(5, Expr::new(ExprKind::Int(2), loc(5)))),
                    },
                    loc(4),
                ),
            ],
        },
        loc(2),
    );
    let op = Definition::operation(OperationDef::new(Name::intern("op"), vec![], body), loc(1));
    Module::new(Name::intern("Finder"), ModuleKind::Module, vec![op])
}

#[test]
fn module_collects_files() {
    let m = module();
    assert_eq!(m.files, vec![Name::intern("finder.vdmsl")]);
    let list = ModuleList::new(vec![m]);
    assert_eq!(list.source_files(), vec![Name::intern("finder.vdmsl")]);
    assert!(list.find_module(Name::intern("Finder")).is_some());
    assert!(list.find_module(Name::intern("Missing")).is_none());
}

#[test]
fn find_statement_by_line() {
    let list = ModuleList::new(vec![module()]);
    let file = Name::intern("finder.vdmsl");
    let stmt = list.find_statement(file, 4);
    assert!(matches!(stmt.map(|s| &s.kind), Some(StmtKind::While { .. })));
    let stmt = list.find_statement(file, 5);
    assert!(matches!(stmt.map(|s| &s.kind), Some(StmtKind::Assign { .. })));
    assert!(list.find_statement(file, 40).is_none());
    assert!(list.find_statement(Name::intern("other.vdmsl"), 4).is_none());
}

#[test]
fn find_expression_by_line() {
    let list = ModuleList::new(vec![module()]);
    let file = Name::intern("finder.vdmsl");
    let expr = list.find_expression(file, 4);
    assert!(matches!(
        expr.map(|e| &e.kind),
        Some(ExprKind::Binary {
            op: BinaryOp::Lt,
            ..
        })
    ));
    let expr = list.find_expression(file, 3);
    assert!(matches!(expr.map(|e| &e.kind), Some(ExprKind::Int(1))));
}

#[test]
fn designator_root() {
    let d = Designator::new(
        DesignatorKind::Field(
            Box::new(Designator::new(
                DesignatorKind::Name(Name::intern("rec")),
                Location::DUMMY,
            )),
            Name::intern("f"),
        ),
        Location::DUMMY,
    );
    assert_eq!(d.root(), Name::intern("rec"));
}
