//! Statement nodes.

use super::{Definition, Expr, MultipleBind, Pattern};
use crate::{Location, Name, Type};

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: Location,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: Location) -> Self {
        Stmt { kind, location }
    }
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    /// `( dcl ...; s1; s2 )`
    Block {
        dcls: Vec<Dcl>,
        body: Vec<Stmt>,
    },
    Assign {
        target: Designator,
        value: Expr,
    },
    /// `atomic (a1; a2)`: right-hand sides are all evaluated before any
    /// assignment happens. Every statement is an `Assign`.
    Atomic(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        elseifs: Vec<(Expr, Stmt)>,
        else_branch: Option<Box<Stmt>>,
    },
    Cases {
        selector: Expr,
        alternatives: Vec<CaseStmtAlternative>,
        others: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    /// `for p in s do` / `for p in reverse s do`
    ForSeq {
        pattern: Pattern,
        seq: Expr,
        reverse: bool,
        body: Box<Stmt>,
    },
    /// `for all p in set s do`
    ForSet {
        pattern: Pattern,
        set: Expr,
        body: Box<Stmt>,
    },
    /// `for i = e1 to e2 by e3 do`
    ForIndex {
        var: Name,
        from: Expr,
        to: Expr,
        by: Option<Expr>,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Skip,
    /// Operation call; `root` evaluates to an operation value.
    Call {
        root: Expr,
        args: Vec<Expr>,
    },
    Let {
        defs: Vec<Definition>,
        body: Box<Stmt>,
    },
    Def {
        bindings: Vec<(Pattern, Expr)>,
        body: Box<Stmt>,
    },
    LetBeSt {
        bind: Box<MultipleBind>,
        predicate: Option<Expr>,
        body: Box<Stmt>,
    },
    Error,
}

/// `dcl x : T := e`
#[derive(Clone, Debug)]
pub struct Dcl {
    pub name: Name,
    pub ty: Type,
    pub init: Option<Expr>,
    pub location: Location,
}

#[derive(Clone, Debug)]
pub struct CaseStmtAlternative {
    pub patterns: Vec<Pattern>,
    pub body: Stmt,
}

/// Assignment target.
#[derive(Clone, Debug)]
pub struct Designator {
    pub kind: DesignatorKind,
    pub location: Location,
}

#[derive(Clone, Debug)]
pub enum DesignatorKind {
    Name(Name),
    /// `d.field`: record field or object instance variable.
    Field(Box<Designator>, Name),
    /// `d(index)`: map key or 1-based sequence index.
    Apply(Box<Designator>, Box<Expr>),
}

impl Designator {
    pub fn new(kind: DesignatorKind, location: Location) -> Self {
        Designator { kind, location }
    }

    /// The variable at the root of the designator.
    pub fn root(&self) -> Name {
        match &self.kind {
            DesignatorKind::Name(name) => *name,
            DesignatorKind::Field(inner, _) | DesignatorKind::Apply(inner, _) => inner.root(),
        }
    }
}
