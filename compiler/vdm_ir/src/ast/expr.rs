//! Expression nodes.

use std::fmt;
use std::sync::Arc;

use super::{Definition, MultipleBind, Pattern};
use crate::{Location, Name, RecordType, Type};

/// Expression node.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Location,
}

impl Expr {
    pub fn new(kind: ExprKind, location: Location) -> Self {
        Expr { kind, location }
    }
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    // Literals
    Bool(bool),
    Char(char),
    Int(i64),
    Real(f64),
    Quote(Name),
    /// String literal; evaluates to a sequence of characters.
    Str(String),
    Nil,
    Undefined,
    SelfRef,

    Var(Name),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        elseifs: Vec<(Expr, Expr)>,
        else_branch: Box<Expr>,
    },
    Cases {
        selector: Box<Expr>,
        alternatives: Vec<CaseAlternative>,
        others: Option<Box<Expr>>,
    },

    SetEnum(Vec<Expr>),
    SetRange {
        low: Box<Expr>,
        high: Box<Expr>,
    },
    SeqEnum(Vec<Expr>),
    MapEnum(Vec<(Expr, Expr)>),
    SetComp {
        element: Box<Expr>,
        binds: Vec<MultipleBind>,
        predicate: Option<Box<Expr>>,
    },
    /// Sequence comprehension over a single set or sequence bind.
    SeqComp {
        element: Box<Expr>,
        bind: Box<MultipleBind>,
        predicate: Option<Box<Expr>>,
    },
    MapComp {
        key: Box<Expr>,
        value: Box<Expr>,
        binds: Vec<MultipleBind>,
        predicate: Option<Box<Expr>>,
    },
    /// `s(from, ..., to)`, 1-based and inclusive.
    SubSeq {
        seq: Box<Expr>,
        from: Box<Expr>,
        to: Box<Expr>,
    },

    MkRecord {
        ty: Arc<RecordType>,
        args: Vec<Expr>,
    },
    MkToken(Box<Expr>),
    Field {
        object: Box<Expr>,
        field: Name,
    },
    Mu {
        record: Box<Expr>,
        modifications: Vec<(Name, Expr)>,
    },
    IsType {
        expr: Box<Expr>,
        ty: Type,
    },
    New {
        class: Name,
        args: Vec<Expr>,
    },

    Apply {
        root: Box<Expr>,
        args: Vec<Expr>,
    },
    Lambda {
        params: Vec<Pattern>,
        body: Arc<Expr>,
    },
    /// Explicit instantiation of a polymorphic function: `f[nat]`.
    Instantiate {
        function: Box<Expr>,
        types: Vec<Type>,
    },

    Let {
        defs: Vec<Definition>,
        body: Box<Expr>,
    },
    Def {
        bindings: Vec<(Pattern, Expr)>,
        body: Box<Expr>,
    },
    LetBeSt {
        bind: Box<MultipleBind>,
        predicate: Option<Box<Expr>>,
        body: Box<Expr>,
    },
    Exists {
        binds: Vec<MultipleBind>,
        predicate: Box<Expr>,
    },
    Exists1 {
        bind: Box<MultipleBind>,
        predicate: Box<Expr>,
    },
    Forall {
        binds: Vec<MultipleBind>,
        predicate: Box<Expr>,
    },
    Iota {
        bind: Box<MultipleBind>,
        predicate: Box<Expr>,
    },
}

/// One `cases` alternative: `p1, p2 -> result`.
#[derive(Clone, Debug)]
pub struct CaseAlternative {
    pub patterns: Vec<Pattern>,
    pub result: Expr,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    Abs,
    Floor,
    Card,
    DistUnion,
    DistInter,
    PowerSet,
    Dom,
    Rng,
    Len,
    Head,
    Tail,
    Elems,
    Inds,
    DistConc,
    Reverse,
}

impl UnaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Abs => "abs",
            UnaryOp::Floor => "floor",
            UnaryOp::Card => "card",
            UnaryOp::DistUnion => "dunion",
            UnaryOp::DistInter => "dinter",
            UnaryOp::PowerSet => "power",
            UnaryOp::Dom => "dom",
            UnaryOp::Rng => "rng",
            UnaryOp::Len => "len",
            UnaryOp::Head => "hd",
            UnaryOp::Tail => "tl",
            UnaryOp::Elems => "elems",
            UnaryOp::Inds => "inds",
            UnaryOp::DistConc => "conc",
            UnaryOp::Reverse => "reverse",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Rem,
    Mod,
    Pow,
    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    // Boolean, short-circuit
    And,
    Or,
    Implies,
    Equiv,
    // Sets
    InSet,
    NotInSet,
    Union,
    Inter,
    Difference,
    Subset,
    ProperSubset,
    // Sequences
    Concat,
    // Maps
    MapUnion,
    Override,
    DomRestrictTo,
    DomRestrictBy,
    RngRestrictTo,
    RngRestrictBy,
    Comp,
}

impl BinaryOp {
    /// Boolean connectives evaluate their right operand conditionally.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinaryOp::And | BinaryOp::Or | BinaryOp::Implies | BinaryOp::Equiv
        )
    }

    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::IntDiv => "div",
            BinaryOp::Rem => "rem",
            BinaryOp::Mod => "mod",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Implies => "=>",
            BinaryOp::Equiv => "<=>",
            BinaryOp::InSet => "in set",
            BinaryOp::NotInSet => "not in set",
            BinaryOp::Union => "union",
            BinaryOp::Inter => "inter",
            BinaryOp::Difference => "\\",
            BinaryOp::Subset => "subset",
            BinaryOp::ProperSubset => "psubset",
            BinaryOp::Concat => "^",
            BinaryOp::MapUnion => "munion",
            BinaryOp::Override => "++",
            BinaryOp::DomRestrictTo => "<:",
            BinaryOp::DomRestrictBy => "<-:",
            BinaryOp::RngRestrictTo => ":>",
            BinaryOp::RngRestrictBy => ":->",
            BinaryOp::Comp => "comp",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}
