//! Patterns and multiple binds.

use std::sync::Arc;

use smallvec::SmallVec;

use super::Expr;
use crate::{Location, Name, RecordType, Type};

#[derive(Clone, Debug)]
pub struct Pattern {
    pub kind: PatternKind,
    pub location: Location,
}

#[derive(Clone, Debug)]
pub enum PatternKind {
    /// Always matches, binding the name.
    Identifier(Name),
    /// `-`: always matches, binds nothing.
    Ignore,
    Bool(bool),
    Char(char),
    Int(i64),
    Real(f64),
    Quote(Name),
    Str(String),
    Nil,
    /// `{p1, ..., pn}`: matched against every bijection onto the set.
    Set(Vec<Pattern>),
    /// `[p1, ..., pn]`: positional.
    Seq(Vec<Pattern>),
    /// `mk_R(p1, ..., pn)`
    Record {
        ty: Arc<RecordType>,
        fields: Vec<Pattern>,
    },
    /// `obj_C(f1 |-> p1, ...)`
    Object {
        class: Name,
        fields: Vec<(Name, Pattern)>,
    },
    /// `p1 ^ p2`
    Concat(Box<Pattern>, Box<Pattern>),
    /// `p1 union p2`
    Union(Box<Pattern>, Box<Pattern>),
}

impl Pattern {
    pub fn new(kind: PatternKind, location: Location) -> Self {
        Pattern { kind, location }
    }

    /// Identifier pattern with a dummy location.
    pub fn ident(name: Name) -> Self {
        Pattern::new(PatternKind::Identifier(name), Location::DUMMY)
    }

    /// Names this pattern binds, in left-to-right order, without duplicates.
    pub fn bound_names(&self) -> SmallVec<[Name; 4]> {
        let mut names = SmallVec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, out: &mut SmallVec<[Name; 4]>) {
        match &self.kind {
            PatternKind::Identifier(name) => {
                if !out.contains(name) {
                    out.push(*name);
                }
            }
            PatternKind::Set(items) | PatternKind::Seq(items) => {
                for p in items {
                    p.collect_names(out);
                }
            }
            PatternKind::Record { fields, .. } => {
                for p in fields {
                    p.collect_names(out);
                }
            }
            PatternKind::Object { fields, .. } => {
                for (_, p) in fields {
                    p.collect_names(out);
                }
            }
            PatternKind::Concat(l, r) | PatternKind::Union(l, r) => {
                l.collect_names(out);
                r.collect_names(out);
            }
            PatternKind::Ignore
            | PatternKind::Bool(_)
            | PatternKind::Char(_)
            | PatternKind::Int(_)
            | PatternKind::Real(_)
            | PatternKind::Quote(_)
            | PatternKind::Str(_)
            | PatternKind::Nil => {}
        }
    }

    /// A plain identifier pattern can be bound without a full match.
    pub fn as_identifier(&self) -> Option<Name> {
        match self.kind {
            PatternKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

/// `p1, ..., pn in set S`, `... in seq S` or `... : T`.
#[derive(Clone, Debug)]
pub struct MultipleBind {
    pub patterns: Vec<Pattern>,
    pub kind: BindKind,
    pub location: Location,
}

#[derive(Clone, Debug)]
pub enum BindKind {
    Set(Expr),
    Seq(Expr),
    /// Type binds are enumerable only over finite types.
    Type(Type),
}

impl MultipleBind {
    pub fn new(patterns: Vec<Pattern>, kind: BindKind, location: Location) -> Self {
        MultipleBind {
            patterns,
            kind,
            location,
        }
    }

    /// The collection expression, for set and sequence binds.
    pub fn source(&self) -> Option<&Expr> {
        match &self.kind {
            BindKind::Set(e) | BindKind::Seq(e) => Some(e),
            BindKind::Type(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_names_dedupes_and_orders() {
        let x = Name::intern("x");
        let y = Name::intern("y");
        let pat = Pattern::new(
            PatternKind::Seq(vec![
                Pattern::ident(x),
                Pattern::new(PatternKind::Ignore, Location::DUMMY),
                Pattern::new(
                    PatternKind::Set(vec![Pattern::ident(y), Pattern::ident(x)]),
                    Location::DUMMY,
                ),
            ]),
            Location::DUMMY,
        );
        assert_eq!(pat.bound_names().as_slice(), &[x, y]);
    }
}
