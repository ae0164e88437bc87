//! Runtime type descriptors.
//!
//! Types reach the evaluator already checked; the interpreter needs them
//! only to validate record construction, evaluate `is_` tests, enumerate
//! type binds over finite types, and to describe values in diagnostics.

use std::fmt;
use std::sync::Arc;

use crate::Name;

/// A record type's declared shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordType {
    pub name: Name,
    pub fields: Vec<RecordField>,
}

impl RecordType {
    pub fn new(name: Name, fields: Vec<RecordField>) -> Self {
        RecordType { name, fields }
    }

    /// Position of a field tag.
    pub fn field_index(&self, tag: Name) -> Option<usize> {
        self.fields.iter().position(|f| f.tag == tag)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordField {
    pub tag: Name,
    pub ty: Type,
}

impl RecordField {
    pub fn new(tag: Name, ty: Type) -> Self {
        RecordField { tag, ty }
    }
}

/// Runtime type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    Nat1,
    Nat,
    Int,
    Rat,
    Real,
    Char,
    Token,
    Quote(Name),
    Set(Box<Type>),
    Seq(Box<Type>),
    Seq1(Box<Type>),
    Map(Box<Type>, Box<Type>),
    InMap(Box<Type>, Box<Type>),
    Product(Vec<Type>),
    Record(Arc<RecordType>),
    Union(Vec<Type>),
    Optional(Box<Type>),
    /// A named alias for another type.
    Named(Name, Box<Type>),
    Class(Name),
    Function(Vec<Type>, Box<Type>),
    Operation(Vec<Type>, Box<Type>),
    /// Unresolved type parameter of a polymorphic function.
    Param(Name),
    Unit,
    /// Checked elsewhere; every value conforms.
    Unknown,
}

impl Type {
    /// Strip `Named` wrappers.
    pub fn resolve(&self) -> &Type {
        let mut ty = self;
        while let Type::Named(_, inner) = ty {
            ty = inner;
        }
        ty
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.resolve(),
            Type::Nat1 | Type::Nat | Type::Int | Type::Rat | Type::Real
        )
    }

    /// Substitute type parameters by name.
    pub fn instantiate(&self, args: &[(Name, Type)]) -> Type {
        let inst = |t: &Type| Box::new(t.instantiate(args));
        match self {
            Type::Param(p) => args
                .iter()
                .find(|(name, _)| name == p)
                .map_or_else(|| self.clone(), |(_, ty)| ty.clone()),
            Type::Set(t) => Type::Set(inst(t)),
            Type::Seq(t) => Type::Seq(inst(t)),
            Type::Seq1(t) => Type::Seq1(inst(t)),
            Type::Map(k, v) => Type::Map(inst(k), inst(v)),
            Type::InMap(k, v) => Type::InMap(inst(k), inst(v)),
            Type::Optional(t) => Type::Optional(inst(t)),
            Type::Product(ts) => Type::Product(ts.iter().map(|t| t.instantiate(args)).collect()),
            Type::Union(ts) => Type::Union(ts.iter().map(|t| t.instantiate(args)).collect()),
            Type::Function(ps, r) => {
                Type::Function(ps.iter().map(|t| t.instantiate(args)).collect(), inst(r))
            }
            Type::Operation(ps, r) => {
                Type::Operation(ps.iter().map(|t| t.instantiate(args)).collect(), inst(r))
            }
            _ => self.clone(),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type], sep: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("bool"),
            Type::Nat1 => f.write_str("nat1"),
            Type::Nat => f.write_str("nat"),
            Type::Int => f.write_str("int"),
            Type::Rat => f.write_str("rat"),
            Type::Real => f.write_str("real"),
            Type::Char => f.write_str("char"),
            Type::Token => f.write_str("token"),
            Type::Quote(q) => write!(f, "<{q}>"),
            Type::Set(t) => write!(f, "set of {t}"),
            Type::Seq(t) => write!(f, "seq of {t}"),
            Type::Seq1(t) => write!(f, "seq1 of {t}"),
            Type::Map(k, v) => write!(f, "map {k} to {v}"),
            Type::InMap(k, v) => write!(f, "inmap {k} to {v}"),
            Type::Product(ts) => {
                f.write_str("(")?;
                write_list(f, ts, " * ")?;
                f.write_str(")")
            }
            Type::Record(r) => write!(f, "{}", r.name),
            Type::Union(ts) => write_list(f, ts, " | "),
            Type::Optional(t) => write!(f, "[{t}]"),
            Type::Named(n, _) | Type::Class(n) | Type::Param(n) => write!(f, "{n}"),
            Type::Function(ps, r) => {
                f.write_str("(")?;
                write_list(f, ps, " * ")?;
                write!(f, " -> {r})")
            }
            Type::Operation(ps, r) => {
                f.write_str("(")?;
                write_list(f, ps, " * ")?;
                write!(f, " ==> {r})")
            }
            Type::Unit => f.write_str("()"),
            Type::Unknown => f.write_str("?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ty = Type::Map(Box::new(Type::Nat), Box::new(Type::Seq(Box::new(Type::Char))));
        assert_eq!(ty.to_string(), "map nat to seq of char");
        let ty = Type::Union(vec![Type::Quote(Name::intern("A")), Type::Quote(Name::intern("B"))]);
        assert_eq!(ty.to_string(), "<A> | <B>");
    }

    #[test]
    fn test_resolve_named() {
        let ty = Type::Named(Name::intern("Count"), Box::new(Type::Nat));
        assert_eq!(ty.resolve(), &Type::Nat);
        assert!(ty.is_numeric());
    }

    #[test]
    fn test_instantiate() {
        let t = Name::intern("T");
        let ty = Type::Seq(Box::new(Type::Param(t)));
        assert_eq!(ty.instantiate(&[(t, Type::Int)]), Type::Seq(Box::new(Type::Int)));
    }
}
