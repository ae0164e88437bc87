//! Runtime values.
//!
//! `Value` is a closed tagged union. Compound values live behind [`Heap`]
//! and are built through the factory methods here, never directly.
//!
//! # Equality, ordering and hashing
//!
//! Values are totally ordered so sets and maps have a deterministic
//! iteration order. Numbers compare numerically across `Int` and `Real`
//! (`3 = 3.0`) and hash consistently with that. Tokens, records and
//! containers compare structurally. Functions, operations and objects
//! compare by identity.

mod coerce;
mod composite;
mod heap;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use vdm_ir::{Name, RecordType};

pub use composite::{
    FunctionKind, FunctionValue, GroupMember, ObjectRef, ObjectValue, OperationValue,
    RecordValue, RecursiveGroup,
};
pub use heap::Heap;

use crate::errors::{duplicate_map_key, record_field_count, record_field_type, EvalError};
use crate::Context;

pub type ValueSet = BTreeSet<Value>;
pub type ValueMap = BTreeMap<Value, Value>;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Char(char),
    Int(i64),
    Real(f64),
    Quote(Name),
    Nil,
    Token(Heap<Value>),
    Record(Heap<RecordValue>),
    Set(Heap<ValueSet>),
    Seq(Heap<Vec<Value>>),
    Map(Heap<ValueMap>),
    Function(Heap<FunctionValue>),
    Operation(Heap<OperationValue>),
    Object(ObjectRef),
    Undefined,
    /// Statement completed without a value.
    Void,
    /// Result of a bare `return`: propagates like a value, becomes `Void`
    /// at the operation boundary.
    VoidReturn,
}

// Factories

impl Value {
    #[inline]
    pub fn int(v: i64) -> Value {
        Value::Int(v)
    }

    #[inline]
    pub fn real(v: f64) -> Value {
        Value::Real(v)
    }

    /// Result of real arithmetic: integral results become `Int`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "guarded by the integral and range checks"
    )]
    pub fn number(v: f64) -> Value {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
            Value::Int(v as i64)
        } else {
            Value::Real(v)
        }
    }

    #[inline]
    pub fn bool(v: bool) -> Value {
        Value::Bool(v)
    }

    pub fn quote(name: &str) -> Value {
        Value::Quote(Name::intern(name))
    }

    /// A string is a sequence of characters.
    pub fn string(s: &str) -> Value {
        Value::Seq(Heap::new(s.chars().map(Value::Char).collect()))
    }

    pub fn token(inner: Value) -> Value {
        Value::Token(Heap::new(inner))
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Set(Heap::new(items.into_iter().collect()))
    }

    pub fn set_from(items: ValueSet) -> Value {
        Value::Set(Heap::new(items))
    }

    pub fn seq(items: Vec<Value>) -> Value {
        Value::Seq(Heap::new(items))
    }

    pub fn map_from(entries: ValueMap) -> Value {
        Value::Map(Heap::new(entries))
    }

    /// Build a map, failing if one key is given two different values.
    pub fn map(pairs: impl IntoIterator<Item = (Value, Value)>) -> Result<Value, EvalError> {
        let mut entries = ValueMap::new();
        for (key, value) in pairs {
            match entries.get(&key) {
                Some(existing) if *existing != value => return Err(duplicate_map_key(&key)),
                Some(_) => {}
                None => {
                    entries.insert(key, value);
                }
            }
        }
        Ok(Value::map_from(entries))
    }

    /// Build a record, validating field count and field types against the
    /// declared shape.
    pub fn record(ty: Arc<RecordType>, fields: Vec<Value>) -> Result<Value, EvalError> {
        if fields.len() != ty.fields.len() {
            return Err(record_field_count(ty.name, ty.fields.len(), fields.len()));
        }
        for (decl, value) in ty.fields.iter().zip(&fields) {
            if !value.conforms_to(&decl.ty) {
                return Err(record_field_type(ty.name, decl.tag, value));
            }
        }
        Ok(Value::Record(Heap::new(RecordValue { ty, fields })))
    }

    pub fn function(f: FunctionValue) -> Value {
        Value::Function(Heap::new(f))
    }

    pub fn operation(op: OperationValue) -> Value {
        Value::Operation(Heap::new(op))
    }

    /// A fresh object of `class` whose instance variables live in `state`.
    pub fn object(class: Name, state: Context) -> Value {
        let id = NEXT_OBJECT_ID.fetch_add(1, AtomicOrdering::Relaxed);
        Value::Object(Heap::new(ObjectValue { id, class, state }))
    }

    pub fn empty_set() -> Value {
        Value::set_from(ValueSet::new())
    }

    pub fn empty_seq() -> Value {
        Value::seq(Vec::new())
    }
}

// Inspection

impl Value {
    /// Stable tag name used in diagnostics.
    ///
    /// Numbers report the narrowest numeric kind their magnitude fits.
    /// There is no `rat` kind: a number that is not integral is a `real`.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Int(v) => int_kind(*v),
            Value::Real(v) => {
                if v.is_finite() && v.fract() == 0.0 {
                    if *v > 0.0 {
                        "nat1"
                    } else if *v == 0.0 {
                        "nat"
                    } else {
                        "int"
                    }
                } else {
                    "real"
                }
            }
            Value::Quote(_) => "quote",
            Value::Nil => "nil",
            Value::Token(_) => "token",
            Value::Record(_) => "record",
            Value::Set(_) => "set",
            Value::Seq(_) => "seq",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
            Value::Operation(_) => "operation",
            Value::Object(_) => "object",
            Value::Undefined => "undefined",
            Value::Void | Value::VoidReturn => "()",
        }
    }

    /// `Void` and `VoidReturn` are the two void markers; only `Void` means
    /// "keep going" to an enclosing statement.
    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Real(_))
    }

    /// The characters of a sequence of characters, if it is one.
    pub fn as_str_lossy(&self) -> Option<String> {
        match self {
            Value::Seq(items) => items
                .iter()
                .map(|v| match v {
                    Value::Char(c) => Some(*c),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Char(_) => 1,
            Value::Int(_) | Value::Real(_) => 2,
            Value::Quote(_) => 3,
            Value::Nil => 4,
            Value::Token(_) => 5,
            Value::Record(_) => 6,
            Value::Set(_) => 7,
            Value::Seq(_) => 8,
            Value::Map(_) => 9,
            Value::Function(_) => 10,
            Value::Operation(_) => 11,
            Value::Object(_) => 12,
            Value::Undefined => 13,
            Value::Void => 14,
            Value::VoidReturn => 15,
        }
    }
}

fn int_kind(v: i64) -> &'static str {
    match v.cmp(&0) {
        Ordering::Greater => "nat1",
        Ordering::Equal => "nat",
        Ordering::Less => "int",
    }
}

/// `0.0` and `-0.0` are equal; NaN falls back to the IEEE total order.
fn cmp_reals(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
}

/// 2^63 as a real: every integral real below it in magnitude is an `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// The integer a real denotes exactly, if any.
#[expect(
    clippy::cast_possible_truncation,
    reason = "integral and strictly inside the i64 range"
)]
fn exact_int(r: f64) -> Option<i64> {
    (r.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&r)).then(|| r as i64)
}

/// Exact comparison of an integer with a real, so that equality across
/// the two stays transitive beyond 2^53.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "the truncated real is inside the i64 range; NaN needs no precision"
)]
fn cmp_int_real(i: i64, r: f64) -> Ordering {
    if r.is_nan() {
        return cmp_reals(i as f64, r);
    }
    if r >= I64_BOUND {
        return Ordering::Less;
    }
    if r < -I64_BOUND {
        return Ordering::Greater;
    }
    let whole = r.trunc();
    i.cmp(&(whole as i64)).then_with(|| cmp_reals(whole, r))
}

fn cmp_numbers(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Int(x), Value::Real(y)) => cmp_int_real(*x, *y),
        (Value::Real(x), Value::Int(y)) => cmp_int_real(*y, *x).reverse(),
        (Value::Real(x), Value::Real(y)) => cmp_reals(*x, *y),
        _ => Ordering::Equal,
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_rank = self.rank().cmp(&other.rank());
        if by_rank != Ordering::Equal {
            return by_rank;
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::Int(_) | Value::Real(_), _) => cmp_numbers(self, other),
            (Value::Quote(a), Value::Quote(b)) => a.cmp(b),
            (Value::Token(a), Value::Token(b)) => (**a).cmp(&**b),
            (Value::Record(a), Value::Record(b)) => a
                .ty
                .name
                .cmp(&b.ty.name)
                .then_with(|| a.fields.cmp(&b.fields)),
            (Value::Set(a), Value::Set(b)) => (**a).cmp(&**b),
            (Value::Seq(a), Value::Seq(b)) => (**a).cmp(&**b),
            (Value::Map(a), Value::Map(b)) => (**a).cmp(&**b),
            (Value::Function(a), Value::Function(b)) => Heap::addr(a).cmp(&Heap::addr(b)),
            (Value::Operation(a), Value::Operation(b)) => Heap::addr(a).cmp(&Heap::addr(b)),
            (Value::Object(a), Value::Object(b)) => a.id.cmp(&b.id),
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Bool(b) => b.hash(state),
            Value::Char(c) => c.hash(state),
            Value::Int(v) => v.hash(state),
            // Equal to an `Int` only when it denotes that integer exactly.
            Value::Real(v) => match exact_int(*v) {
                Some(i) => i.hash(state),
                None => v.to_bits().hash(state),
            },
            Value::Quote(q) => q.hash(state),
            Value::Token(inner) => (**inner).hash(state),
            Value::Record(r) => {
                r.ty.name.hash(state);
                r.fields.hash(state);
            }
            Value::Set(items) => {
                for item in items.iter() {
                    item.hash(state);
                }
            }
            Value::Seq(items) => items.hash(state),
            Value::Map(entries) => {
                for (k, v) in entries.iter() {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Function(f) => Heap::addr(f).hash(state),
            Value::Operation(op) => Heap::addr(op).hash(state),
            Value::Object(obj) => obj.id.hash(state),
            Value::Nil | Value::Undefined | Value::Void | Value::VoidReturn => {}
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "'{c}'"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Quote(q) => write!(f, "<{q}>"),
            Value::Nil => f.write_str("nil"),
            Value::Token(inner) => write!(f, "mk_token({})", **inner),
            Value::Record(r) => {
                write!(f, "mk_{}(", r.ty.name)?;
                write_joined(f, r.fields.iter())?;
                f.write_str(")")
            }
            Value::Set(items) => {
                f.write_str("{")?;
                write_joined(f, items.iter())?;
                f.write_str("}")
            }
            Value::Seq(items) => match self.as_str_lossy() {
                Some(s) if !items.is_empty() => write!(f, "\"{s}\""),
                _ => {
                    f.write_str("[")?;
                    write_joined(f, items.iter())?;
                    f.write_str("]")
                }
            },
            Value::Map(entries) => {
                if entries.is_empty() {
                    return f.write_str("{|->}");
                }
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k} |-> {v}")?;
                }
                f.write_str("}")
            }
            Value::Function(func) => write!(f, "{}", func.name),
            Value::Operation(op) => write!(f, "{}", op.name()),
            Value::Object(obj) => write!(f, "{}{{#{}}}", obj.class, obj.id),
            Value::Undefined => f.write_str("undefined"),
            Value::Void | Value::VoidReturn => f.write_str("()"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("Void"),
            Value::VoidReturn => f.write_str("VoidReturn"),
            _ => write!(f, "{self}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
