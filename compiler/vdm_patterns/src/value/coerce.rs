//! Coercions and type conformance.
//!
//! Each `as_*` method returns the requested representation or a coercion
//! error naming the requested and actual kinds. No coercion reinterprets
//! an incompatible tag: a token is only ever a token, and only integral
//! reals coerce to integers.

use vdm_diagnostic::ErrorCode;
use vdm_ir::{Name, Type};

use super::{FunctionValue, ObjectRef, OperationValue, RecordValue, Value, ValueMap, ValueSet};
use crate::errors::{coercion, undefined_value, EvalError};

impl Value {
    #[cold]
    fn coercion_failure(&self, code: ErrorCode, requested: &'static str) -> EvalError {
        if matches!(self, Value::Undefined) {
            return undefined_value();
        }
        coercion(code, requested, self)
    }

    pub fn as_bool(&self) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedBool, "bool")),
        }
    }

    pub fn as_char(&self) -> Result<char, EvalError> {
        match self {
            Value::Char(c) => Ok(*c),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedChar, "char")),
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "ints take part in real arithmetic"
    )]
    pub fn as_real(&self) -> Result<f64, EvalError> {
        match self {
            Value::Int(v) => Ok(*v as f64),
            Value::Real(v) => Ok(*v),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedReal, "real")),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "guarded by the integral and range checks"
    )]
    pub fn as_int(&self) -> Result<i64, EvalError> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::Real(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e18 => {
                Ok(*v as i64)
            }
            _ => Err(self.coercion_failure(ErrorCode::ExpectedInt, "int")),
        }
    }

    pub fn as_nat(&self) -> Result<i64, EvalError> {
        match self.as_int() {
            Ok(v) if v >= 0 => Ok(v),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedNat, "nat")),
        }
    }

    pub fn as_nat1(&self) -> Result<i64, EvalError> {
        match self.as_int() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedNat1, "nat1")),
        }
    }

    pub fn as_quote(&self) -> Result<Name, EvalError> {
        match self {
            Value::Quote(q) => Ok(*q),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedQuote, "quote")),
        }
    }

    /// The wrapped value of a token.
    pub fn as_token(&self) -> Result<&Value, EvalError> {
        match self {
            Value::Token(inner) => Ok(inner),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedToken, "token")),
        }
    }

    pub fn as_set(&self) -> Result<&ValueSet, EvalError> {
        match self {
            Value::Set(items) => Ok(items),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedSet, "set")),
        }
    }

    pub fn as_seq(&self) -> Result<&[Value], EvalError> {
        match self {
            Value::Seq(items) => Ok(items),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedSeq, "seq")),
        }
    }

    /// A sequence of characters as a Rust string.
    pub fn as_string(&self) -> Result<String, EvalError> {
        self.as_seq()?.iter().map(Value::as_char).collect()
    }

    pub fn as_map(&self) -> Result<&ValueMap, EvalError> {
        match self {
            Value::Map(entries) => Ok(entries),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedMap, "map")),
        }
    }

    pub fn as_record(&self) -> Result<&RecordValue, EvalError> {
        match self {
            Value::Record(r) => Ok(r),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedRecord, "record")),
        }
    }

    pub fn as_function(&self) -> Result<&FunctionValue, EvalError> {
        match self {
            Value::Function(f) => Ok(f),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedFunction, "function")),
        }
    }

    pub fn as_operation(&self) -> Result<&OperationValue, EvalError> {
        match self {
            Value::Operation(op) => Ok(op),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedFunction, "operation")),
        }
    }

    pub fn as_object(&self) -> Result<&ObjectRef, EvalError> {
        match self {
            Value::Object(obj) => Ok(obj),
            _ => Err(self.coercion_failure(ErrorCode::ExpectedObject, "object")),
        }
    }

    /// Whether this value is a member of `ty`.
    pub fn conforms_to(&self, ty: &Type) -> bool {
        match (ty, self) {
            (Type::Unknown | Type::Param(_), _) => true,
            (Type::Named(_, inner), _) => self.conforms_to(inner),
            (Type::Bool, Value::Bool(_))
            | (Type::Char, Value::Char(_))
            | (Type::Token, Value::Token(_))
            | (Type::Unit, Value::Void)
            | (Type::Function(..), Value::Function(_))
            | (Type::Operation(..), Value::Operation(_))
            | (Type::Rat | Type::Real, Value::Int(_) | Value::Real(_)) => true,
            (Type::Int, _) => self.as_int().is_ok(),
            (Type::Nat, _) => self.as_nat().is_ok(),
            (Type::Nat1, _) => self.as_nat1().is_ok(),
            (Type::Quote(q), Value::Quote(v)) => q == v,
            (Type::Set(elem), Value::Set(items)) => items.iter().all(|v| v.conforms_to(elem)),
            (Type::Seq(elem), Value::Seq(items)) => items.iter().all(|v| v.conforms_to(elem)),
            (Type::Seq1(elem), Value::Seq(items)) => {
                !items.is_empty() && items.iter().all(|v| v.conforms_to(elem))
            }
            (Type::Map(k, v), Value::Map(entries)) => entries
                .iter()
                .all(|(key, value)| key.conforms_to(k) && value.conforms_to(v)),
            (Type::InMap(k, v), Value::Map(entries)) => {
                let range: ValueSet = entries.values().cloned().collect();
                range.len() == entries.len()
                    && entries
                        .iter()
                        .all(|(key, value)| key.conforms_to(k) && value.conforms_to(v))
            }
            (Type::Record(rt), Value::Record(r)) => {
                rt.name == r.ty.name
                    && rt.fields.len() == r.fields.len()
                    && rt
                        .fields
                        .iter()
                        .zip(&r.fields)
                        .all(|(decl, v)| v.conforms_to(&decl.ty))
            }
            (Type::Union(members), _) => members.iter().any(|t| self.conforms_to(t)),
            (Type::Optional(inner), _) => matches!(self, Value::Nil) || self.conforms_to(inner),
            (Type::Class(class), Value::Object(obj)) => obj.class == *class,
            _ => false,
        }
    }
}
