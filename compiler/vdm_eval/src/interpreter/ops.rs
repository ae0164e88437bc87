//! Unary and binary operators on values.
//!
//! The boolean connectives are handled by the interpreter because they
//! evaluate their right operand conditionally; everything here receives
//! both operands already evaluated.

use std::cmp::Ordering;

use vdm_ir::{BinaryOp, UnaryOp};
use vdm_patterns::errors::{
    arithmetic_overflow, cardinality, division_by_zero, duplicate_map_key, empty_dinter,
    empty_sequence, map_key_missing,
};
use vdm_patterns::{EvalResult, Value, ValueMap, ValueSet};

/// `power` enumerates `2^n` subsets; larger sets are refused.
const MAX_POWER_SET_SIZE: usize = 24;

/// A count as an integer value.
pub(super) fn count(n: usize) -> Value {
    Value::int(i64::try_from(n).unwrap_or(i64::MAX))
}

pub(super) fn unary(op: UnaryOp, v: &Value) -> EvalResult {
    match op {
        UnaryOp::Not => Ok(Value::bool(!v.as_bool()?)),
        UnaryOp::Minus => match v {
            Value::Int(i) => i
                .checked_neg()
                .map(Value::int)
                .ok_or_else(|| arithmetic_overflow("-")),
            _ => Ok(Value::real(-v.as_real()?)),
        },
        UnaryOp::Plus => {
            v.as_real()?;
            Ok(v.clone())
        }
        UnaryOp::Abs => match v {
            Value::Int(i) => i
                .checked_abs()
                .map(Value::int)
                .ok_or_else(|| arithmetic_overflow("abs")),
            _ => Ok(Value::real(v.as_real()?.abs())),
        },
        UnaryOp::Floor => match v {
            Value::Int(_) => Ok(v.clone()),
            _ => Ok(Value::number(v.as_real()?.floor())),
        },
        UnaryOp::Card => Ok(count(v.as_set()?.len())),
        UnaryOp::DistUnion => {
            let mut result = ValueSet::new();
            for member in v.as_set()? {
                result.extend(member.as_set()?.iter().cloned());
            }
            Ok(Value::set_from(result))
        }
        UnaryOp::DistInter => {
            let mut members = v.as_set()?.iter();
            let first = members.next().ok_or_else(empty_dinter)?;
            let mut result = first.as_set()?.clone();
            for member in members {
                let next = member.as_set()?;
                result.retain(|item| next.contains(item));
            }
            Ok(Value::set_from(result))
        }
        UnaryOp::PowerSet => power_set(v.as_set()?),
        UnaryOp::Dom => Ok(Value::set(v.as_map()?.keys().cloned())),
        UnaryOp::Rng => Ok(Value::set(v.as_map()?.values().cloned())),
        UnaryOp::Len => Ok(count(v.as_seq()?.len())),
        UnaryOp::Head => v
            .as_seq()?
            .first()
            .cloned()
            .ok_or_else(|| empty_sequence("hd")),
        UnaryOp::Tail => match v.as_seq()? {
            [] => Err(empty_sequence("tl")),
            [_, rest @ ..] => Ok(Value::seq(rest.to_vec())),
        },
        UnaryOp::Elems => Ok(Value::set(v.as_seq()?.iter().cloned())),
        UnaryOp::Inds => {
            let len = i64::try_from(v.as_seq()?.len()).unwrap_or(i64::MAX);
            Ok(Value::set((1..=len).map(Value::int)))
        }
        UnaryOp::DistConc => {
            let mut result = Vec::new();
            for member in v.as_seq()? {
                result.extend(member.as_seq()?.iter().cloned());
            }
            Ok(Value::seq(result))
        }
        UnaryOp::Reverse => Ok(Value::seq(v.as_seq()?.iter().rev().cloned().collect())),
    }
}

fn power_set(set: &ValueSet) -> EvalResult {
    if set.len() > MAX_POWER_SET_SIZE {
        return Err(cardinality(format!(
            "Cannot take power set of more than {MAX_POWER_SET_SIZE} elements"
        )));
    }
    let items: Vec<&Value> = set.iter().collect();
    let subsets = (0..1u32 << items.len()).map(|mask| {
        Value::set(
            items
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1u32 << *i) != 0)
                .map(|(_, v)| (*v).clone()),
        )
    });
    Ok(Value::set(subsets))
}

pub(super) fn binary(op: BinaryOp, l: &Value, r: &Value) -> EvalResult {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => arithmetic(op, l, r),
        BinaryOp::IntDiv | BinaryOp::Rem | BinaryOp::Mod => {
            integer_division(op, l.as_int()?, r.as_int()?)
        }
        BinaryOp::Pow => power(l, r),

        BinaryOp::Eq => Ok(Value::bool(l == r)),
        BinaryOp::NotEq => Ok(Value::bool(l != r)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            // Coerce first so non-numbers fail rather than compare by tag.
            l.as_real()?;
            r.as_real()?;
            let ord = l.cmp(r);
            Ok(Value::bool(match op {
                BinaryOp::Lt => ord == Ordering::Less,
                BinaryOp::LtEq => ord != Ordering::Greater,
                BinaryOp::Gt => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            }))
        }

        BinaryOp::And => Ok(Value::bool(l.as_bool()? && r.as_bool()?)),
        BinaryOp::Or => Ok(Value::bool(l.as_bool()? || r.as_bool()?)),
        BinaryOp::Implies => Ok(Value::bool(!l.as_bool()? || r.as_bool()?)),
        BinaryOp::Equiv => Ok(Value::bool(l.as_bool()? == r.as_bool()?)),

        BinaryOp::InSet => Ok(Value::bool(r.as_set()?.contains(l))),
        BinaryOp::NotInSet => Ok(Value::bool(!r.as_set()?.contains(l))),
        BinaryOp::Union => Ok(Value::set(l.as_set()?.union(r.as_set()?).cloned())),
        BinaryOp::Inter => Ok(Value::set(l.as_set()?.intersection(r.as_set()?).cloned())),
        BinaryOp::Difference => Ok(Value::set(l.as_set()?.difference(r.as_set()?).cloned())),
        BinaryOp::Subset => Ok(Value::bool(l.as_set()?.is_subset(r.as_set()?))),
        BinaryOp::ProperSubset => {
            let (a, b) = (l.as_set()?, r.as_set()?);
            Ok(Value::bool(a.len() < b.len() && a.is_subset(b)))
        }

        BinaryOp::Concat => {
            let mut items = l.as_seq()?.to_vec();
            items.extend_from_slice(r.as_seq()?);
            Ok(Value::seq(items))
        }

        BinaryOp::MapUnion => {
            let (a, b) = (l.as_map()?, r.as_map()?);
            let mut merged = a.clone();
            for (key, value) in b {
                match a.get(key) {
                    Some(existing) if existing != value => return Err(duplicate_map_key(key)),
                    _ => {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
            Ok(Value::map_from(merged))
        }
        BinaryOp::Override => {
            let mut merged = l.as_map()?.clone();
            merged.extend(r.as_map()?.iter().map(|(k, v)| (k.clone(), v.clone())));
            Ok(Value::map_from(merged))
        }
        BinaryOp::DomRestrictTo | BinaryOp::DomRestrictBy => {
            let (set, map) = (l.as_set()?, r.as_map()?);
            let keep = op == BinaryOp::DomRestrictTo;
            Ok(filter_map(map, |k, _| set.contains(k) == keep))
        }
        BinaryOp::RngRestrictTo | BinaryOp::RngRestrictBy => {
            let (map, set) = (l.as_map()?, r.as_set()?);
            let keep = op == BinaryOp::RngRestrictTo;
            Ok(filter_map(map, |_, v| set.contains(v) == keep))
        }
        BinaryOp::Comp => {
            let (outer, inner) = (l.as_map()?, r.as_map()?);
            let mut composed = ValueMap::new();
            for (key, mid) in inner {
                let value = outer.get(mid).ok_or_else(|| map_key_missing(mid))?;
                composed.insert(key.clone(), value.clone());
            }
            Ok(Value::map_from(composed))
        }
    }
}

fn filter_map(map: &ValueMap, keep: impl Fn(&Value, &Value) -> bool) -> Value {
    Value::map_from(
        map.iter()
            .filter(|(k, v)| keep(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

fn arithmetic(op: BinaryOp, l: &Value, r: &Value) -> EvalResult {
    if let (Value::Int(a), Value::Int(b), false) = (l, r, op == BinaryOp::Div) {
        let result = match op {
            BinaryOp::Add => a.checked_add(*b),
            BinaryOp::Sub => a.checked_sub(*b),
            _ => a.checked_mul(*b),
        };
        return result
            .map(Value::int)
            .ok_or_else(|| arithmetic_overflow(op.as_symbol()));
    }
    let (a, b) = (l.as_real()?, r.as_real()?);
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        _ => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            a / b
        }
    };
    real_result(op, result)
}

fn real_result(op: BinaryOp, result: f64) -> EvalResult {
    if result.is_finite() {
        Ok(Value::number(result))
    } else {
        Err(arithmetic_overflow(op.as_symbol()))
    }
}

/// `div` truncates toward zero, `rem` takes the sign of the dividend and
/// `mod` the sign of the divisor.
fn integer_division(op: BinaryOp, a: i64, b: i64) -> EvalResult {
    if b == 0 {
        return Err(division_by_zero());
    }
    let overflow = || arithmetic_overflow(op.as_symbol());
    let result = match op {
        BinaryOp::IntDiv => a.checked_div(b).ok_or_else(overflow)?,
        BinaryOp::Rem => a.checked_rem(b).ok_or_else(overflow)?,
        _ => {
            let rem = a.checked_rem(b).ok_or_else(overflow)?;
            if rem != 0 && (rem < 0) != (b < 0) {
                rem + b
            } else {
                rem
            }
        }
    };
    Ok(Value::int(result))
}

/// Numeric exponentiation or map iteration.
fn power(l: &Value, r: &Value) -> EvalResult {
    match l {
        Value::Map(map) => {
            let n = r.as_nat()?;
            let mut result: ValueMap = map.keys().map(|k| (k.clone(), k.clone())).collect();
            for _ in 0..n {
                let mut next = ValueMap::new();
                for (key, value) in &result {
                    let stepped = map.get(value).ok_or_else(|| map_key_missing(value))?;
                    next.insert(key.clone(), stepped.clone());
                }
                result = next;
            }
            Ok(Value::map_from(result))
        }
        Value::Int(base) => match r {
            Value::Int(exp) if *exp >= 0 => u32::try_from(*exp)
                .ok()
                .and_then(|exp| base.checked_pow(exp))
                .map(Value::int)
                .ok_or_else(|| arithmetic_overflow("**")),
            _ => real_result(BinaryOp::Pow, l.as_real()?.powf(r.as_real()?)),
        },
        _ => real_result(BinaryOp::Pow, l.as_real()?.powf(r.as_real()?)),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vdm_diagnostic::ErrorCode;

    fn ints(items: &[i64]) -> Value {
        Value::set(items.iter().copied().map(Value::int))
    }

    #[test]
    fn mod_takes_divisor_sign_and_rem_dividend_sign() {
        let r = |op, a, b| binary(op, &Value::int(a), &Value::int(b)).unwrap();
        assert_eq!(r(BinaryOp::Mod, -7, 3), Value::int(2));
        assert_eq!(r(BinaryOp::Mod, 7, -3), Value::int(-2));
        assert_eq!(r(BinaryOp::Rem, -7, 3), Value::int(-1));
        assert_eq!(r(BinaryOp::IntDiv, -7, 2), Value::int(-3));
    }

    #[test]
    fn division_by_zero_is_reported() {
        for op in [BinaryOp::Div, BinaryOp::IntDiv, BinaryOp::Rem, BinaryOp::Mod] {
            let err = binary(op, &Value::int(1), &Value::int(0)).unwrap_err();
            assert_eq!(err.code, ErrorCode::DivisionByZero);
        }
    }

    #[test]
    fn int_overflow_is_checked() {
        let err = binary(BinaryOp::Add, &Value::int(i64::MAX), &Value::int(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ArithmeticOverflow);
    }

    #[test]
    fn exact_real_division_gives_integer() {
        assert_eq!(binary(BinaryOp::Div, &Value::int(6), &Value::int(3)).unwrap(), Value::int(2));
        assert_eq!(binary(BinaryOp::Div, &Value::int(1), &Value::int(4)).unwrap(), Value::real(0.25));
    }

    #[test]
    fn dinter_of_empty_set_fails() {
        let err = unary(UnaryOp::DistInter, &Value::empty_set()).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyDistIntersection);
        assert_eq!(err.number(), 4151);
    }

    #[test]
    fn dinter_folds_intersection() {
        let sets = Value::set([ints(&[1, 2, 3]), ints(&[2, 3, 4]), ints(&[3, 2])]);
        assert_eq!(unary(UnaryOp::DistInter, &sets).unwrap(), ints(&[2, 3]));
    }

    #[test]
    fn card_and_rng() {
        assert_eq!(unary(UnaryOp::Card, &ints(&[4, 5, 6])).unwrap(), Value::int(3));
        let map = Value::map([(Value::int(1), Value::int(9)), (Value::int(2), Value::int(9))]).unwrap();
        assert_eq!(unary(UnaryOp::Rng, &map).unwrap(), ints(&[9]));
    }

    #[test]
    fn card_of_non_set_is_a_coercion_error() {
        let err = unary(UnaryOp::Card, &Value::int(3)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedSet);
    }

    #[test]
    fn head_and_tail_of_empty_sequence_fail() {
        assert_eq!(unary(UnaryOp::Head, &Value::empty_seq()).unwrap_err().code, ErrorCode::EmptySequence);
        assert_eq!(unary(UnaryOp::Tail, &Value::empty_seq()).unwrap_err().code, ErrorCode::EmptySequence);
    }

    #[test]
    fn power_set_sizes() {
        let p = unary(UnaryOp::PowerSet, &ints(&[1, 2, 3])).unwrap();
        assert_eq!(p.as_set().unwrap().len(), 8);
        assert!(p.as_set().unwrap().contains(&Value::empty_set()));
    }

    #[test]
    fn munion_rejects_conflicting_keys() {
        let a = Value::map([(Value::int(1), Value::int(1))]).unwrap();
        let b = Value::map([(Value::int(1), Value::int(2))]).unwrap();
        assert_eq!(binary(BinaryOp::MapUnion, &a, &b).unwrap_err().code, ErrorCode::DuplicateMapKey);
        assert_eq!(binary(BinaryOp::Override, &a, &b).unwrap(), b);
    }

    #[test]
    fn map_restriction_and_composition() {
        let m = Value::map([(Value::int(1), Value::int(10)), (Value::int(2), Value::int(20))]).unwrap();
        let only_one = Value::map([(Value::int(1), Value::int(10))]).unwrap();
        assert_eq!(binary(BinaryOp::DomRestrictTo, &ints(&[1]), &m).unwrap(), only_one);
        assert_eq!(binary(BinaryOp::RngRestrictBy, &m, &ints(&[20])).unwrap(), only_one);

        let names = Value::map([(Value::int(10), Value::string("ten"))]).unwrap();
        let composed = binary(BinaryOp::Comp, &names, &only_one).unwrap();
        assert_eq!(composed, Value::map([(Value::int(1), Value::string("ten"))]).unwrap());
    }

    #[test]
    fn map_iteration() {
        let step = Value::map([
            (Value::int(1), Value::int(2)),
            (Value::int(2), Value::int(3)),
            (Value::int(3), Value::int(3)),
        ])
        .unwrap();
        let twice = binary(BinaryOp::Pow, &step, &Value::int(2)).unwrap();
        assert_eq!(twice.as_map().unwrap().get(&Value::int(1)), Some(&Value::int(3)));
    }

    #[test]
    fn comparisons_cross_int_and_real() {
        assert_eq!(binary(BinaryOp::Lt, &Value::int(2), &Value::real(2.5)).unwrap(), Value::bool(true));
        assert_eq!(binary(BinaryOp::Eq, &Value::int(3), &Value::real(3.0)).unwrap(), Value::bool(true));
        let err = binary(BinaryOp::Lt, &Value::bool(true), &Value::int(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedReal);
    }
}
