use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vdm_diagnostic::ErrorCode;
use vdm_ir::{Name, RecordField, RecordType, Type};

use super::*;

fn hash_of(v: &Value) -> u64 {
    let mut h = DefaultHasher::new();
    v.hash(&mut h);
    h.finish()
}

fn point_type() -> Arc<RecordType> {
    Arc::new(RecordType::new(
        Name::intern("Point"),
        vec![
            RecordField::new(Name::intern("x"), Type::Int),
            RecordField::new(Name::intern("y"), Type::Int),
        ],
    ))
}

#[test]
fn int_and_real_compare_numerically() {
    assert_eq!(Value::int(3), Value::real(3.0));
    assert_eq!(hash_of(&Value::int(3)), hash_of(&Value::real(3.0)));
    assert!(Value::int(2) < Value::real(2.5));
    assert_eq!(Value::real(0.0), Value::real(-0.0));
}

#[test]
fn number_normalizes_integral_results() {
    assert!(matches!(Value::number(4.0), Value::Int(4)));
    assert!(matches!(Value::number(4.5), Value::Real(_)));
}

#[test]
fn sets_are_deduplicated_and_ordered() {
    let s = Value::set([Value::int(3), Value::int(1), Value::real(3.0)]);
    assert_eq!(s.to_string(), "{1, 3}");
}

#[test]
fn strings_are_char_sequences() {
    let s = Value::string("abc");
    assert_eq!(s.as_seq().unwrap().len(), 3);
    assert_eq!(s.as_string().unwrap(), "abc");
    assert_eq!(s.to_string(), "\"abc\"");
    assert_eq!(Value::empty_seq().to_string(), "[]");
}

#[test]
fn display_forms() {
    let m = Value::map([(Value::int(1), Value::bool(true))]).unwrap();
    assert_eq!(m.to_string(), "{1 |-> true}");
    assert_eq!(Value::map([]).unwrap().to_string(), "{|->}");
    assert_eq!(Value::quote("RED").to_string(), "<RED>");
    assert_eq!(Value::token(Value::int(1)).to_string(), "mk_token(1)");
    let p = Value::record(point_type(), vec![Value::int(1), Value::int(2)]).unwrap();
    assert_eq!(p.to_string(), "mk_Point(1, 2)");
}

#[test]
fn map_rejects_conflicting_duplicate_keys() {
    let err = Value::map([(Value::int(1), Value::int(2)), (Value::int(1), Value::int(3))])
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateMapKey);
    assert!(Value::map([(Value::int(1), Value::int(2)), (Value::int(1), Value::int(2))]).is_ok());
}

#[test]
fn record_checks_count_and_types() {
    let err = Value::record(point_type(), vec![Value::int(1)]).unwrap_err();
    assert_eq!(err.code, ErrorCode::RecordFieldCount);
    let err = Value::record(point_type(), vec![Value::int(1), Value::bool(true)]).unwrap_err();
    assert_eq!(err.code, ErrorCode::RecordFieldType);
    let p = Value::record(point_type(), vec![Value::int(1), Value::int(2)]).unwrap();
    assert_eq!(p.as_record().unwrap().field(Name::intern("y")), Some(&Value::int(2)));
}

#[test]
fn kind_reports_narrowest_numeric_kind() {
    assert_eq!(Value::int(5).kind(), "nat1");
    assert_eq!(Value::int(0).kind(), "nat");
    assert_eq!(Value::int(-5).kind(), "int");
    assert_eq!(Value::real(2.5).kind(), "real");
    assert_eq!(Value::real(2.0).kind(), "nat1");
    // Non-integral numbers are reals; `rat` is a type, never a kind.
    assert_eq!(Value::real(1.0 / 3.0).kind(), "real");
    assert!(Value::real(1.0 / 3.0).conforms_to(&Type::Rat));
}

#[test]
fn coercions_report_stable_codes() {
    assert_eq!(Value::int(1).as_bool().unwrap_err().code, ErrorCode::ExpectedBool);
    assert_eq!(Value::int(-1).as_nat().unwrap_err().code, ErrorCode::ExpectedNat);
    assert_eq!(Value::int(0).as_nat1().unwrap_err().code, ErrorCode::ExpectedNat1);
    assert_eq!(Value::real(1.5).as_int().unwrap_err().code, ErrorCode::ExpectedInt);
    assert_eq!(Value::real(2.0).as_int().unwrap(), 2);
    assert_eq!(Value::Nil.as_set().unwrap_err().code, ErrorCode::ExpectedSet);
    assert_eq!(Value::Undefined.as_int().unwrap_err().code, ErrorCode::UndefinedValue);
}

#[test]
fn conformance_to_types() {
    assert!(Value::int(3).conforms_to(&Type::Nat1));
    assert!(!Value::int(0).conforms_to(&Type::Nat1));
    assert!(Value::real(0.5).conforms_to(&Type::Real));
    assert!(Value::Nil.conforms_to(&Type::Optional(Box::new(Type::Int))));
    assert!(!Value::empty_seq().conforms_to(&Type::Seq1(Box::new(Type::Int))));
    let inj = Value::map([(Value::int(1), Value::int(5)), (Value::int(2), Value::int(5))]).unwrap();
    assert!(inj.conforms_to(&Type::Map(Box::new(Type::Nat), Box::new(Type::Nat))));
    assert!(!inj.conforms_to(&Type::InMap(Box::new(Type::Nat), Box::new(Type::Nat))));
    let u = Type::Union(vec![Type::Bool, Type::Char]);
    assert!(Value::Char('c').conforms_to(&u));
    assert!(!Value::int(1).conforms_to(&u));
}

#[test]
fn objects_compare_by_identity() {
    let a = Value::object(Name::intern("C"), crate::Context::global());
    let b = Value::object(Name::intern("C"), crate::Context::global());
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn make_mut_copies_shared_containers() {
    let original = Value::seq(vec![Value::int(1)]);
    let mut copy = original.clone();
    if let Value::Seq(items) = &mut copy {
        Heap::make_mut(items).push(Value::int(2));
    }
    assert_eq!(original.as_seq().unwrap().len(), 1);
    assert_eq!(copy.as_seq().unwrap().len(), 2);
}

#[test]
fn int_real_equality_is_exact_beyond_f64_precision() {
    let two_53 = 1i64 << 53;
    let above = Value::int(two_53 + 1);
    let exact = Value::int(two_53);
    #[expect(clippy::cast_precision_loss, reason = "2^53 is exactly representable")]
    let real = Value::real(two_53 as f64);

    assert_eq!(real, exact);
    assert_ne!(above, real);
    assert!(real < above);
    assert!(above > real);
    assert_eq!(hash_of(&real), hash_of(&exact));

    let set: ValueSet = [above, exact, real].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn int_real_ordering_at_the_edges() {
    assert!(Value::int(i64::MAX) < Value::real(9.3e18));
    assert!(Value::int(i64::MIN) > Value::real(-9.3e18));
    assert_eq!(Value::int(i64::MIN), Value::real(-9_223_372_036_854_775_808.0));
    assert!(Value::int(-3) < Value::real(-2.5));
    assert!(Value::int(-2) > Value::real(-2.5));
    assert!(Value::int(2) < Value::real(2.5));
    assert!(Value::int(3) > Value::real(2.5));
    assert_eq!(Value::int(0), Value::real(-0.0));
    assert_eq!(hash_of(&Value::int(0)), hash_of(&Value::real(-0.0)));
}

proptest! {
    #[test]
    fn equal_values_hash_equal(i in -1_000_000i64..1_000_000) {
        #[expect(clippy::cast_precision_loss, reason = "small test range")]
        let r = Value::real(i as f64);
        prop_assert_eq!(&Value::int(i), &r);
        prop_assert_eq!(hash_of(&Value::int(i)), hash_of(&r));
    }

    #[test]
    fn ordering_is_consistent_with_integers(a in any::<i32>(), b in any::<i32>()) {
        let (va, vb) = (Value::int(i64::from(a)), Value::int(i64::from(b)));
        prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
    }

    #[test]
    fn large_int_real_equality_agrees_with_hashing(i in any::<i64>(), r in any::<f64>()) {
        let (vi, vr) = (Value::int(i), Value::real(r));
        if vi == vr {
            prop_assert_eq!(hash_of(&vi), hash_of(&vr));
        }
        prop_assert_eq!(vi.cmp(&vr), vr.cmp(&vi).reverse());
    }
}
