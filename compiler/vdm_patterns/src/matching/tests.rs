use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vdm_ir::{Name, RecordField, RecordType, Type};

use super::*;
use crate::Context;

fn n(s: &str) -> Name {
    Name::intern(s)
}

fn p(kind: PatternKind) -> Pattern {
    Pattern::new(kind, Location::DUMMY)
}

fn id(s: &str) -> Pattern {
    Pattern::ident(n(s))
}

fn ints(values: &[i64]) -> Value {
    Value::set(values.iter().copied().map(Value::int))
}

fn env(pairs: &[(&str, i64)]) -> Bindings {
    let mut b = Bindings::new();
    for (name, v) in pairs {
        b.bind(n(name), Value::int(*v), Location::DUMMY).unwrap();
    }
    b
}

#[test]
fn identifier_binds_value_unchanged() {
    let envs = match_pattern(&id("x"), &Value::string("abc")).unwrap();
    assert_eq!(envs.len(), 1);
    assert_eq!(envs[0].get(n("x")), Some(&Value::string("abc")));
}

#[test]
fn ignore_binds_nothing() {
    let envs = match_pattern(&p(PatternKind::Ignore), &Value::int(3)).unwrap();
    assert_eq!(envs, vec![Bindings::new()]);
}

#[test]
fn set_pattern_yields_every_bijection() {
    let pat = p(PatternKind::Set(vec![id("x"), id("y")]));
    let envs = match_pattern(&pat, &ints(&[1, 2])).unwrap();
    assert_eq!(envs, vec![env(&[("x", 1), ("y", 2)]), env(&[("x", 2), ("y", 1)])]);
}

#[test]
fn set_pattern_size_mismatch_fails() {
    let pat = p(PatternKind::Set(vec![id("x"), id("y")]));
    let err = match_pattern(&pat, &ints(&[1, 2, 3])).unwrap_err();
    assert_eq!(err.code, ErrorCode::SetPatternSize);
}

#[test]
fn set_pattern_with_literal_selects_remaining_element() {
    let pat = p(PatternKind::Set(vec![p(PatternKind::Int(2)), id("x")]));
    let envs = match_pattern(&pat, &ints(&[1, 2])).unwrap();
    assert_eq!(envs, vec![env(&[("x", 1)])]);
}

#[test]
fn symmetric_duplicates_are_collapsed_by_default() {
    let pat = p(PatternKind::Set(vec![p(PatternKind::Ignore), p(PatternKind::Ignore)]));
    let value = ints(&[1, 2]);
    assert_eq!(match_pattern(&pat, &value).unwrap().len(), 1);
    let raw = Matcher::new().with_dedupe(false).matches(&pat, &value).unwrap();
    assert_eq!(raw.len(), 2);
}

#[test]
fn literal_mismatch_is_pattern_failure_not_coercion() {
    let err = match_pattern(&p(PatternKind::Bool(true)), &Value::bool(false)).unwrap_err();
    assert_eq!(err.code, ErrorCode::BoolPatternFailed);
    assert_eq!(err.message, "Boolean pattern match failed");

    let err = match_pattern(&p(PatternKind::Char('a')), &Value::Char('b')).unwrap_err();
    assert_eq!(err.code, ErrorCode::CharPatternFailed);

    let err = match_pattern(&p(PatternKind::Int(3)), &Value::int(4)).unwrap_err();
    assert_eq!(err.code, ErrorCode::IntPatternFailed);
}

#[test]
fn literal_against_incompatible_tag_reports_coercion_code() {
    let err = match_pattern(&p(PatternKind::Int(3)), &ints(&[3])).unwrap_err();
    assert_eq!(err.code, ErrorCode::ExpectedInt);
}

#[test]
fn numeric_literals_match_across_int_and_real() {
    assert!(match_pattern(&p(PatternKind::Int(3)), &Value::real(3.0)).is_ok());
    assert!(match_pattern(&p(PatternKind::Real(2.0)), &Value::int(2)).is_ok());
    assert!(match_pattern(&p(PatternKind::Real(2.5)), &Value::int(2)).is_err());
}

#[test]
fn repeated_name_must_bind_equal_values() {
    let pat = p(PatternKind::Seq(vec![id("x"), id("x")]));
    assert!(match_pattern(&pat, &Value::seq(vec![Value::int(1), Value::int(1)])).is_ok());
    let err = match_pattern(&pat, &Value::seq(vec![Value::int(1), Value::int(2)])).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValuesDoNotMatch);
}

#[test]
fn sequence_pattern_is_positional() {
    let pat = p(PatternKind::Seq(vec![id("a"), id("b")]));
    let envs = match_pattern(&pat, &Value::seq(vec![Value::int(5), Value::int(6)])).unwrap();
    assert_eq!(envs, vec![env(&[("a", 5), ("b", 6)])]);
    let err = match_pattern(&pat, &Value::seq(vec![Value::int(5)])).unwrap_err();
    assert_eq!(err.code, ErrorCode::SeqPatternLength);
}

#[test]
fn record_pattern_takes_product_of_fields() {
    let ty = Arc::new(RecordType::new(
        n("Pair"),
        vec![
            RecordField::new(n("l"), Type::Set(Box::new(Type::Nat))),
            RecordField::new(n("r"), Type::Set(Box::new(Type::Nat))),
        ],
    ));
    let value = Value::record(Arc::clone(&ty), vec![ints(&[1, 2]), ints(&[3, 4])]).unwrap();
    let pat = p(PatternKind::Record {
        ty: Arc::clone(&ty),
        fields: vec![
            p(PatternKind::Set(vec![id("a"), id("b")])),
            p(PatternKind::Set(vec![id("c"), id("d")])),
        ],
    });
    let envs = match_pattern(&pat, &value).unwrap();
    assert_eq!(envs.len(), 4);

    let other = Arc::new(RecordType::new(n("Other"), vec![]));
    let pat = p(PatternKind::Record {
        ty: other,
        fields: vec![],
    });
    assert_eq!(
        match_pattern(&pat, &value).unwrap_err().code,
        ErrorCode::RecordPatternType
    );
}

#[test]
fn concat_pattern_tries_every_split() {
    let pat = p(PatternKind::Concat(Box::new(id("l")), Box::new(id("r"))));
    let value = Value::seq(vec![Value::int(1), Value::int(2)]);
    let envs = match_pattern(&pat, &value).unwrap();
    assert_eq!(envs.len(), 3);
    assert_eq!(envs[0].get(n("l")), Some(&Value::empty_seq()));
    assert_eq!(envs[2].get(n("r")), Some(&Value::empty_seq()));
}

#[test]
fn concat_pattern_with_fixed_prefix() {
    let pat = p(PatternKind::Concat(
        Box::new(p(PatternKind::Seq(vec![id("h")]))),
        Box::new(id("t")),
    ));
    let value = Value::seq(vec![Value::int(7), Value::int(8), Value::int(9)]);
    let envs = match_pattern(&pat, &value).unwrap();
    assert_eq!(envs.len(), 1);
    assert_eq!(envs[0].get(n("h")), Some(&Value::int(7)));
    assert_eq!(
        envs[0].get(n("t")),
        Some(&Value::seq(vec![Value::int(8), Value::int(9)]))
    );
}

#[test]
fn union_pattern_enumerates_partitions() {
    let pat = p(PatternKind::Union(Box::new(id("a")), Box::new(id("b"))));
    let envs = match_pattern(&pat, &ints(&[1, 2])).unwrap();
    assert_eq!(envs.len(), 4);
    for e in &envs {
        let a = e.get(n("a")).unwrap().as_set().unwrap();
        let b = e.get(n("b")).unwrap().as_set().unwrap();
        assert_eq!(a.len() + b.len(), 2);
        assert!(a.is_disjoint(b));
    }
}

#[test]
fn quote_nil_and_string_patterns() {
    assert!(match_pattern(&p(PatternKind::Quote(n("RED"))), &Value::quote("RED")).is_ok());
    assert_eq!(
        match_pattern(&p(PatternKind::Quote(n("RED"))), &Value::quote("GREEN"))
            .unwrap_err()
            .code,
        ErrorCode::QuotePatternFailed
    );
    assert!(match_pattern(&p(PatternKind::Nil), &Value::Nil).is_ok());
    assert_eq!(
        match_pattern(&p(PatternKind::Nil), &Value::int(0)).unwrap_err().code,
        ErrorCode::NilPatternFailed
    );
    assert!(match_pattern(&p(PatternKind::Str("hi".into())), &Value::string("hi")).is_ok());
}

#[test]
fn object_pattern_matches_instance_variables() {
    let class_ctx = Context::global();
    let state = class_ctx.object_scope(n("Account"), Location::DUMMY);
    state.declare(n("balance"), Value::int(10));
    let obj = Value::object(n("Account"), state);
    let pat = p(PatternKind::Object {
        class: n("Account"),
        fields: vec![(n("balance"), id("b"))],
    });
    let envs = match_pattern(&pat, &obj).unwrap();
    assert_eq!(envs, vec![env(&[("b", 10)])]);

    let pat = p(PatternKind::Object {
        class: n("Other"),
        fields: vec![],
    });
    assert_eq!(
        match_pattern(&pat, &obj).unwrap_err().code,
        ErrorCode::ObjectPatternFailed
    );
}

#[test]
fn matches_all_is_positional_over_parameters() {
    let matcher = Matcher::new();
    let envs = matcher
        .matches_all(
            &[id("a"), p(PatternKind::Int(2))],
            &[Value::int(1), Value::int(2)],
            Location::DUMMY,
        )
        .unwrap();
    assert_eq!(envs, vec![env(&[("a", 1)])]);
    assert!(matcher
        .matches_all(&[id("a")], &[Value::int(1), Value::int(2)], Location::DUMMY)
        .is_err());
}

fn factorial(k: usize) -> usize {
    (1..=k).product()
}

proptest! {
    #[test]
    fn set_pattern_of_distinct_names_yields_k_factorial(
        values in proptest::collection::btree_set(-50i64..50, 1..=5)
    ) {
        let k = values.len();
        let patterns: Vec<Pattern> = (0..k).map(|i| id(&format!("v{i}"))).collect();
        let pat = p(PatternKind::Set(patterns));
        let set = Value::set(values.iter().copied().map(Value::int));
        let envs = match_pattern(&pat, &set).unwrap();
        prop_assert_eq!(envs.len(), factorial(k));
        for e in &envs {
            let bound: std::collections::BTreeSet<i64> =
                e.iter().map(|(_, v)| v.as_int().unwrap()).collect();
            prop_assert_eq!(&bound, &values);
        }
    }

    #[test]
    fn set_pattern_size_mismatch_never_matches(
        values in proptest::collection::btree_set(0i64..100, 0..6),
        k in 0usize..6,
    ) {
        prop_assume!(values.len() != k);
        let patterns: Vec<Pattern> = (0..k).map(|i| id(&format!("w{i}"))).collect();
        let pat = p(PatternKind::Set(patterns));
        let set = Value::set(values.iter().copied().map(Value::int));
        prop_assert!(match_pattern(&pat, &set).is_err());
    }

    #[test]
    fn int_literal_matches_iff_equal(a in -1000i64..1000, b in -1000i64..1000) {
        let result = match_pattern(&p(PatternKind::Int(a)), &Value::int(b));
        prop_assert_eq!(result.is_ok(), a == b);
        if let Err(e) = result {
            prop_assert_eq!(e.code, ErrorCode::IntPatternFailed);
        }
    }
}
