use pretty_assertions::assert_eq;
use vdm_diagnostic::{ErrorCode, Severity};
use vdm_ir::{Location, Name};

use super::*;
use crate::value::Value;

fn loc(line: u32) -> Location {
    Location::at(Name::intern("test.vdmsl"), line, 1)
}

#[test]
fn innermost_location_wins() {
    let err = division_by_zero().at(loc(3)).at(loc(7));
    assert_eq!(err.location, Some(loc(3)));
}

#[test]
fn dummy_location_is_ignored() {
    let err = division_by_zero().at(Location::DUMMY).at(loc(5));
    assert_eq!(err.location, Some(loc(5)));
}

#[test]
fn display_includes_number_and_location() {
    let err = not_in_scope(Name::intern("x")).at(loc(2));
    assert_eq!(
        err.to_string(),
        "Error 4034: Name 'x' not in scope in 'test.vdmsl' at line 2:1"
    );
    assert!(err.is_not_in_scope());
    assert_eq!(err.number(), 4034);
}

#[test]
fn coercion_records_requested_and_actual_kind() {
    let err = coercion(ErrorCode::ExpectedBool, "bool", &Value::int(3));
    assert_eq!(
        err.kind,
        EvalErrorKind::Coercion {
            requested: "bool",
            actual: "nat1".to_string(),
        }
    );
    assert_eq!(err.message, "Expecting bool, got 3");
}

#[test]
fn pattern_mismatch_converts_to_pattern_failed_abort() {
    let mismatch = PatternMismatch::new(ErrorCode::IntPatternFailed, "Integer pattern match failed", loc(9));
    let err: EvalError = mismatch.into();
    assert_eq!(err.kind, EvalErrorKind::PatternFailed);
    assert_eq!(err.code, ErrorCode::IntPatternFailed);
    assert_eq!(err.location, Some(loc(9)));
}

#[test]
fn control_errors_are_classified() {
    assert!(stack_overflow(1024).is_stack_overflow());
    assert!(terminated().is_terminated());
    assert!(!unknown_class(Name::intern("C")).is_not_in_scope());
    assert_eq!(hook_failure("coverage", "boom").code, ErrorCode::HookFailure);
}

#[test]
fn backtrace_is_kept_from_innermost_frame() {
    let inner = EvalBacktrace::new(vec![BacktraceFrame {
        name: "f".into(),
        location: loc(1),
    }]);
    let outer = EvalBacktrace::new(vec![]);
    let err = iota_none().with_backtrace(inner.clone()).with_backtrace(outer);
    assert_eq!(err.backtrace, Some(inner));
}

#[test]
fn diagnostic_carries_notes_and_frames() {
    let err = precondition_failure(Name::intern("f"))
        .at(loc(4))
        .with_note("while initializing module M")
        .with_backtrace(EvalBacktrace::new(vec![BacktraceFrame {
            name: "f".into(),
            location: loc(4),
        }]));
    let diag = err.to_diagnostic();
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.code, ErrorCode::PreconditionFailure);
    assert_eq!(diag.location, Some(loc(4)));
    assert_eq!(diag.notes.len(), 2);
}
