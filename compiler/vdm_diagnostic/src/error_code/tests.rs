use super::*;

fn all_codes() -> Vec<ErrorCode> {
    #[allow(clippy::enum_glob_use)]
    use ErrorCode::*;
    vec![
        AlreadyInstantiated, NoCasesApply, IotaMultiple, IotaNone, LetBeStNoBinding,
        NotYetSpecified, NotInScope, ErrorStatement, PreconditionFailure, MapKeyMissing,
        Cardinality, SeqIndexOutOfRange, WrongArgumentCount, ParameterPatternMismatch,
        EmptySequence, RecordFieldCount, RecordFieldType, UnknownField, DuplicateMapKey,
        InfiniteTypeBind, UnknownClass, NoSelf, NotApplicable, ZeroLoopStep, NoReturnValue,
        UndefinedValue, ImmutableAssignment, ExpectedBool, ExpectedChar, ExpectedReal,
        ExpectedInt, ExpectedNat, ExpectedNat1, ExpectedSet, ExpectedSeq, ExpectedMap, ExpectedRecord,
        ExpectedFunction, ExpectedObject, ExpectedQuote, ExpectedToken, BoolPatternFailed,
        CharPatternFailed, StringPatternFailed, NilPatternFailed, IntPatternFailed,
        QuotePatternFailed, RealPatternFailed, ObjectPatternFailed, ValuesDoNotMatch,
        SeqPatternLength, RecordPatternType, SetPatternSize, SetPatternFailed,
        ConcatPatternFailed, UnionPatternFailed, DivisionByZero, ArithmeticOverflow,
        EmptyDistIntersection, StackOverflow, HookFailure, Terminated,
    ]
}

#[test]
fn numbers_are_unique() {
    let codes = all_codes();
    let mut numbers: Vec<u32> = codes.iter().map(|c| c.number()).collect();
    numbers.sort_unstable();
    numbers.dedup();
    assert_eq!(numbers.len(), codes.len());
}

#[test]
fn well_known_numbers() {
    assert_eq!(ErrorCode::NotInScope.number(), 4034);
    assert_eq!(ErrorCode::EmptyDistIntersection.number(), 4151);
    assert_eq!(ErrorCode::BoolPatternFailed.number(), 4106);
    assert_eq!(ErrorCode::CharPatternFailed.number(), 4107);
    assert_eq!(ErrorCode::AlreadyInstantiated.number(), 3034);
    assert_eq!(ErrorCode::StackOverflow.to_string(), "4174");
}

#[test]
fn classification() {
    for code in all_codes() {
        assert!(!(code.is_pattern_failure() && code.is_coercion()), "{code:?}");
    }
    assert!(ErrorCode::SetPatternSize.is_pattern_failure());
    assert!(ErrorCode::ExpectedSet.is_coercion());
    assert!(!ErrorCode::NotInScope.is_pattern_failure());
}
