use std::fmt;

/// Stable numbered error codes.
///
/// Ranges:
/// - 3xxx: errors in already-checked constructs detected at run time
/// - 40xx: evaluation domain errors
/// - 407x: value coercion failures
/// - 41xx: pattern match failures, arithmetic, structural limits
/// - 42xx: interpreter control (hooks, termination)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    /// Polymorphic function instantiated twice
    AlreadyInstantiated,

    /// No `cases` alternative matched and there is no `others`
    NoCasesApply,
    /// `iota` found more than one binding
    IotaMultiple,
    /// `iota` found no binding
    IotaNone,
    /// `let ... be st` found no binding
    LetBeStNoBinding,
    /// Body is `is not yet specified`
    NotYetSpecified,
    /// Name is not bound in any enclosing scope
    NotInScope,
    /// `error` statement reached
    ErrorStatement,
    /// Function or operation precondition is false
    PreconditionFailure,
    /// Map applied to a key outside its domain
    MapKeyMissing,
    /// Cardinality or power set could not be computed
    Cardinality,
    /// Sequence index outside `inds s`
    SeqIndexOutOfRange,
    /// Application with the wrong number of arguments
    WrongArgumentCount,
    /// Argument values do not match parameter patterns
    ParameterPatternMismatch,
    /// `hd` or `tl` of an empty sequence
    EmptySequence,
    /// `mk_R` with the wrong number of fields
    RecordFieldCount,
    /// `mk_R` field value does not conform to its declared type
    RecordFieldType,
    /// Field selection of an unknown tag
    UnknownField,
    /// `munion` or map enumeration with clashing keys
    DuplicateMapKey,
    /// Type bind over a type with no finite enumeration
    InfiniteTypeBind,
    /// `new` of an unknown class
    UnknownClass,
    /// `self` outside an object context
    NoSelf,
    /// Applying a value that is not a function, operation, sequence or map
    NotApplicable,
    /// Indexed `for` loop with a zero step
    ZeroLoopStep,
    /// Operation body produced no value where one was required
    NoReturnValue,
    /// An `undefined` value was used
    UndefinedValue,
    /// Assignment to a name that is not a state or instance variable
    ImmutableAssignment,

    /// Value is not a bool
    ExpectedBool,
    /// Value is not a char
    ExpectedChar,
    /// Value is not a number
    ExpectedReal,
    /// Value is not an integer
    ExpectedInt,
    /// Value is not a natural
    ExpectedNat,
    /// Value is not a positive natural
    ExpectedNat1,
    /// Value is not a set
    ExpectedSet,
    /// Value is not a sequence
    ExpectedSeq,
    /// Value is not a map
    ExpectedMap,
    /// Value is not a record
    ExpectedRecord,
    /// Value is not a function
    ExpectedFunction,
    /// Value is not an object reference
    ExpectedObject,
    /// Value is not a quote
    ExpectedQuote,
    /// Value is not a token
    ExpectedToken,

    /// Bool pattern did not match
    BoolPatternFailed,
    /// Char pattern did not match
    CharPatternFailed,
    /// String pattern did not match
    StringPatternFailed,
    /// Nil pattern did not match
    NilPatternFailed,
    /// Integer pattern did not match
    IntPatternFailed,
    /// Quote pattern did not match
    QuotePatternFailed,
    /// Real pattern did not match
    RealPatternFailed,
    /// Object pattern against an instance of another class
    ObjectPatternFailed,
    /// A name bound twice to different values
    ValuesDoNotMatch,
    /// Sequence pattern length differs from the value's
    SeqPatternLength,
    /// Record pattern of a different record type
    RecordPatternType,
    /// Set pattern size differs from the value's cardinality
    SetPatternSize,
    /// No bijection matched the set pattern
    SetPatternFailed,
    /// No split of the sequence matched the concatenation pattern
    ConcatPatternFailed,
    /// No partition of the set matched the union pattern
    UnionPatternFailed,

    /// Division by zero
    DivisionByZero,
    /// Integer arithmetic overflow
    ArithmeticOverflow,
    /// `dinter` of an empty set
    EmptyDistIntersection,
    /// Runaway recursion
    StackOverflow,

    /// An evaluation hook failed
    HookFailure,
    /// Evaluation stopped by an external terminate request
    Terminated,
}

impl ErrorCode {
    /// The stable number reported to users and tools.
    pub fn number(self) -> u32 {
        match self {
            ErrorCode::AlreadyInstantiated => 3034,

            ErrorCode::NoCasesApply => 4004,
            ErrorCode::IotaMultiple => 4013,
            ErrorCode::IotaNone => 4014,
            ErrorCode::LetBeStNoBinding => 4015,
            ErrorCode::NotYetSpecified => 4024,
            ErrorCode::NotInScope => 4034,
            ErrorCode::ErrorStatement => 4036,
            ErrorCode::PreconditionFailure => 4055,
            ErrorCode::MapKeyMissing => 4061,
            ErrorCode::Cardinality => 4065,
            ErrorCode::SeqIndexOutOfRange => 4083,
            ErrorCode::WrongArgumentCount => 4087,
            ErrorCode::ParameterPatternMismatch => 4088,
            ErrorCode::EmptySequence => 4089,
            ErrorCode::RecordFieldCount => 4090,
            ErrorCode::RecordFieldType => 4091,
            ErrorCode::UnknownField => 4092,
            ErrorCode::DuplicateMapKey => 4093,
            ErrorCode::InfiniteTypeBind => 4094,
            ErrorCode::UnknownClass => 4095,
            ErrorCode::NoSelf => 4096,
            ErrorCode::NotApplicable => 4097,
            ErrorCode::ZeroLoopStep => 4098,
            ErrorCode::NoReturnValue => 4099,
            ErrorCode::UndefinedValue => 4100,
            ErrorCode::ImmutableAssignment => 4101,

            ErrorCode::ExpectedBool => 4070,
            ErrorCode::ExpectedChar => 4071,
            ErrorCode::ExpectedReal => 4072,
            ErrorCode::ExpectedInt => 4073,
            ErrorCode::ExpectedNat => 4074,
            ErrorCode::ExpectedNat1 => 4075,
            ErrorCode::ExpectedSet => 4076,
            ErrorCode::ExpectedSeq => 4077,
            ErrorCode::ExpectedMap => 4078,
            ErrorCode::ExpectedRecord => 4079,
            ErrorCode::ExpectedFunction => 4080,
            ErrorCode::ExpectedObject => 4081,
            ErrorCode::ExpectedQuote => 4082,
            ErrorCode::ExpectedToken => 4084,

            ErrorCode::BoolPatternFailed => 4106,
            ErrorCode::CharPatternFailed => 4107,
            ErrorCode::StringPatternFailed => 4108,
            ErrorCode::NilPatternFailed => 4109,
            ErrorCode::IntPatternFailed => 4111,
            ErrorCode::QuotePatternFailed => 4112,
            ErrorCode::RealPatternFailed => 4113,
            ErrorCode::ObjectPatternFailed => 4114,
            ErrorCode::ValuesDoNotMatch => 4116,
            ErrorCode::SeqPatternLength => 4117,
            ErrorCode::RecordPatternType => 4118,
            ErrorCode::SetPatternSize => 4119,
            ErrorCode::SetPatternFailed => 4120,
            ErrorCode::ConcatPatternFailed => 4121,
            ErrorCode::UnionPatternFailed => 4122,

            ErrorCode::DivisionByZero => 4134,
            ErrorCode::ArithmeticOverflow => 4135,
            ErrorCode::EmptyDistIntersection => 4151,
            ErrorCode::StackOverflow => 4174,

            ErrorCode::HookFailure => 4200,
            ErrorCode::Terminated => 4201,
        }
    }

    /// Pattern failures are recoverable: the caller tries the next candidate.
    pub fn is_pattern_failure(self) -> bool {
        (4106..=4122).contains(&self.number())
    }

    /// Coercion failures.
    pub fn is_coercion(self) -> bool {
        (4070..=4084).contains(&self.number())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[cfg(test)]
mod tests;
