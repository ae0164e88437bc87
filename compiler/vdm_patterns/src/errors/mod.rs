//! Error types for evaluation and pattern matching.
//!
//! Runtime failures are a single [`EvalError`] carrying a structured
//! [`EvalErrorKind`], a stable [`ErrorCode`] and a located message. Factory
//! functions are the public construction API; each is `#[cold]` since
//! errors are off the hot path.
//!
//! Pattern failures are a separate [`PatternMismatch`]: they are expected
//! during matching and never escape the engine except as the `Err` of a
//! top-level match, which callers convert into an abort only when a
//! construct requires at least one binding.

use std::fmt;

use vdm_diagnostic::{Diagnostic, ErrorCode};
use vdm_ir::{Location, Name};

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// A numbered domain failure: empty `dinter`, division by zero, bad
    /// index, and so on.
    Abort,
    /// A value's runtime tag did not match what an operation required.
    Coercion {
        requested: &'static str,
        actual: String,
    },
    /// A name could not be resolved. `not_in_scope` failures during static
    /// initialization are expected artifacts of forward references.
    NameResolution { name: Name, not_in_scope: bool },
    /// A construct required a binding and the pattern did not match.
    PatternFailed,
    /// Runaway recursion.
    StackOverflow { depth: usize },
    /// Evaluation observed an external terminate request.
    Terminated,
    /// An evaluation hook failed.
    Hook { hook: String },
}

/// A single frame in an evaluation backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Function or operation name.
    pub name: String,
    /// Where the frame was entered.
    pub location: Location,
}

/// Call chain at the point an error was raised, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {} {}", frame.name, frame.location)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub code: ErrorCode,
    pub message: String,
    /// Location of the innermost node that failed.
    pub location: Option<Location>,
    pub backtrace: Option<EvalBacktrace>,
    pub notes: Vec<String>,
}

impl EvalError {
    /// Create an abort with a code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::from_kind(EvalErrorKind::Abort, code, message)
    }

    fn from_kind(kind: EvalErrorKind, code: ErrorCode, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            code,
            message: message.into(),
            location: None,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    /// Set the location if none is recorded yet, so the innermost node wins.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        if self.location.is_none() && !location.is_dummy() {
            self.location = Some(location);
        }
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() {
            self.backtrace = Some(backtrace);
        }
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// The stable error number.
    pub fn number(&self) -> u32 {
        self.code.number()
    }

    pub fn is_not_in_scope(&self) -> bool {
        matches!(
            self.kind,
            EvalErrorKind::NameResolution {
                not_in_scope: true,
                ..
            }
        )
    }

    pub fn is_stack_overflow(&self) -> bool {
        matches!(self.kind, EvalErrorKind::StackOverflow { .. })
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.kind, EvalErrorKind::Terminated)
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code).with_message(self.message.clone());
        if let Some(location) = self.location {
            diag = diag.with_location(location);
        }
        for note in &self.notes {
            diag = diag.with_note(note.clone());
        }
        if let Some(backtrace) = &self.backtrace {
            for frame in backtrace.frames() {
                diag = diag.with_note(format!("in '{}' {}", frame.name, frame.location));
            }
        }
        diag
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {}: {}", self.code, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " {location}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

/// A failed structural match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMismatch {
    pub code: ErrorCode,
    pub message: String,
    pub location: Location,
}

impl PatternMismatch {
    pub fn new(code: ErrorCode, message: impl Into<String>, location: Location) -> Self {
        PatternMismatch {
            code,
            message: message.into(),
            location,
        }
    }

    /// Convert into an abort for constructs that require a match.
    pub fn into_abort(self) -> EvalError {
        EvalError::from_kind(EvalErrorKind::PatternFailed, self.code, self.message)
            .at(self.location)
    }
}

impl fmt::Display for PatternMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {}: {} {}", self.code, self.message, self.location)
    }
}

impl From<PatternMismatch> for EvalError {
    fn from(mismatch: PatternMismatch) -> Self {
        mismatch.into_abort()
    }
}

// Coercion

/// A value's tag did not match the requested kind.
#[cold]
pub fn coercion(code: ErrorCode, requested: &'static str, actual: &Value) -> EvalError {
    let actual_kind = actual.kind().to_string();
    EvalError::from_kind(
        EvalErrorKind::Coercion {
            requested,
            actual: actual_kind,
        },
        code,
        format!("Expecting {requested}, got {actual}"),
    )
}

// Name resolution

#[cold]
pub fn not_in_scope(name: Name) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NameResolution {
            name,
            not_in_scope: true,
        },
        ErrorCode::NotInScope,
        format!("Name '{name}' not in scope"),
    )
}

#[cold]
pub fn unknown_class(name: Name) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NameResolution {
            name,
            not_in_scope: false,
        },
        ErrorCode::UnknownClass,
        format!("Class '{name}' not found"),
    )
}

#[cold]
pub fn no_self() -> EvalError {
    EvalError::new(ErrorCode::NoSelf, "'self' is not available outside an object")
}

// Arithmetic

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::new(ErrorCode::DivisionByZero, "Division by zero")
}

#[cold]
pub fn arithmetic_overflow(operation: &str) -> EvalError {
    EvalError::new(
        ErrorCode::ArithmeticOverflow,
        format!("Arithmetic overflow in {operation}"),
    )
}

// Collections

#[cold]
pub fn empty_dinter() -> EvalError {
    EvalError::new(ErrorCode::EmptyDistIntersection, "Cannot take dinter of empty set")
}

#[cold]
pub fn cardinality(message: impl Into<String>) -> EvalError {
    EvalError::new(ErrorCode::Cardinality, message)
}

#[cold]
pub fn seq_index_out_of_range(index: i64, len: usize) -> EvalError {
    EvalError::new(
        ErrorCode::SeqIndexOutOfRange,
        format!("Sequence index {index} out of range 1..{len}"),
    )
}

#[cold]
pub fn empty_sequence(operation: &str) -> EvalError {
    EvalError::new(
        ErrorCode::EmptySequence,
        format!("Cannot take {operation} of empty sequence"),
    )
}

#[cold]
pub fn map_key_missing(key: &Value) -> EvalError {
    EvalError::new(ErrorCode::MapKeyMissing, format!("No such key value in map: {key}"))
}

#[cold]
pub fn duplicate_map_key(key: &Value) -> EvalError {
    EvalError::new(
        ErrorCode::DuplicateMapKey,
        format!("Duplicate map keys have different values: {key}"),
    )
}

// Records

#[cold]
pub fn record_field_count(record: Name, expected: usize, got: usize) -> EvalError {
    EvalError::new(
        ErrorCode::RecordFieldCount,
        format!("Record '{record}' has {expected} fields, got {got}"),
    )
}

#[cold]
pub fn record_field_type(record: Name, field: Name, value: &Value) -> EvalError {
    EvalError::new(
        ErrorCode::RecordFieldType,
        format!("Field '{field}' of '{record}' cannot be {value}"),
    )
}

#[cold]
pub fn unknown_field(field: Name, value: &Value) -> EvalError {
    EvalError::new(
        ErrorCode::UnknownField,
        format!("No field '{field}' in {}", value.kind()),
    )
}

// Binding constructs

#[cold]
pub fn no_cases_apply(value: &Value) -> EvalError {
    EvalError::new(ErrorCode::NoCasesApply, format!("No cases apply for {value}"))
}

#[cold]
pub fn iota_none() -> EvalError {
    EvalError::new(ErrorCode::IotaNone, "Iota does not select a result")
}

#[cold]
pub fn iota_multiple() -> EvalError {
    EvalError::new(ErrorCode::IotaMultiple, "Iota selects more than one result")
}

#[cold]
pub fn let_be_st_none() -> EvalError {
    EvalError::new(ErrorCode::LetBeStNoBinding, "Let be st found no applicable bindings")
}

#[cold]
pub fn infinite_type_bind(ty: &vdm_ir::Type) -> EvalError {
    EvalError::new(
        ErrorCode::InfiniteTypeBind,
        format!("Cannot enumerate values of type {ty}"),
    )
}

// Application

#[cold]
pub fn wrong_argument_count(name: Name, expected: usize, got: usize) -> EvalError {
    EvalError::new(
        ErrorCode::WrongArgumentCount,
        format!("'{name}' expects {expected} arguments, got {got}"),
    )
}

#[cold]
pub fn parameter_mismatch(name: Name, mismatch: &PatternMismatch) -> EvalError {
    EvalError::new(
        ErrorCode::ParameterPatternMismatch,
        format!("Arguments of '{name}' do not match parameters: {}", mismatch.message),
    )
}

#[cold]
pub fn precondition_failure(name: Name) -> EvalError {
    EvalError::new(
        ErrorCode::PreconditionFailure,
        format!("Precondition failure: pre_{name}"),
    )
}

#[cold]
pub fn not_yet_specified(name: Name) -> EvalError {
    EvalError::new(ErrorCode::NotYetSpecified, format!("'{name}' is not yet specified"))
}

#[cold]
pub fn already_instantiated(name: Name) -> EvalError {
    EvalError::new(
        ErrorCode::AlreadyInstantiated,
        format!("Function is already instantiated: {name}"),
    )
}

#[cold]
pub fn not_applicable(value: &Value) -> EvalError {
    EvalError::new(
        ErrorCode::NotApplicable,
        format!("Value of kind {} cannot be applied", value.kind()),
    )
}

#[cold]
pub fn no_return_value(name: Name) -> EvalError {
    EvalError::new(
        ErrorCode::NoReturnValue,
        format!("Operation '{name}' did not return a value"),
    )
}

#[cold]
pub fn undefined_value() -> EvalError {
    EvalError::new(ErrorCode::UndefinedValue, "Value is undefined")
}

// Statements

#[cold]
pub fn cannot_assign_immutable(name: Name) -> EvalError {
    EvalError::new(
        ErrorCode::ImmutableAssignment,
        format!("Cannot assign to immutable name '{name}'"),
    )
}

#[cold]
pub fn error_statement() -> EvalError {
    EvalError::new(ErrorCode::ErrorStatement, "ERROR statement reached")
}

#[cold]
pub fn zero_loop_step() -> EvalError {
    EvalError::new(ErrorCode::ZeroLoopStep, "Loop step cannot be zero")
}

// Interpreter control

#[cold]
pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::StackOverflow { depth },
        ErrorCode::StackOverflow,
        format!("Stack overflow: call depth exceeded {depth}"),
    )
}

#[cold]
pub fn terminated() -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Terminated,
        ErrorCode::Terminated,
        "Evaluation terminated",
    )
}

#[cold]
pub fn hook_failure(hook: &str, message: impl fmt::Display) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Hook {
            hook: hook.to_string(),
        },
        ErrorCode::HookFailure,
        format!("Hook '{hook}' failed: {message}"),
    )
}

#[cfg(test)]
mod tests;
