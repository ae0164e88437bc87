use std::fmt;

use vdm_ir::Location;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Note => write!(f, "Note"),
        }
    }
}

/// A reportable runtime diagnostic.
///
/// Renders as `Error 4034: Name 'x' not in scope in 'spec.vdmsl' at line 3:7`,
/// followed by one indented line per note.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(code: ErrorCode) -> Self {
        Diagnostic {
            code,
            severity: Severity::Error,
            message: String::new(),
            location: None,
            notes: Vec::new(),
        }
    }

    pub fn warning(code: ErrorCode) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Self::error(code)
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.code, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " {location}")?;
        }
        for note in &self.notes {
            write!(f, "\n  {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use vdm_ir::Name;

    use super::*;

    #[test]
    fn test_render() {
        let diag = Diagnostic::error(ErrorCode::NotInScope)
            .with_message("Name 'x' not in scope")
            .with_location(Location::at(Name::intern("spec.vdmsl"), 3, 7));
        assert_eq!(
            diag.to_string(),
            "Error 4034: Name 'x' not in scope in 'spec.vdmsl' at line 3:7"
        );
    }

    #[test]
    fn test_render_notes() {
        let diag = Diagnostic::warning(ErrorCode::DivisionByZero)
            .with_message("Division by zero")
            .with_note("in 'f'");
        assert!(!diag.is_error());
        assert_eq!(diag.to_string(), "Warning 4134: Division by zero\n  in 'f'");
    }
}
