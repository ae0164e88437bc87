//! Runtime diagnostics for the VDM interpreter.
//!
//! Every runtime failure carries a stable four-digit [`ErrorCode`]. Tools
//! match on the number, so numbers are never reused or renumbered.

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
