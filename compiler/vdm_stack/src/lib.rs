//! Stack safety utilities for deep recursion.
//!
//! Two separate concerns live here:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand so that
//!   deeply nested (but finite) evaluation never crashes the process.
//! - [`CallDepth`] counts logical call frames so that runaway recursion in
//!   the evaluated model is reported as a classified error instead of
//!   consuming memory until the host gives up.
//!
//! # Configuration
//!
//! - **Red zone**: 128KB - If less than this remains, we grow the stack
//! - **Growth size**: 2MB - Each growth allocates this much additional space
//!
//! Evaluator frames are larger than parser frames (contexts, binding lists
//! and permutation buffers are held across recursive calls), so both values
//! are somewhat above what a parser would need.

/// Minimum stack space to keep available (128KB red zone).
const RED_ZONE: usize = 128 * 1024;

/// Stack space to allocate when growing (2MB).
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// If the remaining stack is below the red zone threshold, this will
/// allocate additional stack space before calling `f`.
///
/// # Platform Behavior
///
/// - **Native**: Uses `stacker::maybe_grow` to dynamically grow the stack
/// - **WASM**: Simply calls `f()` directly (WASM manages its own stack)
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Returned by [`CallDepth::enter`] when the configured limit is reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    /// The limit that was hit.
    pub limit: usize,
}

/// Logical call-depth counter for one evaluation thread.
///
/// `enter` and `leave` must be paired; the interpreter does this around
/// every function and operation application.
#[derive(Clone, Debug)]
pub struct CallDepth {
    current: usize,
    limit: usize,
}

impl CallDepth {
    /// Create a counter with the given limit.
    pub fn new(limit: usize) -> Self {
        CallDepth { current: 0, limit }
    }

    /// Record entry into a new frame.
    pub fn enter(&mut self) -> Result<(), DepthExceeded> {
        if self.current >= self.limit {
            return Err(DepthExceeded { limit: self.limit });
        }
        self.current += 1;
        Ok(())
    }

    /// Record exit from the innermost frame.
    pub fn leave(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Current number of open frames.
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Configured limit.
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests;
