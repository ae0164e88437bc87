//! Evaluation settings.

/// Interpreter policy knobs.
///
/// Plain data with `#[must_use]` setters; every field has a default that
/// matches the reference behaviour of the language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Function and operation applications allowed on one logical thread
    /// before the stack-overflow error (4174) is raised.
    pub max_call_depth: usize,
    /// Passes the static initializer makes before giving up.
    pub init_passes: usize,
    /// Whether structurally identical binding environments from symmetric
    /// set patterns are collapsed before binding constructs see them.
    pub dedupe_bindings: bool,
    /// Whether function and operation preconditions are evaluated on entry.
    pub check_preconditions: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_call_depth: 1024,
            init_passes: 5,
            dedupe_bindings: true,
            check_preconditions: true,
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn init_passes(mut self, passes: usize) -> Self {
        self.init_passes = passes;
        self
    }

    #[must_use]
    pub fn dedupe_bindings(mut self, dedupe: bool) -> Self {
        self.dedupe_bindings = dedupe;
        self
    }

    #[must_use]
    pub fn check_preconditions(mut self, check: bool) -> Self {
        self.check_preconditions = check;
        self
    }
}

#[cfg(test)]
mod tests;
