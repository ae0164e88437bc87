//! State shared by every interpreter of one run.

use parking_lot::Mutex;
use vdm_patterns::Context;

use super::ClassTable;

/// The root context, the class table and the static scopes of one run.
///
/// Module and class scopes bind functions and operations that close over
/// those same scopes, and the root re-exports them. Nothing else would
/// ever free them, so the session clears them when the last interpreter
/// sharing it is dropped.
pub(super) struct Session {
    pub(super) root: Context,
    pub(super) classes: ClassTable,
    scopes: Mutex<Vec<Context>>,
}

impl Session {
    pub(super) fn new(root: Context, classes: ClassTable) -> Self {
        Session {
            root,
            classes,
            scopes: Mutex::new(Vec::new()),
        }
    }

    /// Keep `scope` until the session ends.
    pub(super) fn adopt(&self, scope: Context) {
        self.scopes.lock().push(scope);
    }

    pub(super) fn scope_count(&self) -> usize {
        self.scopes.lock().len()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let scopes = std::mem::take(self.scopes.get_mut());
        tracing::trace!(scopes = scopes.len(), "clearing session scopes");
        for scope in &scopes {
            scope.clear();
        }
        self.root.clear();
    }
}
