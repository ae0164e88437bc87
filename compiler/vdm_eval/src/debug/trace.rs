//! Tracepoint report sinks.

use parking_lot::Mutex;
use tracing::info;

use super::ThreadId;

/// Receives a formatted report each time a tracepoint is reached.
pub trait TraceCallback: Send + Sync {
    fn tracepoint(&self, thread: ThreadId, report: &str);
}

/// Reports through `tracing` at info level.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogTraceCallback;

impl TraceCallback for LogTraceCallback {
    fn tracepoint(&self, thread: ThreadId, report: &str) {
        info!(%thread, "{report}");
    }
}

/// Collects reports in memory.
#[derive(Debug, Default)]
pub struct BufferTraceCallback {
    reports: Mutex<Vec<String>>,
}

impl BufferTraceCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports received so far.
    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }

    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl TraceCallback for BufferTraceCallback {
    fn tracepoint(&self, _thread: ThreadId, report: &str) {
        self.reports.lock().push(report.to_string());
    }
}
