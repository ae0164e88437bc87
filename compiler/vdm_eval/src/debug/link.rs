//! Breakpoints, stepping and thread control.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;
use vdm_ir::{Expr, Location, ModuleList, Name};
use vdm_patterns::errors::terminated;
use vdm_patterns::EvalError;

use super::{Evaluate, LogTraceCallback, SuspendCheck, SuspendPoint, ThreadId, TraceCallback};

/// Errors of the debugger front-end API.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DebugError {
    #[error("no such thread {0}")]
    UnknownThread(ThreadId),
    #[error("thread {0} is not stopped")]
    NotStopped(ThreadId),
    #[error("no statement or expression at line {line} of '{file}'")]
    NoCodeAt { file: Name, line: u32 },
    #[error("debug channel disconnected")]
    Disconnected,
}

/// Commands served by a stopped thread.
#[derive(Clone, Debug)]
pub enum DebugCommand {
    Continue,
    StepIn,
    StepOver,
    StepOut,
    /// Stop this thread: it returns a terminate error at this point.
    Stop,
    /// Stop every thread at its next suspension point.
    Terminate,
    /// Evaluate an expression in the stopped context.
    Evaluate(Expr),
    Stack,
    Scopes,
    /// Bindings of the scope at this index of `Scopes`.
    Variables(usize),
}

/// One frame of a `Stack` response, innermost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    pub title: String,
    pub location: Location,
}

/// One frame of a `Scopes` response, innermost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeInfo {
    pub index: usize,
    pub title: String,
}

/// Reply to a `DebugCommand`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DebugResponse {
    /// The thread resumed (continue, step) or stopped for good.
    Resumed,
    Value(String),
    Error(String),
    Stack(Vec<FrameInfo>),
    Scopes(Vec<ScopeInfo>),
    Variables(Vec<(String, String)>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    Breakpoint(u32),
    Step,
    Pause,
}

/// Published when a thread stops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopEvent {
    pub thread: ThreadId,
    pub reason: StopReason,
    pub location: Location,
}

#[derive(Clone, Debug)]
pub struct Breakpoint {
    pub number: u32,
    pub location: Location,
    /// Stop only when this evaluates to true.
    pub condition: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct Tracepoint {
    pub number: u32,
    pub location: Location,
    /// Source text of the guard, for the report.
    pub source: String,
    pub guard: Option<Expr>,
}

/// Enumeration entry for `DebugLink::threads`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadInfo {
    pub id: ThreadId,
    pub name: String,
    pub stopped: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StepMode {
    Run,
    StepIn,
    StepOver { depth: usize },
    StepOut { depth: usize },
}

struct ThreadEntry {
    name: String,
    stopped: bool,
    pause: bool,
    step: StepMode,
    commands: (Sender<DebugCommand>, Receiver<DebugCommand>),
    responses: (Sender<DebugResponse>, Receiver<DebugResponse>),
}

/// Debugger state shared by every logical thread of a session and the
/// front end that drives them.
pub struct DebugLink {
    threads: RwLock<BTreeMap<ThreadId, ThreadEntry>>,
    next_thread: AtomicU32,
    breakpoints: RwLock<FxHashMap<Location, Breakpoint>>,
    tracepoints: RwLock<FxHashMap<Location, Tracepoint>>,
    next_point: AtomicU32,
    terminated: AtomicBool,
    events: (Sender<StopEvent>, Receiver<StopEvent>),
    trace: Arc<dyn TraceCallback>,
}

impl Default for DebugLink {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugLink {
    pub fn new() -> Self {
        Self::with_trace(Arc::new(LogTraceCallback))
    }

    pub fn with_trace(trace: Arc<dyn TraceCallback>) -> Self {
        DebugLink {
            threads: RwLock::new(BTreeMap::new()),
            next_thread: AtomicU32::new(1),
            breakpoints: RwLock::new(FxHashMap::default()),
            tracepoints: RwLock::new(FxHashMap::default()),
            next_point: AtomicU32::new(1),
            terminated: AtomicBool::new(false),
            events: unbounded(),
            trace,
        }
    }

    // Threads

    pub fn register_thread(&self, name: impl Into<String>) -> ThreadId {
        let id = ThreadId(self.next_thread.fetch_add(1, Ordering::Relaxed));
        self.threads.write().insert(
            id,
            ThreadEntry {
                name: name.into(),
                stopped: false,
                pause: false,
                step: StepMode::Run,
                commands: unbounded(),
                responses: unbounded(),
            },
        );
        id
    }

    pub fn unregister_thread(&self, id: ThreadId) {
        self.threads.write().remove(&id);
    }

    /// Registered threads, ordered by id.
    pub fn threads(&self) -> Vec<ThreadInfo> {
        self.threads
            .read()
            .iter()
            .map(|(id, entry)| ThreadInfo {
                id: *id,
                name: entry.name.clone(),
                stopped: entry.stopped,
            })
            .collect()
    }

    /// Ask a running thread to stop at its next suspension point.
    pub fn pause(&self, id: ThreadId) -> Result<(), DebugError> {
        let mut threads = self.threads.write();
        let entry = threads.get_mut(&id).ok_or(DebugError::UnknownThread(id))?;
        entry.pause = true;
        Ok(())
    }

    /// Stop every thread at its next suspension point.
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::Release);
        // Stopped threads are blocked on their command channel.
        for entry in self.threads.read().values() {
            if entry.stopped {
                entry.commands.0.send(DebugCommand::Terminate).ok();
            }
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    // Breakpoints and tracepoints

    /// Set a breakpoint on the first statement, else the first expression,
    /// starting on `line` of `file`.
    pub fn set_breakpoint(
        &self,
        modules: &ModuleList,
        file: Name,
        line: u32,
        condition: Option<Expr>,
    ) -> Result<u32, DebugError> {
        let location = Self::locate(modules, file, line)?;
        let number = self.next_point.fetch_add(1, Ordering::Relaxed);
        self.breakpoints.write().insert(
            location,
            Breakpoint {
                number,
                location,
                condition,
            },
        );
        Ok(number)
    }

    /// Set a tracepoint; `source` is the guard's text as it should appear in
    /// reports.
    pub fn set_tracepoint(
        &self,
        modules: &ModuleList,
        file: Name,
        line: u32,
        source: impl Into<String>,
        guard: Option<Expr>,
    ) -> Result<u32, DebugError> {
        let location = Self::locate(modules, file, line)?;
        let number = self.next_point.fetch_add(1, Ordering::Relaxed);
        self.tracepoints.write().insert(
            location,
            Tracepoint {
                number,
                location,
                source: source.into(),
                guard,
            },
        );
        Ok(number)
    }

    /// Remove a breakpoint or tracepoint by number.
    pub fn clear(&self, number: u32) -> bool {
        let mut found = false;
        self.breakpoints.write().retain(|_, bp| {
            let keep = bp.number != number;
            found |= !keep;
            keep
        });
        self.tracepoints.write().retain(|_, tp| {
            let keep = tp.number != number;
            found |= !keep;
            keep
        });
        found
    }

    pub fn breakpoints(&self) -> Vec<Breakpoint> {
        let mut list: Vec<_> = self.breakpoints.read().values().cloned().collect();
        list.sort_by_key(|bp| bp.number);
        list
    }

    fn locate(modules: &ModuleList, file: Name, line: u32) -> Result<Location, DebugError> {
        modules
            .find_statement(file, line)
            .map(|stmt| stmt.location)
            .or_else(|| modules.find_expression(file, line).map(|expr| expr.location))
            .ok_or(DebugError::NoCodeAt { file, line })
    }

    // Front end

    /// Stop events from every thread.
    pub fn events(&self) -> Receiver<StopEvent> {
        self.events.1.clone()
    }

    /// Send a command to a stopped thread and wait for its reply.
    pub fn command(
        &self,
        id: ThreadId,
        command: DebugCommand,
    ) -> Result<DebugResponse, DebugError> {
        let (commands, responses) = {
            let threads = self.threads.read();
            let entry = threads.get(&id).ok_or(DebugError::UnknownThread(id))?;
            if !entry.stopped {
                return Err(DebugError::NotStopped(id));
            }
            (entry.commands.0.clone(), entry.responses.1.clone())
        };
        commands.send(command).map_err(|_| DebugError::Disconnected)?;
        responses.recv().map_err(|_| DebugError::Disconnected)
    }

    // Thread side

    fn report_trace(&self, point: &SuspendPoint<'_>, tp: &Tracepoint, eval: &mut dyn Evaluate) {
        let report = match &tp.guard {
            None => format!("Reached trace point [{}]", tp.number),
            Some(guard) => {
                let result = match eval.evaluate(guard, point.context) {
                    Ok(value) => value.to_string(),
                    Err(e) => e.to_string(),
                };
                format!("{} = {} at trace point [{}]", tp.source, result, tp.number)
            }
        };
        self.trace.tracepoint(point.thread, &report);
    }

    fn stop_reason(&self, point: &SuspendPoint<'_>, eval: &mut dyn Evaluate) -> Option<StopReason> {
        let (pause, step) = {
            let mut threads = self.threads.write();
            let entry = threads.get_mut(&point.thread)?;
            (std::mem::take(&mut entry.pause), entry.step)
        };
        if pause {
            return Some(StopReason::Pause);
        }
        let stepped = match step {
            StepMode::Run => false,
            StepMode::StepIn => true,
            StepMode::StepOver { depth } => point.depth <= depth,
            StepMode::StepOut { depth } => point.depth < depth,
        };
        if stepped {
            return Some(StopReason::Step);
        }
        let breakpoint = self.breakpoints.read().get(&point.location).cloned()?;
        let hit = match &breakpoint.condition {
            None => true,
            // A failing condition stops so the failure can be inspected.
            Some(condition) => eval
                .evaluate(condition, point.context)
                .map_or(true, |v| v.as_bool().unwrap_or(true)),
        };
        hit.then_some(StopReason::Breakpoint(breakpoint.number))
    }

    fn set_stopped(&self, id: ThreadId, stopped: bool, step: Option<StepMode>) {
        if let Some(entry) = self.threads.write().get_mut(&id) {
            entry.stopped = stopped;
            if let Some(step) = step {
                entry.step = step;
            }
        }
    }

    /// Block serving commands until resumed.
    pub(super) fn suspend(
        &self,
        point: &SuspendPoint<'_>,
        reason: StopReason,
        eval: &mut dyn Evaluate,
    ) -> Result<(), EvalError> {
        let Some((commands, responses, unread)) =
            self.threads.read().get(&point.thread).map(|entry| {
                (
                    entry.commands.1.clone(),
                    entry.responses.0.clone(),
                    entry.responses.1.clone(),
                )
            })
        else {
            return Ok(());
        };
        // Replies nobody waited for, such as the one to a `terminate`.
        while unread.try_recv().is_ok() {}

        self.set_stopped(point.thread, true, None);
        // `terminate` only signals threads it sees stopped; one that
        // stopped after it looked must notice the flag here.
        if self.is_terminated() {
            self.set_stopped(point.thread, false, Some(StepMode::Run));
            while commands.try_recv().is_ok() {}
            return Err(terminated());
        }
        debug!(thread = %point.thread, ?reason, location = %point.location, "thread stopped");
        self.events
            .0
            .send(StopEvent {
                thread: point.thread,
                reason,
                location: point.location,
            })
            .ok();

        let outcome = loop {
            // A vanished front end resumes the thread.
            let Ok(command) = commands.recv() else {
                break Ok(StepMode::Run);
            };
            let reply = match command {
                DebugCommand::Continue => break Ok(StepMode::Run),
                DebugCommand::StepIn => break Ok(StepMode::StepIn),
                DebugCommand::StepOver => break Ok(StepMode::StepOver { depth: point.depth }),
                DebugCommand::StepOut => break Ok(StepMode::StepOut { depth: point.depth }),
                DebugCommand::Stop => break Err(terminated()),
                DebugCommand::Terminate => {
                    self.terminated.store(true, Ordering::Release);
                    break Err(terminated());
                }
                DebugCommand::Evaluate(expr) => match eval.evaluate(&expr, point.context) {
                    Ok(value) => DebugResponse::Value(value.to_string()),
                    Err(e) => DebugResponse::Error(e.to_string()),
                },
                DebugCommand::Stack => DebugResponse::Stack(Self::stack(point)),
                DebugCommand::Scopes => DebugResponse::Scopes(
                    point
                        .context
                        .frames()
                        .enumerate()
                        .map(|(index, ctx)| ScopeInfo {
                            index,
                            title: ctx.title().to_string(),
                        })
                        .collect(),
                ),
                DebugCommand::Variables(index) => match point.context.frames().nth(index) {
                    Some(ctx) => DebugResponse::Variables(
                        ctx.local_bindings()
                            .into_iter()
                            .map(|(name, value)| (name.to_string(), value.to_string()))
                            .collect(),
                    ),
                    None => DebugResponse::Error(format!("No scope {index}")),
                },
            };
            responses.send(reply).ok();
        };

        let step = outcome.as_ref().ok().copied();
        self.set_stopped(point.thread, false, step.or(Some(StepMode::Run)));
        responses.send(DebugResponse::Resumed).ok();
        debug!(thread = %point.thread, ?step, "thread resumed");
        outcome.map(|_| ())
    }

    /// Innermost first. Each call frame records its call site, which is
    /// where the next frame out is suspended.
    fn stack(point: &SuspendPoint<'_>) -> Vec<FrameInfo> {
        let calls = point.context.call_stack();
        let title = |i: usize| {
            calls
                .get(i)
                .map_or_else(|| "top level".to_string(), |ctx| ctx.title().to_string())
        };
        let mut frames = vec![FrameInfo {
            title: title(0),
            location: point.location,
        }];
        for (i, call) in calls.iter().enumerate() {
            frames.push(FrameInfo {
                title: title(i + 1),
                location: call.location(),
            });
        }
        frames
    }
}

impl SuspendCheck for DebugLink {
    fn check(&self, point: &SuspendPoint<'_>, eval: &mut dyn Evaluate) -> Result<(), EvalError> {
        if self.is_terminated() {
            return Err(terminated());
        }
        let trace = self.tracepoints.read().get(&point.location).cloned();
        if let Some(tp) = trace {
            self.report_trace(point, &tp, eval);
        }
        match self.stop_reason(point, eval) {
            Some(reason) => self.suspend(point, reason, eval),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for DebugLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugLink")
            .field("threads", &self.threads.read().len())
            .field("breakpoints", &self.breakpoints.read().len())
            .field("tracepoints", &self.tracepoints.read().len())
            .field("terminated", &self.is_terminated())
            .finish_non_exhaustive()
    }
}
