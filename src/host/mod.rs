//! Host debugger collaborator.
//!
//! The actual debugger lives in the host application; this crate only
//! observes it. [`HostDebugger`] covers the queries and mutations we need,
//! and every mutation enqueues [`HostEvent`]s on the host's extension points.
//! The session drains those events after each call and dispatches them, so
//! state mirroring never depends on advice or monkey-patching.

mod scripted;

pub use scripted::ScriptedHost;

use thiserror::Error;

/// Errors reported by the host debugger.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HostError {
    #[error("`{0}` has not been evaluated")]
    NotYetEvaluated(String),

    #[error("`{0}` is not a function")]
    NotAFunction(String),

    #[error("`{0}` is not instrumented")]
    NotInstrumented(String),

    #[error("`{function}` has no stop point {index}")]
    NoSuchStopPoint { function: String, index: usize },

    #[error("no breakpoint at stop point {index} of `{function}`")]
    NoSuchBreakpoint { function: String, index: usize },
}

/// Instrumentation status of a symbol, as the host reports it live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentationStatus {
    Instrumented,
    NotInstrumented,
    /// Symbol is not defined at all.
    NotYetEvaluated,
    /// Symbol is defined but does not name a function.
    NotAFunction,
}

/// Where a symbol is currently defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSite {
    pub file: String,
    pub position: usize,
}

/// A live breakpoint, owned entirely by the host debugger.
///
/// `stop_index` indexes the owner's stop-point offset table; the absolute
/// source offset is derived at display time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub function: String,
    pub stop_index: usize,
    pub condition: Option<String>,
    pub temporary: bool,
}

/// Lifecycle events emitted by the host's named extension points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The host is about to reparse a function for instrumentation.
    InstrumentationStarted { function: String },
    /// A function finished instrumenting at the given definition site.
    InstrumentationCompleted {
        function: String,
        file: String,
        position: usize,
    },
    BreakpointSet { function: String, stop_index: usize },
    BreakpointCleared { function: String, stop_index: usize },
    /// Execution stopped at one of a function's stop points.
    ExecutionStopped { function: String, stop_index: usize },
    /// The host rearranged its windows; open views should refresh.
    WindowsReconfigured,
}

/// The host debugger as seen by this crate.
pub trait HostDebugger {
    /// Live instrumentation status of a symbol.
    fn status(&self, function: &str) -> InstrumentationStatus;

    /// Where the symbol is currently defined, if it is defined at all.
    fn definition_site(&self, function: &str) -> Option<SourceSite>;

    /// Stop-point offsets for an instrumented function, relative to its
    /// definition position.
    fn stop_points(&self, function: &str) -> Option<Vec<usize>>;

    /// Live breakpoints owned by one function.
    fn breakpoints(&self, function: &str) -> Vec<Breakpoint>;

    /// Instrument a function, emitting the started/completed events.
    fn instrument(&mut self, function: &str) -> Result<(), HostError>;

    /// Re-evaluate a function's definition. Its old instrumentation data,
    /// breakpoints included, is discarded before it is instrumented afresh.
    fn reevaluate(&mut self, function: &str) -> Result<(), HostError>;

    fn set_breakpoint(
        &mut self,
        function: &str,
        stop_index: usize,
        condition: Option<String>,
        temporary: bool,
    ) -> Result<(), HostError>;

    fn clear_breakpoint(&mut self, function: &str, stop_index: usize) -> Result<(), HostError>;

    /// Drain events queued since the last call.
    fn take_events(&mut self) -> Vec<HostEvent>;
}
