//! probeview - breakpoint and instrumentation browser
//!
//! A behavioral extension for an editor-hosted debugger: it mirrors the
//! host's instrumentation and breakpoint state into highlight marks and two
//! interactive list views. The debugger itself stays in the host; this crate
//! observes its extension points and renders what it sees.

pub mod editor;
pub mod host;
pub mod session;
pub mod tracker;
pub mod ui;
pub mod views;
