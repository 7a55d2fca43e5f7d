//! List views over tracker and host state.
//!
//! Rows are typed structs keyed by their source record (function name, stop
//! index); the rendered text is derived for display and never parsed back.
//! Actions re-resolve rows against live state when invoked, so a stale row
//! is reported instead of acted on.

mod breakpoints;
mod instrumented;

pub use breakpoints::{BreakpointRow, BreakpointsView};
pub use instrumented::{InstrumentedRow, InstrumentedView};

use thiserror::Error;

use crate::editor::EditorOps;
use crate::host::{HostDebugger, HostError};
use crate::session::{CommandError, Session};

/// Errors from list-view row actions.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("no row {0} in this view")]
    NoSuchRow(usize),

    #[error("row for `{0}` is stale; refresh the view")]
    StaleRow(String),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Render a fixed-width text grid with a header and separator line.
pub(crate) fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut out = String::new();
    push_row(&mut out, header.iter().map(|h| h.to_string()), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, rule.into_iter(), &widths);
    for row in rows {
        push_row(&mut out, row.iter().cloned(), &widths);
    }
    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let cells: Vec<String> = cells.collect();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        if i + 1 < cells.len() {
            for _ in cell.len()..widths[i] {
                out.push(' ');
            }
        }
    }
    out.push('\n');
}

/// The two list views plus the window-layout bookkeeping they share.
#[derive(Default)]
pub struct ViewPair {
    breakpoints: Option<BreakpointsView>,
    instrumented: Option<InstrumentedView>,
}

impl ViewPair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn breakpoints(&self) -> Option<&BreakpointsView> {
        self.breakpoints.as_ref()
    }

    pub fn breakpoints_mut(&mut self) -> Option<&mut BreakpointsView> {
        self.breakpoints.as_mut()
    }

    pub fn instrumented(&self) -> Option<&InstrumentedView> {
        self.instrumented.as_ref()
    }

    pub fn instrumented_mut(&mut self) -> Option<&mut InstrumentedView> {
        self.instrumented.as_mut()
    }

    pub fn any_open(&self) -> bool {
        self.breakpoints.is_some() || self.instrumented.is_some()
    }

    pub fn open_breakpoints<H: HostDebugger, E: EditorOps>(
        &mut self,
        session: &mut Session<H, E>,
    ) {
        self.save_layout_once(session);
        self.breakpoints = Some(BreakpointsView::build(session));
    }

    pub fn open_instrumented<H: HostDebugger, E: EditorOps>(
        &mut self,
        session: &mut Session<H, E>,
    ) {
        self.save_layout_once(session);
        self.instrumented = Some(InstrumentedView::build(session));
    }

    pub fn open_both<H: HostDebugger, E: EditorOps>(&mut self, session: &mut Session<H, E>) {
        self.open_breakpoints(session);
        self.open_instrumented(session);
    }

    /// Rebuild whichever views are open.
    pub fn refresh<H: HostDebugger, E: EditorOps>(&mut self, session: &mut Session<H, E>) {
        if let Some(view) = &mut self.breakpoints {
            view.refresh(session);
        }
        if let Some(view) = &mut self.instrumented {
            view.refresh(session);
        }
    }

    /// Refresh if the host reconfigured its windows since the last check.
    pub fn sync<H: HostDebugger, E: EditorOps>(&mut self, session: &mut Session<H, E>) {
        if session.take_views_stale() && self.any_open() {
            self.refresh(session);
        }
    }

    /// Tear down both views and restore the prior window layout.
    pub fn quit<H: HostDebugger, E: EditorOps>(&mut self, session: &mut Session<H, E>) {
        if self.any_open() {
            session.editor_mut().restore_layout();
        }
        self.breakpoints = None;
        self.instrumented = None;
    }

    fn save_layout_once<H: HostDebugger, E: EditorOps>(&mut self, session: &mut Session<H, E>) {
        if !self.any_open() {
            session.editor_mut().save_layout();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_to_the_widest_cell() {
        let out = render_table(
            &["Name", "Offset"],
            &[
                vec!["fib".into(), "120".into()],
                vec!["accumulate".into(), "7".into()],
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Name        Offset");
        assert_eq!(lines[1], "----------  ------");
        assert_eq!(lines[2], "fib         120");
        assert_eq!(lines[3], "accumulate  7");
    }
}
