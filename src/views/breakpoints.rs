//! Breakpoints list view: one row per live breakpoint of a tracked function.

use crate::editor::EditorOps;
use crate::host::{HostDebugger, InstrumentationStatus};
use crate::session::Session;

use super::{render_table, ViewError};

/// One row of the breakpoints view.
///
/// Keeps the source record (function, stop index) alongside the display
/// fields so actions never have to parse rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointRow {
    pub function: String,
    pub stop_index: usize,
    /// Definition position plus the stop point's relative offset.
    pub offset: usize,
    /// Condition expression, empty when unconditional.
    pub condition: String,
    pub temporary: bool,
    /// File the function is currently defined in.
    pub file: String,
}

impl BreakpointRow {
    /// Display cells: function, offset, condition, temporary, file.
    pub fn columns(&self) -> [String; 5] {
        [
            self.function.clone(),
            self.offset.to_string(),
            self.condition.clone(),
            if self.temporary { "yes" } else { "" }.to_string(),
            self.file.clone(),
        ]
    }
}

/// Grid of all live breakpoints owned by tracked functions.
pub struct BreakpointsView {
    rows: Vec<BreakpointRow>,
}

impl BreakpointsView {
    /// Build rows by joining the tracker against the host's live breakpoint
    /// tables. Functions the host no longer reports as instrumented (stale
    /// tracker entries) contribute no rows.
    pub fn build<H: HostDebugger, E: EditorOps>(session: &Session<H, E>) -> Self {
        let mut rows = Vec::new();
        for form in session.tracker().functions() {
            if !matches!(
                session.host().status(&form.name),
                InstrumentationStatus::Instrumented
            ) {
                continue;
            }
            let site = match session.host().definition_site(&form.name) {
                Some(site) => site,
                None => continue,
            };
            let stops = match session.host().stop_points(&form.name) {
                Some(stops) => stops,
                None => continue,
            };
            for bp in session.host().breakpoints(&form.name) {
                let off = match stops.get(bp.stop_index) {
                    Some(off) => off,
                    None => continue,
                };
                rows.push(BreakpointRow {
                    function: form.name.clone(),
                    stop_index: bp.stop_index,
                    offset: form.position + off,
                    condition: bp.condition.clone().unwrap_or_default(),
                    temporary: bp.temporary,
                    file: site.file.clone(),
                });
            }
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[BreakpointRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn refresh<H: HostDebugger, E: EditorOps>(&mut self, session: &Session<H, E>) {
        self.rows = Self::build(session).rows;
    }

    pub fn render(&self) -> String {
        let cells: Vec<Vec<String>> = self.rows.iter().map(|r| r.columns().to_vec()).collect();
        render_table(&["Function", "Offset", "Condition", "Temp", "File"], &cells)
    }

    /// Jump the editor to the row's breakpoint and re-highlight its file.
    pub fn visit<H: HostDebugger, E: EditorOps>(
        &self,
        session: &mut Session<H, E>,
        index: usize,
    ) -> Result<(), ViewError> {
        let row = self.rows.get(index).ok_or(ViewError::NoSuchRow(index))?;
        let (file, offset) = session
            .stop_location(&row.function, row.stop_index)
            .ok_or_else(|| ViewError::StaleRow(row.function.clone()))?;
        session.editor_mut().goto(&file, offset);
        session.highlight_all(&file);
        Ok(())
    }

    /// Delete the row's breakpoint after confirmation. Returns `false` when
    /// the user declined; nothing changes in that case.
    pub fn kill<H: HostDebugger, E: EditorOps>(
        &mut self,
        session: &mut Session<H, E>,
        index: usize,
    ) -> Result<bool, ViewError> {
        let row = self
            .rows
            .get(index)
            .ok_or(ViewError::NoSuchRow(index))?
            .clone();
        let prompt = format!("Delete breakpoint at {}:{}?", row.file, row.offset);
        if !session.editor_mut().confirm(&prompt) {
            log::info!("kill declined for `{}`", row.function);
            return Ok(false);
        }
        self.visit(session, index)?;
        session.toggle_breakpoint(false)?;
        self.refresh(session);
        Ok(true)
    }
}
