//! Instrumented-functions list view: one row per tracked function.

use crate::editor::EditorOps;
use crate::host::HostDebugger;
use crate::session::Session;

use super::{render_table, ViewError};

/// One row of the instrumented-functions view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentedRow {
    pub function: String,
    /// File the function is currently defined in, falling back to the file
    /// recorded at instrumentation time.
    pub file: String,
}

/// Grid of every function the tracker knows about.
pub struct InstrumentedView {
    rows: Vec<InstrumentedRow>,
}

impl InstrumentedView {
    pub fn build<H: HostDebugger, E: EditorOps>(session: &Session<H, E>) -> Self {
        let rows = session
            .tracker()
            .functions()
            .map(|form| InstrumentedRow {
                function: form.name.clone(),
                file: session
                    .host()
                    .definition_site(&form.name)
                    .map(|site| site.file)
                    .unwrap_or_else(|| form.file.clone()),
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[InstrumentedRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn refresh<H: HostDebugger, E: EditorOps>(&mut self, session: &Session<H, E>) {
        self.rows = Self::build(session).rows;
    }

    pub fn render(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| vec![r.function.clone(), r.file.clone()])
            .collect();
        render_table(&["Function", "File"], &cells)
    }

    /// Jump to the row's definition and re-highlight its file.
    pub fn find<H: HostDebugger, E: EditorOps>(
        &self,
        session: &mut Session<H, E>,
        index: usize,
    ) -> Result<(), ViewError> {
        let row = self.rows.get(index).ok_or(ViewError::NoSuchRow(index))?;
        let site = session
            .host()
            .definition_site(&row.function)
            .ok_or_else(|| ViewError::StaleRow(row.function.clone()))?;
        session.editor_mut().goto(&site.file, site.position);
        session.highlight_all(&site.file);
        Ok(())
    }

    /// Re-evaluate the row's definition after confirmation. The host's
    /// reinstrumentation path clears the function's breakpoints and
    /// highlights as a side effect. Returns `false` when declined.
    pub fn evaluate<H: HostDebugger, E: EditorOps>(
        &mut self,
        session: &mut Session<H, E>,
        index: usize,
    ) -> Result<bool, ViewError> {
        let row = self
            .rows
            .get(index)
            .ok_or(ViewError::NoSuchRow(index))?
            .clone();
        let prompt = format!("Evaluate `{}` again?", row.function);
        if !session.editor_mut().confirm(&prompt) {
            log::info!("evaluate declined for `{}`", row.function);
            return Ok(false);
        }
        let site = session
            .host()
            .definition_site(&row.function)
            .ok_or_else(|| ViewError::StaleRow(row.function.clone()))?;
        session.editor_mut().goto(&site.file, site.position);
        session.reevaluate(&row.function)?;
        self.refresh(session);
        Ok(true)
    }
}
