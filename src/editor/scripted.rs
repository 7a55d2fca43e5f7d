//! In-memory editor used by the demo binary and the test suite.

use std::collections::{BTreeMap, VecDeque};
use std::io::{self, BufRead, Write};

use super::{Cursor, EditorOps, HighlightMark, MarkId, MarkKind, Span};

/// How prompts are answered.
pub enum PromptMode {
    /// Pop answers from pre-loaded queues; an empty queue declines.
    Scripted {
        confirms: VecDeque<bool>,
        expressions: VecDeque<String>,
    },
    /// Read answers from stdin (used by the REPL demo).
    Interactive,
}

struct Symbol {
    name: String,
    file: String,
    span: Span,
}

/// Scripted [`EditorOps`] implementation: buffers, symbols, marks, and
/// pre-programmed prompt answers, with navigation recorded for assertions.
pub struct ScriptedEditor {
    buffers: BTreeMap<String, String>,
    symbols: Vec<Symbol>,
    cursor: Option<Cursor>,
    marks: BTreeMap<MarkId, HighlightMark>,
    next_mark: MarkId,
    prompts: PromptMode,
    visited: Vec<Cursor>,
    layout_saves: usize,
    layout_restores: usize,
}

impl ScriptedEditor {
    pub fn new() -> Self {
        Self {
            buffers: BTreeMap::new(),
            symbols: Vec::new(),
            cursor: None,
            marks: BTreeMap::new(),
            next_mark: 1,
            prompts: PromptMode::Scripted {
                confirms: VecDeque::new(),
                expressions: VecDeque::new(),
            },
            visited: Vec::new(),
            layout_saves: 0,
            layout_restores: 0,
        }
    }

    /// Add a buffer with the given text.
    pub fn with_buffer(mut self, file: &str, text: &str) -> Self {
        self.buffers.insert(file.to_string(), text.to_string());
        self
    }

    /// Declare a function symbol spanning `span` in `file`.
    pub fn with_symbol(mut self, name: &str, file: &str, span: Span) -> Self {
        self.symbols.push(Symbol {
            name: name.to_string(),
            file: file.to_string(),
            span,
        });
        self
    }

    /// Answer prompts from stdin instead of the scripted queues.
    pub fn interactive(mut self) -> Self {
        self.prompts = PromptMode::Interactive;
        self
    }

    /// Queue an answer for the next confirmation prompt.
    pub fn push_confirm(&mut self, answer: bool) {
        if let PromptMode::Scripted { confirms, .. } = &mut self.prompts {
            confirms.push_back(answer);
        }
    }

    /// Queue an answer for the next expression prompt.
    pub fn push_expression(&mut self, expr: &str) {
        if let PromptMode::Scripted { expressions, .. } = &mut self.prompts {
            expressions.push_back(expr.to_string());
        }
    }

    /// All live marks, in creation order.
    pub fn marks(&self) -> Vec<HighlightMark> {
        self.marks.values().cloned().collect()
    }

    /// Live marks within `file`, optionally filtered by kind.
    pub fn marks_in(&self, file: &str, kind: Option<MarkKind>) -> Vec<HighlightMark> {
        self.marks
            .values()
            .filter(|m| m.file == file && kind.map_or(true, |k| m.kind == k))
            .cloned()
            .collect()
    }

    /// Every position `goto` has been called with.
    pub fn visited(&self) -> &[Cursor] {
        &self.visited
    }

    pub fn layout_restores(&self) -> usize {
        self.layout_restores
    }

    fn symbol_at(&self, file: &str, offset: usize) -> Option<&Symbol> {
        self.symbols
            .iter()
            .find(|s| s.file == file && s.span.contains(offset))
    }
}

impl Default for ScriptedEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorOps for ScriptedEditor {
    fn cursor(&self) -> Option<Cursor> {
        self.cursor.clone()
    }

    fn current_file(&self) -> Option<String> {
        self.cursor.as_ref().map(|c| c.file.clone())
    }

    fn goto(&mut self, file: &str, offset: usize) {
        let cursor = Cursor {
            file: file.to_string(),
            offset,
        };
        log::debug!("goto {}:{}", cursor.file, cursor.offset);
        self.visited.push(cursor.clone());
        self.cursor = Some(cursor);
    }

    fn enclosing_function(&self) -> Option<String> {
        let cursor = self.cursor.as_ref()?;
        self.symbol_at(&cursor.file, cursor.offset)
            .map(|s| s.name.clone())
    }

    fn function_span(&self, function: &str) -> Option<(String, Span)> {
        self.symbols
            .iter()
            .find(|s| s.name == function)
            .map(|s| (s.file.clone(), s.span))
    }

    fn line_span(&self, file: &str, offset: usize) -> Option<Span> {
        let text = self.buffers.get(file)?;
        let offset = offset.min(text.len());
        let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let end = text[offset..]
            .find('\n')
            .map_or(text.len(), |i| offset + i + 1);
        Some(Span::new(start, end))
    }

    fn add_mark(&mut self, file: &str, span: Span, kind: MarkKind) -> MarkId {
        if let Some((id, _)) = self
            .marks
            .iter()
            .find(|(_, m)| m.file == file && m.span == span && m.kind == kind)
        {
            return *id;
        }
        let id = self.next_mark;
        self.next_mark += 1;
        self.marks.insert(
            id,
            HighlightMark {
                file: file.to_string(),
                span,
                kind,
            },
        );
        id
    }

    fn move_mark(&mut self, id: MarkId, file: &str, span: Span) {
        if let Some(mark) = self.marks.get_mut(&id) {
            mark.file = file.to_string();
            mark.span = span;
        }
    }

    fn remove_mark(&mut self, id: MarkId) {
        self.marks.remove(&id);
    }

    fn clear_marks(&mut self, file: &str, span: Span, kind: Option<MarkKind>) -> Vec<MarkId> {
        let doomed: Vec<MarkId> = self
            .marks
            .iter()
            .filter(|(_, m)| {
                m.file == file && m.span.overlaps(span) && kind.map_or(true, |k| m.kind == k)
            })
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            self.marks.remove(id);
        }
        doomed
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        match &mut self.prompts {
            PromptMode::Scripted { confirms, .. } => confirms.pop_front().unwrap_or(false),
            PromptMode::Interactive => {
                print!("{} (y/n) ", prompt);
                let _ = io::stdout().flush();
                let mut line = String::new();
                match io::stdin().lock().read_line(&mut line) {
                    Ok(_) => line.trim().eq_ignore_ascii_case("y"),
                    Err(_) => false,
                }
            }
        }
    }

    fn read_expression(&mut self, prompt: &str) -> Option<String> {
        match &mut self.prompts {
            PromptMode::Scripted { expressions, .. } => expressions.pop_front(),
            PromptMode::Interactive => {
                print!("{} ", prompt);
                let _ = io::stdout().flush();
                let mut line = String::new();
                match io::stdin().lock().read_line(&mut line) {
                    Ok(_) => {
                        let expr = line.trim();
                        if expr.is_empty() {
                            None
                        } else {
                            Some(expr.to_string())
                        }
                    }
                    Err(_) => None,
                }
            }
        }
    }

    fn save_layout(&mut self) {
        self.layout_saves += 1;
    }

    fn restore_layout(&mut self) {
        self.layout_restores += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> ScriptedEditor {
        ScriptedEditor::new()
            .with_buffer("demo.src", "line one\nline two\nline three\n")
            .with_symbol("two", "demo.src", Span::new(9, 18))
    }

    #[test]
    fn line_span_covers_the_whole_line() {
        let ed = editor();
        assert_eq!(ed.line_span("demo.src", 12), Some(Span::new(9, 18)));
        assert_eq!(ed.line_span("demo.src", 0), Some(Span::new(0, 9)));
        assert_eq!(ed.line_span("missing.src", 0), None);
    }

    #[test]
    fn enclosing_function_follows_the_cursor() {
        let mut ed = editor();
        assert_eq!(ed.enclosing_function(), None);
        ed.goto("demo.src", 10);
        assert_eq!(ed.enclosing_function(), Some("two".to_string()));
        ed.goto("demo.src", 2);
        assert_eq!(ed.enclosing_function(), None);
    }

    #[test]
    fn add_mark_is_idempotent_per_kind() {
        let mut ed = editor();
        let span = Span::new(9, 18);
        let a = ed.add_mark("demo.src", span, MarkKind::Breakpoint);
        let b = ed.add_mark("demo.src", span, MarkKind::Breakpoint);
        let c = ed.add_mark("demo.src", span, MarkKind::Definition);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(ed.marks().len(), 2);
    }

    #[test]
    fn clear_marks_filters_by_kind_and_range() {
        let mut ed = editor();
        ed.add_mark("demo.src", Span::new(0, 9), MarkKind::Definition);
        ed.add_mark("demo.src", Span::new(9, 18), MarkKind::Breakpoint);
        let removed = ed.clear_marks("demo.src", Span::new(0, 18), Some(MarkKind::Breakpoint));
        assert_eq!(removed.len(), 1);
        assert_eq!(ed.marks().len(), 1);
    }
}
