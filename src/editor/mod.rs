//! Editor collaborator surface.
//!
//! The host editor owns buffers, the cursor, overlay marks, and user prompts.
//! Everything this crate needs from it goes through [`EditorOps`], so a real
//! editor binding and the scripted editor used by the demo and tests are
//! interchangeable.

mod scripted;

pub use scripted::{PromptMode, ScriptedEditor};

/// Identifier of a highlight mark, allocated by the editor.
pub type MarkId = u64;

/// Kind of a highlight overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    /// Definition line of an instrumented function.
    Definition,
    /// A stop point carrying a breakpoint.
    Breakpoint,
    /// The line execution is currently stopped at. At most one of these
    /// exists at a time; it is moved on repeated stops, not recreated.
    CurrentStop,
}

/// Half-open byte range within a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Cursor position: file name plus byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub file: String,
    pub offset: usize,
}

/// A highlight overlay drawn over a source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMark {
    pub file: String,
    pub span: Span,
    pub kind: MarkKind,
}

/// Operations this crate needs from the hosting editor.
pub trait EditorOps {
    /// Current cursor position, if any buffer is visited.
    fn cursor(&self) -> Option<Cursor>;

    /// File the cursor is currently in.
    fn current_file(&self) -> Option<String>;

    /// Move the cursor to `offset` within `file`, visiting the file if
    /// necessary.
    fn goto(&mut self, file: &str, offset: usize);

    /// Name of the function whose body encloses the cursor.
    fn enclosing_function(&self) -> Option<String>;

    /// File and full source range of a function's definition.
    fn function_span(&self, function: &str) -> Option<(String, Span)>;

    /// Span of the line containing `offset` in `file`.
    fn line_span(&self, file: &str, offset: usize) -> Option<Span>;

    /// Draw a highlight mark. Idempotent per (file, span, kind): drawing the
    /// same mark twice returns the existing id.
    fn add_mark(&mut self, file: &str, span: Span, kind: MarkKind) -> MarkId;

    /// Relocate an existing mark. Unknown ids are ignored.
    fn move_mark(&mut self, id: MarkId, file: &str, span: Span);

    /// Remove a single mark. Unknown ids are ignored.
    fn remove_mark(&mut self, id: MarkId);

    /// Remove every mark overlapping `span` in `file`, optionally filtered by
    /// kind. Returns the ids that were removed.
    fn clear_marks(&mut self, file: &str, span: Span, kind: Option<MarkKind>) -> Vec<MarkId>;

    /// Ask the user a yes/no question; `false` aborts the calling action.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Prompt for an expression; `None` means the user declined.
    fn read_expression(&mut self, prompt: &str) -> Option<String>;

    /// Remember the current window layout so `restore_layout` can bring it
    /// back after the list views are torn down.
    fn save_layout(&mut self);

    /// Restore the layout remembered by the last `save_layout`.
    fn restore_layout(&mut self);
}
