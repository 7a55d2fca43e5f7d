//! Debugging-extension session.
//!
//! A [`Session`] owns the tracker, the editor and host collaborators, and the
//! single current-stop mark. It implements the user-facing commands and the
//! observer dispatch that mirrors host lifecycle events into tracker state
//! and highlight marks. Sessions are plain owned values; tests run as many
//! independent ones as they like.

use thiserror::Error;

use crate::editor::{EditorOps, MarkId, MarkKind};
use crate::host::{HostDebugger, HostError, HostEvent, InstrumentationStatus};
use crate::tracker::{InstrumentedFunction, Tracker};

/// Errors from the user-facing commands.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("no enclosing function at point")]
    NoEnclosingFunction,

    #[error("no stop point at or before point in `{0}`")]
    NoStopPointHere(String),

    #[error(transparent)]
    Host(#[from] HostError),
}

/// What the breakpoint toggle command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Set { function: String, stop_index: usize },
    Cleared { function: String, stop_index: usize },
    /// The condition prompt was declined; nothing changed.
    Aborted,
}

/// Extra observer callback for host events, registered via
/// [`Session::register_observer`].
pub type Observer = Box<dyn FnMut(&HostEvent)>;

/// One debugging-extension session.
pub struct Session<H, E> {
    host: H,
    editor: E,
    tracker: Tracker,
    current_stop: Option<MarkId>,
    observers: Vec<Observer>,
    views_stale: bool,
}

impl<H: HostDebugger, E: EditorOps> Session<H, E> {
    pub fn new(host: H, editor: E) -> Self {
        Self {
            host,
            editor,
            tracker: Tracker::new(),
            current_stop: None,
            observers: Vec::new(),
            views_stale: false,
        }
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access for callers that drive the host directly.
    /// Call [`Session::pump`] afterwards so queued events get dispatched.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    /// Register an extra callback invoked for every host event, before the
    /// session's own dispatch.
    pub fn register_observer(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    /// True once the host has reconfigured its windows since the last check;
    /// reading it clears the flag.
    pub fn take_views_stale(&mut self) -> bool {
        std::mem::take(&mut self.views_stale)
    }

    /// Pass-through query against the host's live state, not the tracker.
    pub fn is_instrumented(&self, function: &str) -> Result<bool, HostError> {
        match self.host.status(function) {
            InstrumentationStatus::Instrumented => Ok(true),
            InstrumentationStatus::NotInstrumented => Ok(false),
            InstrumentationStatus::NotYetEvaluated => {
                Err(HostError::NotYetEvaluated(function.to_string()))
            }
            InstrumentationStatus::NotAFunction => {
                Err(HostError::NotAFunction(function.to_string()))
            }
        }
    }

    /// Toggle a breakpoint at the stop point corresponding to the cursor.
    ///
    /// The function under the cursor is instrumented first if it is not
    /// already. The cursor maps to the greatest stop point at or before it.
    /// With `conditional`, the user is prompted for a condition expression;
    /// declining aborts the toggle.
    pub fn toggle_breakpoint(&mut self, conditional: bool) -> Result<ToggleOutcome, CommandError> {
        let cursor = self.editor.cursor().ok_or(CommandError::NoEnclosingFunction)?;
        let function = self
            .editor
            .enclosing_function()
            .ok_or(CommandError::NoEnclosingFunction)?;

        if !self.is_instrumented(&function)? {
            self.host.instrument(&function)?;
            self.pump();
        }

        let site = self
            .host
            .definition_site(&function)
            .ok_or_else(|| HostError::NotYetEvaluated(function.clone()))?;
        let stops = self
            .host
            .stop_points(&function)
            .ok_or_else(|| HostError::NotInstrumented(function.clone()))?;
        let stop_index = stops
            .iter()
            .enumerate()
            .filter(|&(_, &off)| site.position + off <= cursor.offset)
            .max_by_key(|&(_, &off)| off)
            .map(|(i, _)| i)
            .ok_or_else(|| CommandError::NoStopPointHere(function.clone()))?;
        let offset = site.position + stops[stop_index];

        let exists = self
            .host
            .breakpoints(&function)
            .iter()
            .any(|b| b.stop_index == stop_index);

        if exists {
            self.clear_line_marks(&site.file, offset, MarkKind::Breakpoint);
            self.host.clear_breakpoint(&function, stop_index)?;
            self.pump();
            log::info!("cleared breakpoint at {}:{}", site.file, offset);
            Ok(ToggleOutcome::Cleared {
                function,
                stop_index,
            })
        } else {
            let condition = if conditional {
                match self.editor.read_expression("Break condition:") {
                    Some(expr) => Some(expr),
                    None => return Ok(ToggleOutcome::Aborted),
                }
            } else {
                None
            };
            self.mark_line(&site.file, offset, MarkKind::Breakpoint);
            self.host
                .set_breakpoint(&function, stop_index, condition, false)?;
            self.pump();
            log::info!("set breakpoint at {}:{}", site.file, offset);
            Ok(ToggleOutcome::Set {
                function,
                stop_index,
            })
        }
    }

    /// Re-evaluate a function through the host and dispatch the fallout.
    pub fn reevaluate(&mut self, function: &str) -> Result<(), HostError> {
        self.host.reevaluate(function)?;
        self.pump();
        Ok(())
    }

    /// Draw marks for everything known about `file`: a definition mark per
    /// tracked function defined there, then a breakpoint mark per stop point
    /// carrying one. Additive; marks are idempotent per line and kind.
    pub fn highlight_all(&mut self, file: &str) {
        let forms: Vec<InstrumentedFunction> = self.tracker.functions().cloned().collect();
        for form in forms {
            let live = match self.host.definition_site(&form.name) {
                Some(site) if site.file == file => site,
                _ => continue,
            };
            if !matches!(self.host.status(&form.name), InstrumentationStatus::Instrumented) {
                continue;
            }
            self.mark_line(&live.file, form.position, MarkKind::Definition);
            let stops = match self.host.stop_points(&form.name) {
                Some(stops) => stops,
                None => continue,
            };
            for bp in self.host.breakpoints(&form.name) {
                if let Some(off) = stops.get(bp.stop_index) {
                    self.mark_line(&live.file, form.position + off, MarkKind::Breakpoint);
                }
            }
        }
    }

    /// Absolute source location of one of a function's stop points, resolved
    /// against the live host state. `None` when the function is not tracked
    /// or the index is stale.
    pub fn stop_location(&self, function: &str, stop_index: usize) -> Option<(String, usize)> {
        let form = self.tracker.get(function)?;
        let site = self.host.definition_site(function)?;
        let stops = self.host.stop_points(function)?;
        let off = stops.get(stop_index)?;
        Some((site.file, form.position + off))
    }

    /// Drain queued host events and dispatch each one: first to registered
    /// observers, then to the session's own state mirroring.
    pub fn pump(&mut self) {
        let events = self.host.take_events();
        if events.is_empty() {
            return;
        }
        let mut observers = std::mem::take(&mut self.observers);
        for event in &events {
            log::trace!("host event: {:?}", event);
            for observer in &mut observers {
                observer(event);
            }
            self.apply(event);
        }
        self.observers = observers;
    }

    fn apply(&mut self, event: &HostEvent) {
        match event {
            HostEvent::InstrumentationStarted { function } => {
                if let Some(old) = self.tracker.remove(function) {
                    let (file, span) = match self.editor.function_span(function) {
                        Some(found) => found,
                        None => match self.editor.line_span(&old.file, old.position) {
                            Some(line) => (old.file.clone(), line),
                            None => return,
                        },
                    };
                    let removed = self.editor.clear_marks(&file, span, None);
                    if let Some(id) = self.current_stop {
                        if removed.contains(&id) {
                            self.current_stop = None;
                        }
                    }
                }
            }
            HostEvent::InstrumentationCompleted {
                function,
                file,
                position,
            } => {
                self.tracker.record(function, file, *position);
                self.mark_line(file, *position, MarkKind::Definition);
            }
            HostEvent::BreakpointSet {
                function,
                stop_index,
            } => {
                if let Some((file, offset)) = self.stop_location(function, *stop_index) {
                    self.mark_line(&file, offset, MarkKind::Breakpoint);
                }
            }
            HostEvent::BreakpointCleared {
                function,
                stop_index,
            } => {
                if let Some((file, offset)) = self.stop_location(function, *stop_index) {
                    self.clear_line_marks(&file, offset, MarkKind::Breakpoint);
                }
            }
            HostEvent::ExecutionStopped {
                function,
                stop_index,
            } => {
                let location = self.stop_location(function, *stop_index);
                if let Some((file, offset)) = location {
                    if let Some(span) = self.editor.line_span(&file, offset) {
                        match self.current_stop {
                            Some(id) => self.editor.move_mark(id, &file, span),
                            None => {
                                let id = self.editor.add_mark(&file, span, MarkKind::CurrentStop);
                                self.current_stop = Some(id);
                            }
                        }
                    }
                }
            }
            HostEvent::WindowsReconfigured => {
                self.views_stale = true;
            }
        }
    }

    fn mark_line(&mut self, file: &str, offset: usize, kind: MarkKind) {
        if let Some(span) = self.editor.line_span(file, offset) {
            self.editor.add_mark(file, span, kind);
        }
    }

    fn clear_line_marks(&mut self, file: &str, offset: usize, kind: MarkKind) {
        if let Some(span) = self.editor.line_span(file, offset) {
            let removed = self.editor.clear_marks(file, span, Some(kind));
            if let Some(id) = self.current_stop {
                if removed.contains(&id) {
                    self.current_stop = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{ScriptedEditor, Span};
    use crate::host::ScriptedHost;

    /// 30 lines of 10 bytes each: offset / 10 gives the line number.
    fn demo_text() -> String {
        "123456789\n".repeat(30)
    }

    fn session() -> Session<ScriptedHost, ScriptedEditor> {
        let host = ScriptedHost::new()
            .with_function("foo", "demo.src", 100, &[5, 20, 40])
            .with_function("bar", "demo.src", 200, &[5])
            .with_variable("answer");
        let editor = ScriptedEditor::new()
            .with_buffer("demo.src", &demo_text())
            .with_symbol("foo", "demo.src", Span::new(100, 150))
            .with_symbol("bar", "demo.src", Span::new(200, 230));
        Session::new(host, editor)
    }

    #[test]
    fn toggle_sets_then_clears() {
        let mut s = session();
        s.editor_mut().goto("demo.src", 120);

        let out = s.toggle_breakpoint(false).unwrap();
        assert_eq!(
            out,
            ToggleOutcome::Set {
                function: "foo".into(),
                stop_index: 1
            }
        );
        assert_eq!(s.host().breakpoints("foo").len(), 1);
        let bp_marks = s.editor().marks_in("demo.src", Some(MarkKind::Breakpoint));
        assert_eq!(bp_marks.len(), 1);
        assert_eq!(bp_marks[0].span, Span::new(120, 130));

        let out = s.toggle_breakpoint(false).unwrap();
        assert_eq!(
            out,
            ToggleOutcome::Cleared {
                function: "foo".into(),
                stop_index: 1
            }
        );
        assert!(s.host().breakpoints("foo").is_empty());
        assert!(s
            .editor()
            .marks_in("demo.src", Some(MarkKind::Breakpoint))
            .is_empty());
    }

    #[test]
    fn toggle_instruments_on_demand_and_tracks() {
        let mut s = session();
        s.editor_mut().goto("demo.src", 140);
        s.toggle_breakpoint(false).unwrap();
        assert!(s.is_instrumented("foo").unwrap());
        let form = s.tracker().get("foo").unwrap();
        assert_eq!(form.position, 100);
        // definition line highlighted as a side effect
        let defs = s.editor().marks_in("demo.src", Some(MarkKind::Definition));
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].span, Span::new(100, 110));
    }

    #[test]
    fn toggle_outside_any_function_fails() {
        let mut s = session();
        s.editor_mut().goto("demo.src", 10);
        assert!(matches!(
            s.toggle_breakpoint(false),
            Err(CommandError::NoEnclosingFunction)
        ));
        s.editor_mut().goto("demo.src", 101);
        // inside foo but before every stop point (first is at 105)
        assert!(matches!(
            s.toggle_breakpoint(false),
            Err(CommandError::NoStopPointHere(_))
        ));
    }

    #[test]
    fn conditional_toggle_prompts_and_aborts_cleanly() {
        let mut s = session();
        s.editor_mut().goto("demo.src", 120);
        // no scripted answer: prompt declined
        assert_eq!(s.toggle_breakpoint(true).unwrap(), ToggleOutcome::Aborted);
        assert!(s.host().breakpoints("foo").is_empty());

        s.editor_mut().push_expression("(> n 10)");
        s.toggle_breakpoint(true).unwrap();
        let bps = s.host().breakpoints("foo");
        assert_eq!(bps[0].condition.as_deref(), Some("(> n 10)"));
    }

    #[test]
    fn is_instrumented_surfaces_host_complaints() {
        let s = session();
        assert_eq!(s.is_instrumented("foo"), Ok(false));
        assert_eq!(
            s.is_instrumented("answer"),
            Err(HostError::NotAFunction("answer".into()))
        );
        assert_eq!(
            s.is_instrumented("missing"),
            Err(HostError::NotYetEvaluated("missing".into()))
        );
    }

    #[test]
    fn stop_events_move_a_single_mark() {
        let mut s = session();
        s.editor_mut().goto("demo.src", 120);
        s.toggle_breakpoint(false).unwrap();

        s.host_mut().stop_at("foo", 1).unwrap();
        s.pump();
        let stops = s.editor().marks_in("demo.src", Some(MarkKind::CurrentStop));
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].span, Span::new(120, 130));

        s.host_mut().stop_at("foo", 2).unwrap();
        s.pump();
        let stops = s.editor().marks_in("demo.src", Some(MarkKind::CurrentStop));
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].span, Span::new(140, 150));
    }

    #[test]
    fn reinstrumentation_clears_marks_in_the_function_range() {
        let mut s = session();
        s.editor_mut().goto("demo.src", 120);
        s.toggle_breakpoint(false).unwrap();
        assert!(!s.editor().marks_in("demo.src", None).is_empty());

        s.reevaluate("foo").unwrap();
        // old marks gone, fresh definition mark drawn
        let marks = s.editor().marks_in("demo.src", None);
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].kind, MarkKind::Definition);
        assert!(s.host().breakpoints("foo").is_empty());
        assert!(s.tracker().get("foo").is_some());
    }

    #[test]
    fn highlight_all_redraws_for_a_file() {
        let mut s = session();
        s.editor_mut().goto("demo.src", 120);
        s.toggle_breakpoint(false).unwrap();
        s.editor_mut().goto("demo.src", 205);
        s.toggle_breakpoint(false).unwrap();

        let before = s.editor().marks_in("demo.src", None).len();
        s.highlight_all("demo.src");
        // additive but idempotent: nothing duplicated
        assert_eq!(s.editor().marks_in("demo.src", None).len(), before);
    }

    #[test]
    fn registered_observers_see_every_event() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<HostEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut s = session();
        s.register_observer(Box::new(move |ev| sink.borrow_mut().push(ev.clone())));

        s.editor_mut().goto("demo.src", 120);
        s.toggle_breakpoint(false).unwrap();
        let events = seen.borrow();
        assert!(events
            .iter()
            .any(|e| matches!(e, HostEvent::InstrumentationCompleted { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, HostEvent::BreakpointSet { .. })));
    }

    #[test]
    fn window_reconfiguration_flags_views_stale() {
        let mut s = session();
        assert!(!s.take_views_stale());
        s.host_mut().reconfigure_windows();
        s.pump();
        assert!(s.take_views_stale());
        assert!(!s.take_views_stale());
    }
}
