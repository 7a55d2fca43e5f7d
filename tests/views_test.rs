//! Integration tests: session commands and list views over the scripted
//! host and editor.

use probeview::editor::{EditorOps, MarkKind, ScriptedEditor, Span};
use probeview::host::{HostDebugger, ScriptedHost};
use probeview::session::Session;
use probeview::views::{BreakpointsView, InstrumentedView, ViewError, ViewPair};

/// 30 lines of 10 bytes each, so offset / 10 gives the line number.
fn lines() -> String {
    "123456789\n".repeat(30)
}

fn fixture() -> Session<ScriptedHost, ScriptedEditor> {
    let host = ScriptedHost::new()
        .with_function("foo", "demo.src", 100, &[5, 20, 40])
        .with_function("bar", "other.src", 40, &[5]);
    let editor = ScriptedEditor::new()
        .with_buffer("demo.src", &lines())
        .with_buffer("other.src", &lines())
        .with_symbol("foo", "demo.src", Span::new(100, 150))
        .with_symbol("bar", "other.src", Span::new(40, 70));
    Session::new(host, editor)
}

#[test]
fn breakpoint_row_shows_derived_offset_and_empty_fields() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 120);
    s.toggle_breakpoint(false).unwrap();

    let view = BreakpointsView::build(&s);
    assert_eq!(view.rows().len(), 1);
    assert_eq!(
        view.rows()[0].columns(),
        [
            "foo".to_string(),
            "120".to_string(),
            String::new(),
            String::new(),
            "demo.src".to_string(),
        ]
    );
}

#[test]
fn killing_the_only_row_empties_the_view_but_keeps_the_function() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 120);
    s.toggle_breakpoint(false).unwrap();

    let mut view = BreakpointsView::build(&s);
    s.editor_mut().push_confirm(true);
    assert!(view.kill(&mut s, 0).unwrap());

    assert!(view.is_empty());
    assert!(s.host().breakpoints("foo").is_empty());
    let funcs = InstrumentedView::build(&s);
    assert_eq!(funcs.rows().len(), 1);
    assert_eq!(funcs.rows()[0].function, "foo");
}

#[test]
fn kill_leaves_other_functions_breakpoints_alone() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 120);
    s.toggle_breakpoint(false).unwrap();
    s.editor_mut().goto("other.src", 45);
    s.toggle_breakpoint(false).unwrap();

    let mut view = BreakpointsView::build(&s);
    assert_eq!(view.rows().len(), 2);
    let foo_row = view
        .rows()
        .iter()
        .position(|r| r.function == "foo")
        .unwrap();
    s.editor_mut().push_confirm(true);
    view.kill(&mut s, foo_row).unwrap();

    assert!(s.host().breakpoints("foo").is_empty());
    assert_eq!(s.host().breakpoints("bar").len(), 1);
}

#[test]
fn declining_a_kill_changes_nothing() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 120);
    s.toggle_breakpoint(false).unwrap();

    let mut view = BreakpointsView::build(&s);
    // no scripted answer queued: the confirmation is declined
    assert!(!view.kill(&mut s, 0).unwrap());
    assert_eq!(view.rows().len(), 1);
    assert_eq!(s.host().breakpoints("foo").len(), 1);
}

#[test]
fn visit_navigates_to_definition_plus_stop_offset() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 140);
    s.toggle_breakpoint(false).unwrap();
    s.editor_mut().goto("other.src", 0);

    let view = BreakpointsView::build(&s);
    view.visit(&mut s, 0).unwrap();
    let cursor = s.editor().cursor().unwrap();
    assert_eq!((cursor.file.as_str(), cursor.offset), ("demo.src", 140));
    // highlight-all ran for the visited file
    assert!(!s.editor().marks_in("demo.src", Some(MarkKind::Breakpoint)).is_empty());
}

#[test]
fn evaluate_clears_breakpoints_and_keeps_the_function_listed() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 120);
    s.toggle_breakpoint(false).unwrap();
    s.editor_mut().goto("demo.src", 140);
    s.toggle_breakpoint(false).unwrap();
    assert_eq!(s.host().breakpoints("foo").len(), 2);

    let mut funcs = InstrumentedView::build(&s);
    s.editor_mut().push_confirm(true);
    assert!(funcs.evaluate(&mut s, 0).unwrap());

    assert!(s.host().breakpoints("foo").is_empty());
    assert_eq!(funcs.rows().len(), 1);
    assert_eq!(funcs.rows()[0].function, "foo");
    assert!(BreakpointsView::build(&s).is_empty());
}

#[test]
fn toggling_twice_restores_the_breakpoint_table() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 120);
    s.toggle_breakpoint(false).unwrap();
    s.toggle_breakpoint(false).unwrap();
    assert!(s.host().breakpoints("foo").is_empty());
    assert!(BreakpointsView::build(&s).is_empty());
}

#[test]
fn redefined_functions_drop_out_of_the_breakpoints_view() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 120);
    s.toggle_breakpoint(false).unwrap();

    let stale = BreakpointsView::build(&s);
    s.host_mut().move_function("foo", "moved.src", 0);
    s.pump();

    // fresh build treats the function as not-yet-tracked
    assert!(BreakpointsView::build(&s).is_empty());
    // the stale view's action resolves against live state and reports it
    let err = stale.visit(&mut s, 0).unwrap_err();
    assert!(matches!(err, ViewError::StaleRow(_)));
}

#[test]
fn quitting_the_views_restores_the_window_layout() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 120);
    s.toggle_breakpoint(false).unwrap();

    let mut views = ViewPair::new();
    views.open_both(&mut s);
    assert!(views.any_open());
    assert!(views.breakpoints().is_some());
    assert!(views.instrumented().is_some());

    views.quit(&mut s);
    assert!(!views.any_open());
    assert_eq!(s.editor().layout_restores(), 1);
}

#[test]
fn window_reconfiguration_triggers_a_view_refresh() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 120);
    s.toggle_breakpoint(false).unwrap();

    let mut views = ViewPair::new();
    views.open_breakpoints(&mut s);

    // a second breakpoint lands behind the view's back
    s.editor_mut().goto("demo.src", 140);
    s.toggle_breakpoint(false).unwrap();
    assert_eq!(views.breakpoints().unwrap().rows().len(), 1);

    s.host_mut().reconfigure_windows();
    s.pump();
    views.sync(&mut s);
    assert_eq!(views.breakpoints().unwrap().rows().len(), 2);
}

#[test]
fn rendered_views_are_display_only() {
    let mut s = fixture();
    s.editor_mut().goto("demo.src", 120);
    s.editor_mut().push_expression("(> n 10)");
    s.toggle_breakpoint(true).unwrap();

    let view = BreakpointsView::build(&s);
    let text = view.render();
    assert!(text.contains("foo"));
    assert!(text.contains("120"));
    assert!(text.contains("(> n 10)"));

    let funcs = InstrumentedView::build(&s);
    assert!(funcs.render().contains("demo.src"));
}
