//! In-memory host debugger used by the demo binary and the test suite.

use std::collections::HashMap;

use super::{
    Breakpoint, HostDebugger, HostError, HostEvent, InstrumentationStatus, SourceSite,
};

struct HostFunction {
    file: String,
    position: usize,
    stop_points: Vec<usize>,
    instrumented: bool,
    is_function: bool,
}

/// Scripted [`HostDebugger`]: a symbol table, a live breakpoint table, and an
/// event queue. Extra methods simulate host-side activity (stops, window
/// changes, redefinitions) that a real host would originate itself.
pub struct ScriptedHost {
    functions: HashMap<String, HostFunction>,
    breakpoints: Vec<Breakpoint>,
    events: Vec<HostEvent>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            breakpoints: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Define a function at `position` in `file` with the given stop-point
    /// offset table.
    pub fn with_function(mut self, name: &str, file: &str, position: usize, stops: &[usize]) -> Self {
        self.functions.insert(
            name.to_string(),
            HostFunction {
                file: file.to_string(),
                position,
                stop_points: stops.to_vec(),
                instrumented: false,
                is_function: true,
            },
        );
        self
    }

    /// Define a symbol that is not a function.
    pub fn with_variable(mut self, name: &str) -> Self {
        self.functions.insert(
            name.to_string(),
            HostFunction {
                file: String::new(),
                position: 0,
                stop_points: Vec::new(),
                instrumented: false,
                is_function: false,
            },
        );
        self
    }

    /// Simulate execution stopping at one of a function's stop points.
    pub fn stop_at(&mut self, function: &str, stop_index: usize) -> Result<(), HostError> {
        let def = self.lookup(function)?;
        if !def.instrumented {
            return Err(HostError::NotInstrumented(function.to_string()));
        }
        if stop_index >= def.stop_points.len() {
            return Err(HostError::NoSuchStopPoint {
                function: function.to_string(),
                index: stop_index,
            });
        }
        self.events.push(HostEvent::ExecutionStopped {
            function: function.to_string(),
            stop_index,
        });
        Ok(())
    }

    /// Simulate the host rearranging its windows.
    pub fn reconfigure_windows(&mut self) {
        self.events.push(HostEvent::WindowsReconfigured);
    }

    /// Simulate the function being redefined outside the debugger: it moves
    /// to a new site, loses its instrumentation data, and its breakpoints
    /// are silently dropped with it.
    pub fn move_function(&mut self, name: &str, file: &str, position: usize) {
        if let Some(def) = self.functions.get_mut(name) {
            def.file = file.to_string();
            def.position = position;
            def.instrumented = false;
            self.breakpoints.retain(|b| b.function != name);
        }
    }

    fn lookup(&self, name: &str) -> Result<&HostFunction, HostError> {
        let def = self
            .functions
            .get(name)
            .ok_or_else(|| HostError::NotYetEvaluated(name.to_string()))?;
        if !def.is_function {
            return Err(HostError::NotAFunction(name.to_string()));
        }
        Ok(def)
    }

    fn reparse(&mut self, name: &str) -> Result<(), HostError> {
        let def = self
            .functions
            .get_mut(name)
            .ok_or_else(|| HostError::NotYetEvaluated(name.to_string()))?;
        if !def.is_function {
            return Err(HostError::NotAFunction(name.to_string()));
        }
        def.instrumented = true;
        let file = def.file.clone();
        let position = def.position;
        self.events.push(HostEvent::InstrumentationStarted {
            function: name.to_string(),
        });
        // Old instrumentation data goes away with the reparse.
        self.breakpoints.retain(|b| b.function != name);
        self.events.push(HostEvent::InstrumentationCompleted {
            function: name.to_string(),
            file,
            position,
        });
        Ok(())
    }
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDebugger for ScriptedHost {
    fn status(&self, function: &str) -> InstrumentationStatus {
        match self.functions.get(function) {
            None => InstrumentationStatus::NotYetEvaluated,
            Some(def) if !def.is_function => InstrumentationStatus::NotAFunction,
            Some(def) if def.instrumented => InstrumentationStatus::Instrumented,
            Some(_) => InstrumentationStatus::NotInstrumented,
        }
    }

    fn definition_site(&self, function: &str) -> Option<SourceSite> {
        let def = self.functions.get(function)?;
        if !def.is_function {
            return None;
        }
        Some(SourceSite {
            file: def.file.clone(),
            position: def.position,
        })
    }

    fn stop_points(&self, function: &str) -> Option<Vec<usize>> {
        let def = self.functions.get(function)?;
        if !def.is_function || !def.instrumented {
            return None;
        }
        Some(def.stop_points.clone())
    }

    fn breakpoints(&self, function: &str) -> Vec<Breakpoint> {
        self.breakpoints
            .iter()
            .filter(|b| b.function == function)
            .cloned()
            .collect()
    }

    fn instrument(&mut self, function: &str) -> Result<(), HostError> {
        log::debug!("instrumenting `{}`", function);
        self.reparse(function)
    }

    fn reevaluate(&mut self, function: &str) -> Result<(), HostError> {
        log::debug!("re-evaluating `{}`", function);
        self.reparse(function)
    }

    fn set_breakpoint(
        &mut self,
        function: &str,
        stop_index: usize,
        condition: Option<String>,
        temporary: bool,
    ) -> Result<(), HostError> {
        let def = self.lookup(function)?;
        if !def.instrumented {
            return Err(HostError::NotInstrumented(function.to_string()));
        }
        if stop_index >= def.stop_points.len() {
            return Err(HostError::NoSuchStopPoint {
                function: function.to_string(),
                index: stop_index,
            });
        }
        self.breakpoints
            .retain(|b| !(b.function == function && b.stop_index == stop_index));
        self.breakpoints.push(Breakpoint {
            function: function.to_string(),
            stop_index,
            condition,
            temporary,
        });
        self.events.push(HostEvent::BreakpointSet {
            function: function.to_string(),
            stop_index,
        });
        Ok(())
    }

    fn clear_breakpoint(&mut self, function: &str, stop_index: usize) -> Result<(), HostError> {
        let before = self.breakpoints.len();
        self.breakpoints
            .retain(|b| !(b.function == function && b.stop_index == stop_index));
        if self.breakpoints.len() == before {
            return Err(HostError::NoSuchBreakpoint {
                function: function.to_string(),
                index: stop_index,
            });
        }
        self.events.push(HostEvent::BreakpointCleared {
            function: function.to_string(),
            stop_index,
        });
        Ok(())
    }

    fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> ScriptedHost {
        ScriptedHost::new()
            .with_function("foo", "demo.src", 100, &[5, 20, 40])
            .with_variable("answer")
    }

    #[test]
    fn status_distinguishes_symbols() {
        let mut h = host();
        assert_eq!(h.status("foo"), InstrumentationStatus::NotInstrumented);
        assert_eq!(h.status("answer"), InstrumentationStatus::NotAFunction);
        assert_eq!(h.status("nope"), InstrumentationStatus::NotYetEvaluated);
        h.instrument("foo").unwrap();
        assert_eq!(h.status("foo"), InstrumentationStatus::Instrumented);
    }

    #[test]
    fn instrument_emits_started_then_completed() {
        let mut h = host();
        h.instrument("foo").unwrap();
        assert_eq!(
            h.take_events(),
            vec![
                HostEvent::InstrumentationStarted {
                    function: "foo".into()
                },
                HostEvent::InstrumentationCompleted {
                    function: "foo".into(),
                    file: "demo.src".into(),
                    position: 100,
                },
            ]
        );
    }

    #[test]
    fn reevaluate_drops_breakpoints() {
        let mut h = host();
        h.instrument("foo").unwrap();
        h.set_breakpoint("foo", 1, None, false).unwrap();
        h.reevaluate("foo").unwrap();
        assert!(h.breakpoints("foo").is_empty());
        assert_eq!(h.status("foo"), InstrumentationStatus::Instrumented);
    }

    #[test]
    fn breakpoints_need_valid_stop_points() {
        let mut h = host();
        h.instrument("foo").unwrap();
        assert_eq!(
            h.set_breakpoint("foo", 3, None, false),
            Err(HostError::NoSuchStopPoint {
                function: "foo".into(),
                index: 3
            })
        );
        assert_eq!(
            h.clear_breakpoint("foo", 0),
            Err(HostError::NoSuchBreakpoint {
                function: "foo".into(),
                index: 0
            })
        );
    }
}
