//! Instrumented-function table.
//!
//! Mirrors which functions the host debugger has instrumented and where
//! their definitions start. The host owns the truth; this table exists so
//! the list views have something cheap and ordered to iterate.

/// A function the host debugger has instrumented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentedFunction {
    pub name: String,
    /// File the definition was read from at instrumentation time.
    pub file: String,
    /// Byte offset of the definition within that file.
    pub position: usize,
}

/// Insertion-ordered table with exactly one entry per function name.
#[derive(Debug, Default)]
pub struct Tracker {
    forms: Vec<InstrumentedFunction>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert: any previous entry for `name` is removed before the new one
    /// is inserted at the end.
    pub fn record(&mut self, name: &str, file: &str, position: usize) {
        self.forms.retain(|f| f.name != name);
        self.forms.push(InstrumentedFunction {
            name: name.to_string(),
            file: file.to_string(),
            position,
        });
    }

    pub fn remove(&mut self, name: &str) -> Option<InstrumentedFunction> {
        let index = self.forms.iter().position(|f| f.name == name)?;
        Some(self.forms.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&InstrumentedFunction> {
        self.forms.iter().find(|f| f.name == name)
    }

    /// Fresh iteration over all entries, in insertion order.
    pub fn functions(&self) -> impl Iterator<Item = &InstrumentedFunction> {
        self.forms.iter()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_entry_per_name_with_latest_position() {
        let mut t = Tracker::new();
        t.record("foo", "a.src", 10);
        t.record("bar", "a.src", 50);
        t.record("foo", "b.src", 99);
        assert_eq!(t.len(), 2);
        let foo = t.get("foo").unwrap();
        assert_eq!((foo.file.as_str(), foo.position), ("b.src", 99));
    }

    #[test]
    fn reinsertion_moves_to_the_end() {
        let mut t = Tracker::new();
        t.record("foo", "a.src", 10);
        t.record("bar", "a.src", 50);
        t.record("foo", "a.src", 10);
        let names: Vec<&str> = t.functions().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["bar", "foo"]);
    }

    #[test]
    fn remove_returns_the_entry() {
        let mut t = Tracker::new();
        t.record("foo", "a.src", 10);
        let removed = t.remove("foo").unwrap();
        assert_eq!(removed.position, 10);
        assert!(t.is_empty());
        assert!(t.remove("foo").is_none());
    }
}
