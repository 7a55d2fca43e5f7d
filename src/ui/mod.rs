//! User interface module.
//!
//! The interactive surface is a reedline REPL driving a demo session; the
//! list views themselves live in [`crate::views`] and render to plain text.

pub mod cli;
