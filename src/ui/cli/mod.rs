//! CLI - reedline-based REPL interface.
//!
//! Drives a session against the scripted host and editor so the whole
//! command surface (toggle, views, row actions) can be exercised from a
//! terminal.

use std::borrow::Cow;

use anyhow::Result;
use colored::Colorize;
use reedline::{
    Prompt, PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal,
};

use crate::editor::{EditorOps, ScriptedEditor};
use crate::host::ScriptedHost;
use crate::session::{Session, ToggleOutcome};
use crate::views::ViewPair;

/// Custom prompt showing the cursor position.
pub struct ProbePrompt {
    cursor: Option<(String, usize)>,
}

impl ProbePrompt {
    pub fn new() -> Self {
        Self { cursor: None }
    }

    pub fn set_cursor(&mut self, cursor: Option<(String, usize)>) {
        self.cursor = cursor;
    }
}

impl Default for ProbePrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for ProbePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        match &self.cursor {
            Some((file, offset)) => Cow::Owned(format!("[{}:{}]", file, offset)),
            None => Cow::Borrowed("[--]"),
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "(failed) ",
        };
        Cow::Owned(format!("(search: {}{}) ", prefix, history_search.term))
    }
}

/// Command parsing result.
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedCommand {
    /// Move the cursor: s [file] <offset>
    Seek(Option<String>, usize),
    /// Toggle a breakpoint at point: b (bc for conditional)
    Toggle { conditional: bool },
    /// Open the breakpoints view: vb
    ShowBreakpoints,
    /// Open the instrumented-functions view: vi
    ShowInstrumented,
    /// Open both views: vv
    ShowBoth,
    /// Visit breakpoint row: v <n>
    Visit(usize),
    /// Kill breakpoint row: k <n>
    Kill(usize),
    /// Evaluate instrumented row: e <n>
    Evaluate(usize),
    /// Find instrumented row: f <n>
    Find(usize),
    /// Refresh open views: r
    Refresh,
    /// Close the views and restore the layout: q
    CloseViews,
    /// List highlight marks in the current file: m
    Marks,
    /// Simulate execution stopping: run <function> <stop-index>
    Run(String, usize),
    /// Help: ? or help
    Help,
    /// Quit the REPL: quit or exit
    Quit,
    /// Unknown command
    Unknown(String),
}

/// Parse a command string into a structured command.
fn parse_command(input: &str) -> ParsedCommand {
    let input = input.trim();
    let parts: Vec<&str> = input.split_whitespace().collect();
    let cmd = parts.first().copied().unwrap_or("");

    match cmd {
        "s" | "seek" => match parts.as_slice() {
            [_, offset] => match offset.parse() {
                Ok(offset) => ParsedCommand::Seek(None, offset),
                Err(_) => ParsedCommand::Unknown(input.to_string()),
            },
            [_, file, offset] => match offset.parse() {
                Ok(offset) => ParsedCommand::Seek(Some(file.to_string()), offset),
                Err(_) => ParsedCommand::Unknown(input.to_string()),
            },
            _ => ParsedCommand::Unknown(input.to_string()),
        },

        "b" | "break" => ParsedCommand::Toggle { conditional: false },
        "bc" => ParsedCommand::Toggle { conditional: true },

        "vb" => ParsedCommand::ShowBreakpoints,
        "vi" => ParsedCommand::ShowInstrumented,
        "vv" => ParsedCommand::ShowBoth,

        "v" | "k" | "e" | "f" => match parts.get(1).and_then(|n| n.parse().ok()) {
            Some(n) => match cmd {
                "v" => ParsedCommand::Visit(n),
                "k" => ParsedCommand::Kill(n),
                "e" => ParsedCommand::Evaluate(n),
                _ => ParsedCommand::Find(n),
            },
            None => ParsedCommand::Unknown(input.to_string()),
        },

        "r" | "refresh" => ParsedCommand::Refresh,
        "q" => ParsedCommand::CloseViews,
        "m" | "marks" => ParsedCommand::Marks,

        "run" => match parts.as_slice() {
            [_, function, index] => match index.parse() {
                Ok(index) => ParsedCommand::Run(function.to_string(), index),
                Err(_) => ParsedCommand::Unknown(input.to_string()),
            },
            _ => ParsedCommand::Unknown(input.to_string()),
        },

        "?" | "help" => ParsedCommand::Help,
        "quit" | "exit" => ParsedCommand::Quit,

        _ => ParsedCommand::Unknown(input.to_string()),
    }
}

/// Print the help message.
fn print_help() {
    println!("{}", "probeview commands".bold().cyan());
    println!("{}", "═".repeat(50).cyan());

    println!("\n{}", "Cursor:".bold().yellow());
    println!("  {}   Move cursor (file optional)", "s [file] <offset>".green());

    println!("\n{}", "Breakpoints:".bold().yellow());
    println!("  {}                  Toggle breakpoint at point", "b".green());
    println!("  {}                 Toggle conditional breakpoint", "bc".green());

    println!("\n{}", "Views:".bold().yellow());
    println!("  {}                 Show breakpoints view", "vb".green());
    println!("  {}                 Show instrumented functions view", "vi".green());
    println!("  {}                 Show both views", "vv".green());
    println!("  {}              Visit breakpoint row n", "v <n>".green());
    println!("  {}              Kill breakpoint row n", "k <n>".green());
    println!("  {}              Evaluate instrumented row n", "e <n>".green());
    println!("  {}              Find instrumented row n", "f <n>".green());
    println!("  {}                  Refresh open views", "r".green());
    println!("  {}                  Close views, restore layout", "q".green());

    println!("\n{}", "Simulation:".bold().yellow());
    println!("  {}   Stop execution at a stop point", "run <func> <n>".green());
    println!("  {}                  List marks in current file", "m".green());

    println!("\n{}", "Other:".bold().yellow());
    println!("  {}                  Show this help", "?".green());
    println!("  {}               Quit", "quit".green());
}

fn print_views(views: &ViewPair) {
    if let Some(view) = views.breakpoints() {
        println!("\n{}", "Breakpoints".bold().cyan());
        if view.is_empty() {
            println!("{}", "(no breakpoints)".dimmed());
        } else {
            print!("{}", view.render());
        }
    }
    if let Some(view) = views.instrumented() {
        println!("\n{}", "Instrumented functions".bold().cyan());
        if view.is_empty() {
            println!("{}", "(nothing instrumented)".dimmed());
        } else {
            print!("{}", view.render());
        }
    }
}

/// Execute a parsed command. Returns `false` when the REPL should exit.
fn execute_command(
    session: &mut Session<ScriptedHost, ScriptedEditor>,
    views: &mut ViewPair,
    cmd: ParsedCommand,
) -> bool {
    match cmd {
        ParsedCommand::Seek(file, offset) => {
            let file = file.or_else(|| session.editor().current_file());
            match file {
                Some(file) => {
                    session.editor_mut().goto(&file, offset);
                    println!("[*] point at {}:{}", file, offset);
                }
                None => println!("{} no file to seek in; use s <file> <offset>", "[!]".red()),
            }
        }

        ParsedCommand::Toggle { conditional } => match session.toggle_breakpoint(conditional) {
            Ok(ToggleOutcome::Set {
                function,
                stop_index,
            }) => println!("[*] breakpoint set at stop point {} of `{}`", stop_index, function),
            Ok(ToggleOutcome::Cleared {
                function,
                stop_index,
            }) => println!(
                "[*] breakpoint cleared at stop point {} of `{}`",
                stop_index, function
            ),
            Ok(ToggleOutcome::Aborted) => println!("[*] aborted"),
            Err(e) => println!("{} {}", "[!]".red(), e),
        },

        ParsedCommand::ShowBreakpoints => {
            views.open_breakpoints(session);
            print_views(views);
        }
        ParsedCommand::ShowInstrumented => {
            views.open_instrumented(session);
            print_views(views);
        }
        ParsedCommand::ShowBoth => {
            views.open_both(session);
            print_views(views);
        }

        ParsedCommand::Visit(n) => match views.breakpoints() {
            Some(view) => match view.visit(session, n) {
                Ok(()) => println!("[*] visited row {}", n),
                Err(e) => println!("{} {}", "[!]".red(), e),
            },
            None => println!("{} breakpoints view is not open (vb)", "[!]".red()),
        },

        ParsedCommand::Kill(n) => {
            let outcome = match views.breakpoints_mut() {
                Some(view) => Some(view.kill(session, n)),
                None => None,
            };
            match outcome {
                Some(Ok(true)) => {
                    println!("[*] breakpoint deleted");
                    print_views(views);
                }
                Some(Ok(false)) => println!("[*] aborted"),
                Some(Err(e)) => println!("{} {}", "[!]".red(), e),
                None => println!("{} breakpoints view is not open (vb)", "[!]".red()),
            }
        }

        ParsedCommand::Evaluate(n) => {
            let outcome = match views.instrumented_mut() {
                Some(view) => Some(view.evaluate(session, n)),
                None => None,
            };
            match outcome {
                Some(Ok(true)) => {
                    views.refresh(session);
                    println!("[*] re-evaluated");
                    print_views(views);
                }
                Some(Ok(false)) => println!("[*] aborted"),
                Some(Err(e)) => println!("{} {}", "[!]".red(), e),
                None => println!("{} instrumented view is not open (vi)", "[!]".red()),
            }
        }

        ParsedCommand::Find(n) => match views.instrumented() {
            Some(view) => match view.find(session, n) {
                Ok(()) => println!("[*] found row {}", n),
                Err(e) => println!("{} {}", "[!]".red(), e),
            },
            None => println!("{} instrumented view is not open (vi)", "[!]".red()),
        },

        ParsedCommand::Refresh => {
            views.refresh(session);
            print_views(views);
        }

        ParsedCommand::CloseViews => {
            views.quit(session);
            println!("[*] views closed, layout restored");
        }

        ParsedCommand::Marks => match session.editor().current_file() {
            Some(file) => {
                for mark in session.editor().marks_in(&file, None) {
                    println!(
                        "  {:?} {}..{} in {}",
                        mark.kind, mark.span.start, mark.span.end, mark.file
                    );
                }
            }
            None => println!("{} no current file", "[!]".red()),
        },

        ParsedCommand::Run(function, index) => {
            match session.host_mut().stop_at(&function, index) {
                Ok(()) => {
                    session.pump();
                    println!("[*] stopped at stop point {} of `{}`", index, function);
                }
                Err(e) => println!("{} {}", "[!]".red(), e),
            }
        }

        ParsedCommand::Help => print_help(),

        ParsedCommand::Quit => {
            println!("[*] bye");
            return false;
        }

        ParsedCommand::Unknown(input) => {
            println!("{} unknown command: '{}'", "[!]".red(), input);
            println!("    Type '?' for help");
        }
    }

    views.sync(session);
    true
}

/// Run the CLI REPL over a demo session.
pub fn run_cli(mut session: Session<ScriptedHost, ScriptedEditor>) -> Result<()> {
    let mut line_editor = Reedline::create();
    let mut prompt = ProbePrompt::new();
    let mut views = ViewPair::new();

    println!("{}", "probeview - type '?' for help, 'quit' to exit".cyan());

    loop {
        prompt.set_cursor(
            session
                .editor()
                .cursor()
                .map(|c| (c.file, c.offset)),
        );
        let sig = line_editor.read_line(&prompt)?;
        match sig {
            Signal::Success(buffer) => {
                let input = buffer.trim();
                if input.is_empty() {
                    continue;
                }
                if !execute_command(&mut session, &mut views, parse_command(input)) {
                    break;
                }
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!("\n[*] interrupted");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_command_surface() {
        assert_eq!(parse_command("s 120"), ParsedCommand::Seek(None, 120));
        assert_eq!(
            parse_command("s demo.src 120"),
            ParsedCommand::Seek(Some("demo.src".into()), 120)
        );
        assert_eq!(parse_command("b"), ParsedCommand::Toggle { conditional: false });
        assert_eq!(parse_command("bc"), ParsedCommand::Toggle { conditional: true });
        assert_eq!(parse_command("k 2"), ParsedCommand::Kill(2));
        assert_eq!(
            parse_command("run foo 1"),
            ParsedCommand::Run("foo".into(), 1)
        );
        assert_eq!(
            parse_command("frobnicate"),
            ParsedCommand::Unknown("frobnicate".into())
        );
    }
}
