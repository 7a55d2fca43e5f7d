//! probeview - breakpoint and instrumentation browser
//!
//! Entry point: parses arguments, sets up logging, and runs the REPL over a
//! demo session backed by the scripted host and editor.

use anyhow::{Context, Result};
use clap::Parser;

use probeview::editor::{ScriptedEditor, Span};
use probeview::host::ScriptedHost;
use probeview::session::Session;
use probeview::ui::cli::run_cli;

/// probeview: breakpoint and instrumentation browser for an editor-hosted
/// debugger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const DEMO_FILE: &str = "demo.src";

const DEMO_SOURCE: &str = "\
(defun fib (n)
  (if (< n 2)
      n
    (+ (fib (- n 1)) (fib (- n 2)))))

(defun total (xs)
  (let ((sum 0))
    (dolist (x xs)
      (setq sum (+ sum x)))
    sum))
";

/// Build the demo session: two functions with stop points derived from the
/// demo source, plus one non-function symbol.
fn demo_session() -> Result<Session<ScriptedHost, ScriptedEditor>> {
    let offset = |needle: &str| -> Result<usize> {
        DEMO_SOURCE
            .find(needle)
            .with_context(|| format!("demo source lacks `{}`", needle))
    };

    let fib_def = offset("(defun fib")?;
    let fib_stops = [
        offset("(if (< n 2)")? - fib_def,
        offset("      n")? - fib_def,
        offset("(+ (fib")? - fib_def,
    ];
    let total_def = offset("(defun total")?;
    let total_stops = [
        offset("(let ((sum 0))")? - total_def,
        offset("(setq sum")? - total_def,
        offset("    sum)")? - total_def,
    ];

    let host = ScriptedHost::new()
        .with_function("fib", DEMO_FILE, fib_def, &fib_stops)
        .with_function("total", DEMO_FILE, total_def, &total_stops)
        .with_variable("threshold");
    let editor = ScriptedEditor::new()
        .with_buffer(DEMO_FILE, DEMO_SOURCE)
        .with_symbol("fib", DEMO_FILE, Span::new(fib_def, total_def))
        .with_symbol("total", DEMO_FILE, Span::new(total_def, DEMO_SOURCE.len()))
        .interactive();

    Ok(Session::new(host, editor))
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    ))
    .init();

    log::info!("probeview initialized");
    println!("[*] probeview v{} - demo session", env!("CARGO_PKG_VERSION"));

    run_cli(demo_session()?)
}
