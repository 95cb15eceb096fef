//! grd - a virtual machine for control-flow-graph programs
//!
//! # Overview
//!
//! A grd program is a graph written one node per line. Each node has a
//! name, up to two outgoing edges and an optional operation:
//!
//! ```text
//! <start> [loop]       {SET({0})}
//! <loop>  [print]      {INCREMENT}
//! <print> [check]      {OUTPUT({})}
//! <check> [loop | end] {CHECK({} < 5)}
//! <end>
//! ```
//!
//! Execution starts at `start`. After a node's operation runs, a single
//! edge is followed unconditionally and a pair of edges is chosen by the
//! operation's boolean result. Reaching `end` (or a node without edges)
//! halts the run.
//!
//! # Quick Start
//!
//! ```
//! use grd::{ExecutionOptions, run_source};
//!
//! let source = "<start>[end]{SET(6 * 7)}\n<end>{OUTPUT(\"answer: {}\")}";
//! let mut out = Vec::new();
//! let report = run_source(source, ExecutionOptions::default(), &mut out).unwrap();
//!
//! assert_eq!(String::from_utf8(out).unwrap(), "answer: 42\n");
//! assert_eq!(report.halted_at, "end");
//! ```

mod error_renderer;

use std::io::Write;

pub use error_renderer::{
    render_diagnostic, render_diagnostic_to_string, render_diagnostic_to_string_no_color,
    render_run_error, render_run_error_to_string, render_run_error_to_string_no_color,
};

// Re-export the public API of grd_core
pub use grd_core::{
    AddressingMode, Dispatcher, EvalError, ExecutionOptions, Executor, Graph, Memory, Node,
    Operation, OperationError, RunError, RunReport, Span, StepDiagnostic, Value,
};
pub use grd_core::{expression, graph, program};

/// Parses `source` and runs it once, writing program output to `out`.
pub fn run_source<W: Write>(
    source: &str,
    options: ExecutionOptions,
    out: W,
) -> Result<RunReport, RunError> {
    let graph = program::parse(source);
    Executor::new(&graph, options, out).run()
}
